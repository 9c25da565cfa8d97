//! Bounding volumes.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    /// Center of the sphere.
    pub center: Vec3,
    /// Radius of the sphere.
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Creates the smallest sphere centered on the box midpoint that contains
    /// the box given by `min` and `max`.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        let center = (min + max) * 0.5;
        Self {
            center,
            radius: (max - center).length(),
        }
    }

    /// Returns true if both the center and radius are finite and the radius
    /// is non-negative.
    pub fn is_valid(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite() && self.radius >= 0.0
    }

    /// Transforms the sphere by an affine matrix.
    ///
    /// The radius is scaled by the largest axis scale so the result still
    /// encloses the transformed volume.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let max_scale = matrix
            .x_axis
            .truncate()
            .length()
            .max(matrix.y_axis.truncate().length())
            .max(matrix.z_axis.truncate().length());
        Self {
            center: matrix.transform_point3(self.center),
            radius: self.radius * max_scale,
        }
    }
}
