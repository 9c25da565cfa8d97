//! Picking rays

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::PARALLEL_EPSILON;

/// A ray with an origin and a direction.
///
/// The direction is not required to be normalized; intersection routines
/// return ray parameters in units of `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Ray start point.
    pub origin: Vec3,
    /// Ray direction.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Returns the point at parameter `t`.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transforms the ray by an affine matrix.
    ///
    /// Ray parameters are preserved: `self.at(t)` transformed equals
    /// `self.transformed(m).at(t)`.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }
}

/// Ray-plane intersection.
///
/// Returns `None` when the ray is parallel to the plane or the plane lies
/// behind the ray origin.
pub fn ray_plane_intersection(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<Vec3> {
    let denom = ray.direction.dot(plane_normal);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = (plane_point - ray.origin).dot(plane_normal) / denom;
    if t < 0.0 {
        return None;
    }

    Some(ray.at(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_ground_plane() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = ray_plane_intersection(&ray, Vec3::ZERO, Vec3::Z).unwrap();
        assert_eq!(hit, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_parallel_ray_misses_plane() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X);
        assert!(ray_plane_intersection(&ray, Vec3::ZERO, Vec3::Z).is_none());
    }

    #[test]
    fn test_plane_behind_ray_is_ignored() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::Z);
        assert!(ray_plane_intersection(&ray, Vec3::ZERO, Vec3::Z).is_none());
    }

    #[test]
    fn test_transformed_ray_keeps_parameters() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let m = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        let moved = ray.transformed(&m);
        assert_eq!(moved.at(2.0), Vec3::new(2.0, 5.0, 0.0));
    }
}
