//! Bind targets
//!
//! The controller never knows the concrete host type it edits. Hosts adapt
//! their objects to [`BindTarget`] at the boundary: a tiled dataset or a
//! model exposes a bounding volume, a point-like object exposes a position.

use ax_core::BoundingSphere;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Kind of hosted object behind a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    /// A streamed tile set; translate and rotate
    Tileset,
    /// A single model; translate, rotate and scale
    Model,
    /// A point-like object; translate only
    Point,
    /// Anything else; binding fails
    Other(String),
}

/// Handle groups a target can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleToggles {
    /// Axis lines and planes
    pub translate: bool,
    /// Rotation rings
    pub rotate: bool,
    /// Scale handle
    pub scale: bool,
}

impl HandleToggles {
    /// Every handle group
    pub const ALL: Self = Self {
        translate: true,
        rotate: true,
        scale: true,
    };
}

impl TargetKind {
    /// Handle groups supported by this kind, or `None` if unsupported
    pub fn capabilities(&self) -> Option<HandleToggles> {
        match self {
            TargetKind::Tileset => Some(HandleToggles {
                translate: true,
                rotate: true,
                scale: false,
            }),
            TargetKind::Model => Some(HandleToggles::ALL),
            TargetKind::Point => Some(HandleToggles {
                translate: true,
                rotate: false,
                scale: false,
            }),
            TargetKind::Other(_) => None,
        }
    }
}

/// A host object the gizmo can edit
pub trait BindTarget {
    /// What kind of object this is
    fn kind(&self) -> TargetKind;

    /// World-space bounding volume, if the object has one
    fn world_bounds(&self) -> Option<BoundingSphere>;

    /// World-space position for point-like objects
    fn position(&self) -> Option<Vec3> {
        None
    }

    /// Current model matrix
    fn model_matrix(&self) -> Mat4;

    /// Replace the model matrix; called on every drag step
    fn set_model_matrix(&mut self, matrix: Mat4);

    /// False while the host is still loading the object
    fn is_ready(&self) -> bool {
        true
    }
}

impl<T: BindTarget + ?Sized> BindTarget for Box<T> {
    fn kind(&self) -> TargetKind {
        (**self).kind()
    }

    fn world_bounds(&self) -> Option<BoundingSphere> {
        (**self).world_bounds()
    }

    fn position(&self) -> Option<Vec3> {
        (**self).position()
    }

    fn model_matrix(&self) -> Mat4 {
        (**self).model_matrix()
    }

    fn set_model_matrix(&mut self, matrix: Mat4) {
        (**self).set_model_matrix(matrix)
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// A model or tile set with a bounding volume
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTarget {
    /// Model or tile set
    pub kind: TargetKind,
    /// Current model matrix
    pub model_matrix: Mat4,
    /// World-space bounds; `None` until known
    pub bounds: Option<BoundingSphere>,
    /// Whether the host finished loading
    pub ready: bool,
}

impl ModelTarget {
    /// A loaded model
    pub fn model(model_matrix: Mat4, bounds: BoundingSphere) -> Self {
        Self {
            kind: TargetKind::Model,
            model_matrix,
            bounds: Some(bounds),
            ready: true,
        }
    }

    /// A loaded tile set
    pub fn tileset(model_matrix: Mat4, bounds: BoundingSphere) -> Self {
        Self {
            kind: TargetKind::Tileset,
            ..Self::model(model_matrix, bounds)
        }
    }

    /// A model that is still loading; bounds arrive with [`Self::finish_loading`]
    pub fn loading(kind: TargetKind, model_matrix: Mat4) -> Self {
        Self {
            kind,
            model_matrix,
            bounds: None,
            ready: false,
        }
    }

    /// Mark the model as loaded
    pub fn finish_loading(&mut self, bounds: BoundingSphere) {
        self.bounds = Some(bounds);
        self.ready = true;
    }
}

impl BindTarget for ModelTarget {
    fn kind(&self) -> TargetKind {
        self.kind.clone()
    }

    fn world_bounds(&self) -> Option<BoundingSphere> {
        self.bounds
    }

    fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    fn set_model_matrix(&mut self, matrix: Mat4) {
        self.model_matrix = matrix;
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// A point-like object such as a marker or label
///
/// Its model matrix is a pure translation frame at the position; writing a
/// matrix back keeps only the translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointTarget {
    /// World position; `None` if the host has no resolvable position
    pub position: Option<Vec3>,
}

impl PointTarget {
    /// A point at the given position
    pub fn new(position: Vec3) -> Self {
        Self {
            position: Some(position),
        }
    }
}

impl BindTarget for PointTarget {
    fn kind(&self) -> TargetKind {
        TargetKind::Point
    }

    fn world_bounds(&self) -> Option<BoundingSphere> {
        None
    }

    fn position(&self) -> Option<Vec3> {
        self.position
    }

    fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position.unwrap_or(Vec3::ZERO))
    }

    fn set_model_matrix(&mut self, matrix: Mat4) {
        self.position = Some(matrix.w_axis.truncate());
    }
}
