//! Viewport services the controller consumes
//!
//! The host owns the camera. The controller only needs pick rays, a
//! world-to-screen projection and the camera height, which scales drag
//! speed so dragging feels the same at every zoom level.

use ax_core::Ray;
use glam::{Vec2, Vec3};
use uuid::Uuid;

use crate::handle::{HandleId, HandleSet};

/// Result of picking a handle at a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveRef {
    /// Id of the handle set that was hit
    pub set: Uuid,
    /// Handle that was hit
    pub handle: HandleId,
}

/// Camera and picking services of the host viewport
pub trait Viewport {
    /// World-space ray through a pixel
    fn pick_ray(&self, pixel: Vec2) -> Option<Ray>;

    /// Pixel position of a world-space point; `None` if behind the camera
    fn world_to_screen(&self, point: Vec3) -> Option<Vec2>;

    /// Height of the camera above the ground, in world units
    fn camera_height(&self) -> f32;

    /// Pick a handle at a pixel.
    ///
    /// The default casts a pick ray and runs the geometric hit test. Hosts
    /// with id-buffer picking can override this.
    fn pick(&self, pixel: Vec2, set: &HandleSet, tolerance: f32) -> Option<PrimitiveRef> {
        let ray = self.pick_ray(pixel)?;
        set.hit_test(&ray, tolerance).map(|handle| PrimitiveRef {
            set: set.id(),
            handle,
        })
    }
}

impl<V: Viewport + ?Sized> Viewport for &V {
    fn pick_ray(&self, pixel: Vec2) -> Option<Ray> {
        (**self).pick_ray(pixel)
    }

    fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        (**self).world_to_screen(point)
    }

    fn camera_height(&self) -> f32 {
        (**self).camera_height()
    }

    fn pick(&self, pixel: Vec2, set: &HandleSet, tolerance: f32) -> Option<PrimitiveRef> {
        (**self).pick(pixel, set, tolerance)
    }
}
