//! Gizmo constants
//!
//! Defaults for handle colors, proportions and drag scaling.

/// Handle colors (RGBA)
pub mod colors {
    /// Origin point (white)
    pub const ORIGIN: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    /// X-axis color (red)
    pub const X_AXIS: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    /// Y-axis color (green)
    pub const Y_AXIS: [f32; 4] = [0.0, 0.5, 0.0, 1.0];
    /// Z-axis color (blue)
    pub const Z_AXIS: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    /// Highlight for the active handle (yellow)
    pub const ACTIVE: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
    /// Scale handle (white)
    pub const SCALE_AXIS: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}

/// Default line width in pixels
pub const LINE_WIDTH: f32 = 15.0;

/// Origin point size relative to the line width
pub const ORIGIN_POINT_SIZE_RATIO: f32 = 1.5;

/// Rotation auxiliary line width relative to the line width
pub const ROTATE_AUX_WIDTH_RATIO: f32 = 0.5;

/// Camera height divided by this gives world units per dragged pixel
pub const DRAG_HEIGHT_DIVISOR: f32 = 1047.0;

/// Radius used for point-like targets that carry no bounding volume
pub const POINT_TARGET_RADIUS: f32 = 10.0;

/// Number of segments for a full rotation ring
pub const RING_SEGMENTS: u32 = 360;

/// Plane quad inner corner as a fraction of the target radius
pub const PLANE_INNER_RATIO: f32 = 0.02;

/// Plane quad outer corner as a fraction of the target radius
pub const PLANE_OUTER_RATIO: f32 = 0.2;

/// Minimum inner corner offset of a plane quad in world units
pub const PLANE_MIN_INNER: f32 = 1.0;

/// World-sized hit tolerance as a fraction of the target radius
pub const HIT_RADIUS_MULTIPLIER: f32 = 0.08;

/// Arrow cap length as a fraction of the axis length
pub const ARROW_HEAD_RATIO: f32 = 0.1;

/// Arrow cap radius as a fraction of the axis length
pub const ARROW_RADIUS_RATIO: f32 = 0.04;

/// Number of segments for arrow caps
pub const ARROW_SEGMENTS: u32 = 8;

/// Scale steps at or below this factor are rejected
pub const MIN_SCALE_STEP: f32 = 1e-3;
