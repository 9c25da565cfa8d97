//! Global constants for ax-core

/// Below this magnitude a ray direction is treated as parallel to a plane
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// Below this magnitude a vector is treated as zero length
pub const LENGTH_EPSILON: f32 = 1e-6;

/// Default tolerance for matrix comparisons
pub const MATRIX_EPSILON: f32 = 1e-4;

/// Below this angle (radians) a rotation has no usable axis
pub const AXIS_ANGLE_EPSILON: f32 = 1e-5;
