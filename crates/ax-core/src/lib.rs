//! Axis editor core
//!
//! Shared geometric vocabulary for the gizmo controller and the animation
//! player: rays, intersection tests, bounding spheres and matrix composition.
//!
//! # Module Structure
//!
//! ```text
//! ax-core/
//! ├── constants.rs   # Tolerances shared by both cores
//! ├── ray.rs         # Ray and ray-plane intersection
//! ├── collision.rs   # Ray-cylinder/ring/sphere/quad hit tests
//! ├── bounds.rs      # Bounding sphere
//! └── transform.rs   # Translate, rotate-about-center, uniform scale
//! ```

pub mod bounds;
pub mod collision;
pub mod constants;
pub mod ray;
pub mod transform;

pub use bounds::BoundingSphere;
pub use collision::{
    ray_cylinder_intersection, ray_quad_intersection, ray_ring_intersection,
    ray_sphere_intersection,
};
pub use ray::{Ray, ray_plane_intersection};
pub use transform::{
    apply_local, matrices_approx_eq, rotation_about, signed_angle_on_plane, translation_delta,
    try_inverse, uniform_scale,
};
