//! Ray hit tests for handle picking
//!
//! Every test returns the ray parameter of the closest hit in front of the
//! ray origin, so results from different shapes can be compared directly to
//! find the nearest handle.

use glam::Vec3;

use crate::constants::{LENGTH_EPSILON, PARALLEL_EPSILON};
use crate::ray::Ray;

/// Ray-cylinder intersection for a finite cylinder around a line segment.
///
/// The ray and the segment are projected into the plane perpendicular to the
/// segment, which reduces the problem to a 2D circle test:
///
/// ```text
/// |P(t) - axis_projection(P(t))| = radius
/// ```
///
/// The hit point must additionally project onto the segment between `start`
/// and `end`. If the near surface is behind the origin (the origin is inside
/// the cylinder) the far surface is used instead.
pub fn ray_cylinder_intersection(ray: &Ray, start: Vec3, end: Vec3, radius: f32) -> Option<f32> {
    let segment = end - start;
    let length = segment.length();
    if length < LENGTH_EPSILON {
        return ray_sphere_intersection(ray, start, radius);
    }
    let axis = segment / length;

    let d = ray.direction - axis * ray.direction.dot(axis);
    let offset = ray.origin - start;
    let o = offset - axis * offset.dot(axis);

    let a = d.dot(d);
    if a < PARALLEL_EPSILON {
        // Ray runs along the axis; only a hit if it already lies inside.
        return None;
    }
    let b = 2.0 * d.dot(o);
    let c = o.dot(o) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)]
        .into_iter()
        .filter(|t| *t >= 0.0)
        .find(|t| {
            let projection = (ray.at(*t) - start).dot(axis);
            (0.0..=length).contains(&projection)
        })
}

/// Ray-ring intersection.
///
/// The ring is an annulus in the plane through `center` with normal `normal`;
/// a hit is accepted when the plane hit point lies within `thickness` of the
/// circle of radius `ring_radius`.
pub fn ray_ring_intersection(
    ray: &Ray,
    center: Vec3,
    normal: Vec3,
    ring_radius: f32,
    thickness: f32,
) -> Option<f32> {
    let denom = ray.direction.dot(normal);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = (center - ray.origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }

    let distance_from_center = (ray.at(t) - center).length();
    if (distance_from_center - ring_radius).abs() <= thickness {
        Some(t)
    } else {
        None
    }
}

/// Ray-sphere intersection, used for point-like handles.
pub fn ray_sphere_intersection(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let a = ray.direction.dot(ray.direction);
    if a < PARALLEL_EPSILON {
        return None;
    }
    let b = 2.0 * oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let near = (-b - sqrt_disc) / (2.0 * a);
    let far = (-b + sqrt_disc) / (2.0 * a);
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        Some(far)
    } else {
        None
    }
}

/// Ray-quad intersection for a planar convex quad given by its four corners
/// in winding order.
///
/// `tolerance` widens every edge outward, which keeps thin quads pickable.
pub fn ray_quad_intersection(ray: &Ray, corners: &[Vec3; 4], tolerance: f32) -> Option<f32> {
    let normal = (corners[1] - corners[0]).cross(corners[3] - corners[0]);
    if normal.length_squared() < LENGTH_EPSILON {
        return None;
    }
    let normal = normal.normalize();

    let denom = ray.direction.dot(normal);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = (corners[0] - ray.origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }
    let hit = ray.at(t);

    // Inside test: the hit must lie on the inner side of every edge.
    let mut sign = 0.0_f32;
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let edge = b - a;
        let edge_len = edge.length();
        if edge_len < LENGTH_EPSILON {
            continue;
        }
        let side = edge.cross(hit - a).dot(normal) / edge_len;
        if side.abs() <= tolerance {
            continue;
        }
        if sign == 0.0 {
            sign = side.signum();
        } else if side.signum() != sign {
            return None;
        }
    }

    Some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_at(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 5.0), Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_ray_hits_cylinder() {
        let result = ray_cylinder_intersection(&down_at(0.5, 0.0), Vec3::ZERO, Vec3::X, 0.1);
        assert!(result.is_some());
    }

    #[test]
    fn test_ray_misses_cylinder() {
        let ray = Ray::new(Vec3::new(0.5, 0.0, 1.0), Vec3::Z);
        assert!(ray_cylinder_intersection(&ray, Vec3::ZERO, Vec3::X, 0.1).is_none());
    }

    #[test]
    fn test_ray_outside_cylinder_bounds() {
        let result = ray_cylinder_intersection(&down_at(2.0, 0.0), Vec3::ZERO, Vec3::X, 0.1);
        assert!(result.is_none());
    }

    #[test]
    fn test_ray_hits_ring_on_circle() {
        let ray = down_at(2.0, 0.0);
        let t = ray_ring_intersection(&ray, Vec3::ZERO, Vec3::Z, 2.0, 0.1).unwrap();
        assert!((t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_misses_ring_center() {
        let ray = down_at(0.0, 0.0);
        assert!(ray_ring_intersection(&ray, Vec3::ZERO, Vec3::Z, 2.0, 0.1).is_none());
    }

    #[test]
    fn test_sphere_hit_from_inside_uses_far_side() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray_sphere_intersection(&ray, Vec3::ZERO, 1.0).unwrap();
        assert!((t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_quad_inside_and_outside() {
        let corners = [
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
        ];
        assert!(ray_quad_intersection(&down_at(1.5, 1.5), &corners, 0.0).is_some());
        assert!(ray_quad_intersection(&down_at(0.5, 1.5), &corners, 0.0).is_none());
        assert!(ray_quad_intersection(&down_at(0.95, 1.5), &corners, 0.1).is_some());
    }
}
