//! Model matrix composition
//!
//! Gizmo drags express every edit as a delta matrix that is right-multiplied
//! into the target's model matrix, so the delta acts in target-local space.

use glam::{Mat4, Quat, Vec3};

use crate::constants::LENGTH_EPSILON;

/// Translation delta in local space.
pub fn translation_delta(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
}

/// Rotation by `angle` radians about `axis` through `center`.
///
/// Composed as translate-to-center, rotate, translate-back.
pub fn rotation_about(center: Vec3, axis: Vec3, angle: f32) -> Mat4 {
    if axis.length_squared() < LENGTH_EPSILON {
        return Mat4::IDENTITY;
    }
    let rotation = Quat::from_axis_angle(axis.normalize(), angle);
    Mat4::from_translation(center) * Mat4::from_quat(rotation) * Mat4::from_translation(-center)
}

/// Uniform scale about the local origin.
pub fn uniform_scale(factor: f32) -> Mat4 {
    Mat4::from_scale(Vec3::splat(factor))
}

/// Applies a local-space delta to a model matrix.
pub fn apply_local(model: Mat4, delta: Mat4) -> Mat4 {
    model * delta
}

/// Inverse of an affine model matrix, or `None` if it is singular or not
/// finite.
pub fn try_inverse(matrix: &Mat4) -> Option<Mat4> {
    let determinant = matrix.determinant();
    if !matrix.is_finite() || !determinant.is_finite() || determinant == 0.0 {
        return None;
    }
    Some(matrix.inverse())
}

/// Element-wise matrix comparison.
pub fn matrices_approx_eq(a: &Mat4, b: &Mat4, epsilon: f32) -> bool {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array().iter())
        .all(|(x, y)| (x - y).abs() <= epsilon)
}

/// Signed angle between `start` and `end` as seen from `center`.
///
/// The magnitude is the angle between the two center-relative directions;
/// the sign is positive when rotating from `start` to `end` is
/// counter-clockwise about `normal`. Degenerate inputs yield zero.
pub fn signed_angle_on_plane(start: Vec3, end: Vec3, center: Vec3, normal: Vec3) -> f32 {
    let from = start - center;
    let to = end - center;
    if from.length_squared() < LENGTH_EPSILON || to.length_squared() < LENGTH_EPSILON {
        return 0.0;
    }
    let from = from.normalize();
    let to = to.normalize();

    let magnitude = from.dot(to).clamp(-1.0, 1.0).acos();
    let orientation = from.cross(to).dot(normal);
    if orientation > 0.0 {
        magnitude
    } else if orientation < 0.0 {
        -magnitude
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use approx::assert_relative_eq;

    fn sample_model() -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::new(1.5, 1.5, 1.5),
            Quat::from_rotation_z(0.3),
            Vec3::new(100.0, -20.0, 7.0),
        )
    }

    #[test]
    fn test_rotate_then_unrotate_restores_model() {
        let model = sample_model();
        let center = Vec3::new(1.0, 2.0, 3.0);
        for (axis, angle) in [
            (Vec3::X, 0.7),
            (Vec3::Y, -2.1),
            (Vec3::Z, 3.0),
            (Vec3::new(1.0, -1.0, 1.0), 1.234),
        ] {
            let rotated = apply_local(model, rotation_about(center, axis, angle));
            let restored = apply_local(rotated, rotation_about(center, axis, -angle));
            assert!(matrices_approx_eq(&model, &restored, 1e-3));
        }
    }

    #[test]
    fn test_translate_then_untranslate_restores_model() {
        let model = Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0));
        let offset = Vec3::new(-5.0, 2.0, 0.25);
        let moved = apply_local(model, translation_delta(offset));
        let restored = apply_local(moved, translation_delta(-offset));
        assert_eq!(model, restored);
    }

    #[test]
    fn test_rotation_keeps_center_fixed() {
        let center = Vec3::new(3.0, 0.0, 0.0);
        let m = rotation_about(center, Vec3::Z, 1.0);
        let moved = m.transform_point3(center);
        assert_relative_eq!(moved.x, center.x, epsilon = 1e-5);
        assert_relative_eq!(moved.y, center.y, epsilon = 1e-5);
    }

    #[test]
    fn test_signed_angle_direction() {
        let angle = signed_angle_on_plane(Vec3::X, Vec3::Y, Vec3::ZERO, Vec3::Z);
        assert_relative_eq!(angle, FRAC_PI_2, epsilon = 1e-5);

        let angle = signed_angle_on_plane(Vec3::Y, Vec3::X, Vec3::ZERO, Vec3::Z);
        assert_relative_eq!(angle, -FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_signed_angle_degenerate_is_zero() {
        assert_eq!(signed_angle_on_plane(Vec3::ZERO, Vec3::Y, Vec3::ZERO, Vec3::Z), 0.0);
    }

    #[test]
    fn test_uniform_scale() {
        let m = uniform_scale(2.0);
        assert_eq!(m.transform_point3(Vec3::ONE), Vec3::splat(2.0));
    }

    #[test]
    fn test_try_inverse_rejects_singular() {
        assert!(try_inverse(&Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0))).is_none());
        assert!(try_inverse(&Mat4::from_translation(Vec3::splat(f32::NAN))).is_none());
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(try_inverse(&m), Some(m.inverse()));
    }
}
