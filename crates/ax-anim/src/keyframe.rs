//! Keyframes, tracks and sampling
//!
//! A track holds three independently timed channels for one node. Sampling
//! a channel finds the bracketing pair of keys and interpolates: linearly
//! for translation and scale, spherically along the shortest arc for
//! rotation.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A value at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<V> {
    /// Time in seconds
    pub time: f32,
    /// Value at `time`
    pub value: V,
}

impl<V> Keyframe<V> {
    /// Create a keyframe
    pub fn new(time: f32, value: V) -> Self {
        Self { time, value }
    }
}

/// Keyframe channels of one node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Translation keys, ascending by time
    pub translation_keys: Vec<Keyframe<Vec3>>,
    /// Rotation keys, ascending by time
    pub rotation_keys: Vec<Keyframe<Quat>>,
    /// Scale keys, ascending by time
    pub scale_keys: Vec<Keyframe<Vec3>>,
}

impl Track {
    /// True if no channel has keys
    pub fn is_empty(&self) -> bool {
        self.translation_keys.is_empty() && self.rotation_keys.is_empty() && self.scale_keys.is_empty()
    }

    /// Time of the latest key over all channels
    pub fn end_time(&self) -> f32 {
        let last = |times: Option<f32>| times.unwrap_or(0.0);
        last(self.translation_keys.last().map(|k| k.time))
            .max(last(self.rotation_keys.last().map(|k| k.time)))
            .max(last(self.scale_keys.last().map(|k| k.time)))
    }
}

/// The two keys surrounding `time`.
///
/// Before the first key both are the first key, after the last key both are
/// the last key. An empty channel yields `None`.
pub fn bracketing_keys<V>(keys: &[Keyframe<V>], time: f32) -> Option<(&Keyframe<V>, &Keyframe<V>)> {
    let first = keys.first()?;
    let last = keys.last()?;
    if time < first.time {
        return Some((first, first));
    }
    if time > last.time {
        return Some((last, last));
    }
    keys.windows(2)
        .find(|pair| pair[0].time <= time && time <= pair[1].time)
        .map(|pair| (&pair[0], &pair[1]))
        .or(Some((last, last)))
}

/// Interpolation factor between two keys, `None` when their times coincide
fn factor<V>(k0: &Keyframe<V>, k1: &Keyframe<V>, time: f32) -> Option<f32> {
    let span = k1.time - k0.time;
    if span == 0.0 {
        return None;
    }
    Some((time - k0.time) / span)
}

/// Sample a translation or scale channel
pub fn sample_vec3(keys: &[Keyframe<Vec3>], time: f32) -> Option<Vec3> {
    let (k0, k1) = bracketing_keys(keys, time)?;
    Some(match factor(k0, k1, time) {
        Some(u) => k0.value.lerp(k1.value, u),
        None => k0.value,
    })
}

/// Sample a rotation channel
pub fn sample_quat(keys: &[Keyframe<Quat>], time: f32) -> Option<Quat> {
    let (k0, k1) = bracketing_keys(keys, time)?;
    Some(match factor(k0, k1, time) {
        Some(u) => k0.value.slerp(k1.value, u),
        None => k0.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_keys() -> Vec<Keyframe<f32>> {
        vec![Keyframe::new(0.0, 1.0), Keyframe::new(2.0, 5.0)]
    }

    #[test]
    fn test_bracketing_keys_inside_and_outside() {
        let keys = two_keys();

        let (a, b) = bracketing_keys(&keys, 1.0).unwrap();
        assert_eq!((a.time, a.value, b.time, b.value), (0.0, 1.0, 2.0, 5.0));

        let (a, b) = bracketing_keys(&keys, -1.0).unwrap();
        assert_eq!((a.time, b.time), (0.0, 0.0));
        assert_eq!((a.value, b.value), (1.0, 1.0));

        let (a, b) = bracketing_keys(&keys, 5.0).unwrap();
        assert_eq!((a.time, b.time), (2.0, 2.0));
        assert_eq!((a.value, b.value), (5.0, 5.0));
    }

    #[test]
    fn test_bracketing_keys_empty_and_single() {
        let empty: Vec<Keyframe<f32>> = Vec::new();
        assert!(bracketing_keys(&empty, 0.0).is_none());

        let single = vec![Keyframe::new(1.0, 3.0)];
        let (a, b) = bracketing_keys(&single, 1.0).unwrap();
        assert_eq!((a.value, b.value), (3.0, 3.0));
    }

    #[test]
    fn test_sample_at_key_times_reproduces_values() {
        let keys = vec![
            Keyframe::new(0.0, Vec3::ZERO),
            Keyframe::new(1.0, Vec3::new(2.0, 4.0, 6.0)),
            Keyframe::new(3.0, Vec3::new(-1.0, 0.5, 2.0)),
        ];
        for key in &keys {
            let v = sample_vec3(&keys, key.time).unwrap();
            assert_relative_eq!(v.x, key.value.x, epsilon = 1e-6);
            assert_relative_eq!(v.y, key.value.y, epsilon = 1e-6);
            assert_relative_eq!(v.z, key.value.z, epsilon = 1e-6);
        }

        let rotations = vec![
            Keyframe::new(0.0, Quat::IDENTITY),
            Keyframe::new(1.0, Quat::from_rotation_y(1.0)),
            Keyframe::new(2.0, Quat::from_rotation_x(-0.5)),
        ];
        for key in &rotations {
            let q = sample_quat(&rotations, key.time).unwrap();
            assert!(q.abs_diff_eq(key.value, 1e-5), "{q:?} != {:?}", key.value);
        }
    }

    #[test]
    fn test_sample_midpoint() {
        let keys = vec![
            Keyframe::new(0.0, Vec3::ZERO),
            Keyframe::new(2.0, Vec3::new(4.0, 0.0, 0.0)),
        ];
        assert_eq!(sample_vec3(&keys, 1.0), Some(Vec3::new(2.0, 0.0, 0.0)));

        let rotations = vec![
            Keyframe::new(0.0, Quat::IDENTITY),
            Keyframe::new(2.0, Quat::from_rotation_z(1.0)),
        ];
        let q = sample_quat(&rotations, 1.0).unwrap();
        assert!(q.abs_diff_eq(Quat::from_rotation_z(0.5), 1e-5));
    }

    #[test]
    fn test_slerp_takes_shortest_path() {
        let end = Quat::from_rotation_z(0.4);
        let rotations = vec![
            Keyframe::new(0.0, Quat::IDENTITY),
            // Same orientation, opposite hemisphere
            Keyframe::new(1.0, -end),
        ];
        let q = sample_quat(&rotations, 0.5).unwrap();
        let expected = Quat::from_rotation_z(0.2);
        assert!(q.abs_diff_eq(expected, 1e-5) || q.abs_diff_eq(-expected, 1e-5));
    }

    #[test]
    fn test_equal_time_pair_uses_first_value() {
        let keys = vec![
            Keyframe::new(1.0, Vec3::X),
            Keyframe::new(1.0, Vec3::Y),
        ];
        assert_eq!(sample_vec3(&keys, 1.0), Some(Vec3::X));
    }

    #[test]
    fn test_track_end_time() {
        let track = Track {
            translation_keys: vec![Keyframe::new(1.5, Vec3::ZERO)],
            rotation_keys: vec![Keyframe::new(4.0, Quat::IDENTITY)],
            scale_keys: Vec::new(),
        };
        assert_eq!(track.end_time(), 4.0);
        assert!(!track.is_empty());
        assert!(Track::default().is_empty());
    }
}
