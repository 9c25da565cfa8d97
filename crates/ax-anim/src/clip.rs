//! Clips, bind poses and clip sets

use std::collections::BTreeMap;

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::Serialize;

use ax_core::constants::AXIS_ANGLE_EPSILON;

use crate::keyframe::Track;

/// Reference transform of a node at parse time.
///
/// Sampled values are absolute; the bind pose turns them into values
/// relative to this node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeBindPose {
    /// Node name
    pub name: String,
    /// Parent node name, `None` for roots
    pub parent: Option<String>,
    /// Bind translation
    pub translation: Vec3,
    /// Bind rotation, normalized
    pub rotation: Quat,
    /// Bind scale with no zero components
    pub scale: Vec3,
    /// Inverse of `rotation`
    #[serde(skip)]
    pub inverse_rotation: Quat,
    /// Inverse of `rotation` as a matrix
    #[serde(skip)]
    pub inverse_rotation_matrix: Mat3,
}

impl NodeBindPose {
    /// Bind pose from translation, rotation and scale.
    ///
    /// Zero scale components are replaced by 1 so that local scale stays
    /// finite.
    pub fn new(name: impl Into<String>, translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let name = name.into();
        let rotation = if rotation.is_finite() && rotation.length_squared() > 0.0 {
            rotation.normalize()
        } else {
            tracing::warn!("Node '{}' has a degenerate bind rotation, using identity", name);
            Quat::IDENTITY
        };
        let scale = if scale.cmpeq(Vec3::ZERO).any() {
            tracing::warn!("Node '{}' has a zero bind scale component, using 1", name);
            Vec3::select(scale.cmpeq(Vec3::ZERO), Vec3::ONE, scale)
        } else {
            scale
        };
        let inverse_rotation = rotation.inverse();
        Self {
            name,
            parent: None,
            translation,
            rotation,
            scale,
            inverse_rotation,
            inverse_rotation_matrix: Mat3::from_quat(inverse_rotation),
        }
    }

    /// Identity bind pose
    pub fn identity(name: impl Into<String>) -> Self {
        Self::new(name, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }

    /// Bind pose decomposed from a column-major node matrix
    pub fn from_matrix(name: impl Into<String>, matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self::new(name, translation, rotation, scale)
    }

    /// Set the parent node name
    pub fn with_parent(mut self, parent: Option<String>) -> Self {
        self.parent = parent;
        self
    }

    /// Absolute translation to node-local translation
    pub fn to_local_translation(&self, value: Vec3) -> Vec3 {
        self.inverse_rotation_matrix * (value - self.translation)
    }

    /// Absolute rotation to node-local rotation
    pub fn to_local_rotation(&self, value: Quat) -> Quat {
        let angle = 2.0 * value.w.clamp(-1.0, 1.0).acos();
        let axis = if angle.abs() > AXIS_ANGLE_EPSILON {
            let xyz = Vec3::new(value.x, value.y, value.z);
            xyz.try_normalize().unwrap_or(Vec3::X)
        } else {
            Vec3::X
        };
        let local_axis = (self.inverse_rotation_matrix * axis)
            .try_normalize()
            .unwrap_or(Vec3::X);
        Quat::from_axis_angle(local_axis, angle) * self.inverse_rotation
    }

    /// Absolute scale to node-local scale
    pub fn to_local_scale(&self, value: Vec3) -> Vec3 {
        value / self.scale
    }
}

/// A named set of node tracks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationClip {
    /// Clip name
    pub name: String,
    /// Latest timestamp over every channel
    pub duration: f32,
    /// Tracks keyed by node name
    pub tracks: BTreeMap<String, Track>,
}

impl AnimationClip {
    /// Empty clip
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: 0.0,
            tracks: BTreeMap::new(),
        }
    }

    /// Recompute `duration` from the tracks
    pub fn update_duration(&mut self) {
        self.duration = self
            .tracks
            .values()
            .map(Track::end_time)
            .fold(0.0, f32::max);
    }
}

/// Clips parsed from one or more assets, with the bind poses they share
#[derive(Debug, Clone, Default)]
pub struct AnimationSet {
    /// Clips in load order
    pub clips: Vec<AnimationClip>,
    /// Bind poses keyed by node name
    pub nodes: BTreeMap<String, NodeBindPose>,
}

impl AnimationSet {
    /// Clip by name
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|c| c.name == name)
    }

    /// Clip names in load order
    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.clips.iter().map(|c| c.name.as_str())
    }

    /// Bind pose by node name
    pub fn node(&self, name: &str) -> Option<&NodeBindPose> {
        self.nodes.get(name)
    }

    /// True if no clips are loaded
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Append clips and bind poses from another set.
    ///
    /// Clips whose name is already loaded are kept as they are, as are known
    /// bind poses. Returns the number of clips added.
    pub fn merge(&mut self, other: AnimationSet) -> usize {
        let mut added = 0;
        for clip in other.clips {
            if self.clip(&clip.name).is_some() {
                tracing::warn!("Clip '{}' already loaded, skipping", clip.name);
                continue;
            }
            self.clips.push(clip);
            added += 1;
        }
        for (name, pose) in other.nodes {
            self.nodes.entry(name).or_insert(pose);
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::Keyframe;
    use approx::assert_relative_eq;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-5);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-5);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-5);
    }

    #[test]
    fn test_identity_pose_is_passthrough() {
        let pose = NodeBindPose::identity("root");
        let v = Vec3::new(1.0, -2.0, 3.0);
        assert_vec3_eq(pose.to_local_translation(v), v);
        assert_vec3_eq(pose.to_local_scale(v), v);

        let q = Quat::from_rotation_y(0.7);
        assert!(pose.to_local_rotation(q).abs_diff_eq(q, 1e-5));
    }

    #[test]
    fn test_local_translation_removes_bind() {
        let pose = NodeBindPose::new(
            "arm",
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::ONE,
        );
        // (1,1,0) - (1,0,0) = (0,1,0), rotated by -90 deg about Z
        assert_vec3_eq(pose.to_local_translation(Vec3::new(1.0, 1.0, 0.0)), Vec3::X);
    }

    #[test]
    fn test_local_rotation_of_bind_rotation_is_identity() {
        let bind = Quat::from_rotation_x(0.9);
        let pose = NodeBindPose::new("leg", Vec3::ZERO, bind, Vec3::ONE);
        let local = pose.to_local_rotation(bind);
        assert!(local.abs_diff_eq(Quat::IDENTITY, 1e-5) || local.abs_diff_eq(-Quat::IDENTITY, 1e-5));
    }

    #[test]
    fn test_local_rotation_of_zero_angle() {
        let pose = NodeBindPose::new("leg", Vec3::ZERO, Quat::from_rotation_y(0.3), Vec3::ONE);
        let local = pose.to_local_rotation(Quat::IDENTITY);
        assert!(local.is_finite());
        assert!(local.abs_diff_eq(Quat::from_rotation_y(-0.3), 1e-5));
    }

    #[test]
    fn test_zero_bind_scale_is_replaced() {
        let pose = NodeBindPose::new("flat", Vec3::ZERO, Quat::IDENTITY, Vec3::new(2.0, 0.0, 4.0));
        assert_eq!(pose.scale, Vec3::new(2.0, 1.0, 4.0));
        assert_vec3_eq(pose.to_local_scale(Vec3::new(4.0, 3.0, 2.0)), Vec3::new(2.0, 3.0, 0.5));
    }

    #[test]
    fn test_from_matrix_decomposes() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::from_rotation_z(0.5),
            Vec3::new(1.0, 2.0, 3.0),
        );
        let pose = NodeBindPose::from_matrix("m", &m);
        assert_vec3_eq(pose.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_vec3_eq(pose.scale, Vec3::splat(2.0));
        assert!(pose.rotation.abs_diff_eq(Quat::from_rotation_z(0.5), 1e-5));
    }

    #[test]
    fn test_clip_duration_and_merge() {
        let mut clip = AnimationClip::new("walk");
        clip.tracks.insert(
            "hip".into(),
            Track {
                translation_keys: vec![Keyframe::new(0.0, Vec3::ZERO), Keyframe::new(2.5, Vec3::X)],
                ..Default::default()
            },
        );
        clip.update_duration();
        assert_eq!(clip.duration, 2.5);

        let mut set = AnimationSet {
            clips: vec![clip],
            nodes: BTreeMap::new(),
        };
        let mut other = AnimationSet::default();
        other.clips.push(AnimationClip::new("walk"));
        other.clips.push(AnimationClip::new("run"));
        other.nodes.insert("hip".into(), NodeBindPose::identity("hip"));

        assert_eq!(set.merge(other), 1);
        assert_eq!(set.clip_names().collect::<Vec<_>>(), vec!["walk", "run"]);
        assert_eq!(set.clip("walk").map(|c| c.duration), Some(2.5));
        assert!(set.node("hip").is_some());
    }
}
