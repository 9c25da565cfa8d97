//! Axis editor animation
//!
//! Keyframe sampling and playback for skeletal clips loaded from binary
//! glTF. The player owns a clock but no timer; the host drives it and
//! receives node-local transforms through a sink.
//!
//! # Architecture
//!
//! - [`AnimationPlayer`] - Transport, clock and per-node resampling
//! - [`AnimationSet`] - Clips plus the bind poses they are expressed against
//! - [`NodeTransformSink`] - Where sampled transforms are written
//! - [`glb`] - GLB container and accessor parsing
//!
//! # Module Structure
//!
//! ```text
//! ax-anim/
//! ├── clip.rs       # NodeBindPose, AnimationClip, AnimationSet
//! ├── error.rs      # PlayerError, AssetError
//! ├── glb.rs        # parse_animation_set, load_animation_set
//! ├── keyframe.rs   # Keyframe, Track, bracketing and sampling
//! ├── player.rs     # AnimationPlayer, LoopMode, PlayState
//! └── sink.rs       # NodeTransform, sinks, shared snapshots
//! ```

pub mod clip;
pub mod error;
pub mod glb;
pub mod keyframe;
pub mod player;
pub mod sink;

pub use clip::{AnimationClip, AnimationSet, NodeBindPose};
pub use error::{AssetError, PlayerError};
pub use glb::{load_animation_set, parse_animation_set};
pub use keyframe::{Keyframe, Track, bracketing_keys, sample_quat, sample_vec3};
pub use player::{AnimationPlayer, DEFAULT_FRAME_RATE, LoopMode, PlayState};
pub use sink::{NodeTransform, NodeTransformSink, NodeTransformTable, SharedNodeTransforms};
