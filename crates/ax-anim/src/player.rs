//! Animation playback
//!
//! [`AnimationPlayer`] owns the clock and the transport state. It does not
//! own a timer: the host calls [`AnimationPlayer::advance`] (or
//! [`AnimationPlayer::tick`]) at its own cadence, and every call moves time
//! forward. Each time change resamples the current clip into the sink.

use serde::{Deserialize, Serialize};

use crate::clip::{AnimationClip, AnimationSet, NodeBindPose};
use crate::error::PlayerError;
use crate::keyframe::{sample_quat, sample_vec3};
use crate::sink::{NodeTransform, NodeTransformSink};

/// Frame rate used when none is given
pub const DEFAULT_FRAME_RATE: f32 = 60.0;

/// What happens when time leaves the clip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// Saturate at 0 and the clip duration
    #[default]
    Clamp,
    /// Wrap into the clip duration
    Loop,
}

/// Transport state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayState {
    /// Time advances on each `advance`
    Playing,
    /// Time is held
    Paused,
    /// Rewound, nodes in bind pose
    #[default]
    Stopped,
}

/// Keyframe player writing node-local transforms into a sink
pub struct AnimationPlayer<S: NodeTransformSink> {
    set: AnimationSet,
    sink: S,
    current: Option<usize>,
    time: f32,
    speed: f32,
    loop_mode: LoopMode,
    state: PlayState,
    frame_rate: f32,
}

impl<S: NodeTransformSink> AnimationPlayer<S> {
    /// Create a stopped player on the first clip of `set`
    pub fn new(set: AnimationSet, sink: S, fps: f32) -> Self {
        let current = if set.clips.is_empty() { None } else { Some(0) };
        let mut player = Self {
            set,
            sink,
            current,
            time: 0.0,
            speed: 1.0,
            loop_mode: LoopMode::default(),
            state: PlayState::default(),
            frame_rate: DEFAULT_FRAME_RATE,
        };
        player.set_frame_rate(fps);
        player
    }

    /// Switch the current clip, keeping play state and time
    pub fn set_clip(&mut self, name: &str) -> Result<(), PlayerError> {
        let index = self
            .set
            .clips
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| PlayerError::ClipNotFound(name.to_string()))?;
        self.current = Some(index);
        tracing::debug!("Animation clip set to '{}'", name);
        Ok(())
    }

    /// Start or resume playback
    pub fn play(&mut self) {
        if self.current.is_none() {
            tracing::warn!("No animation clip to play");
            return;
        }
        self.state = PlayState::Playing;
        tracing::debug!("Animation playing at {:.3}s", self.time);
        self.sample();
    }

    /// Switch to `name` and start playback
    pub fn play_clip(&mut self, name: &str) -> Result<(), PlayerError> {
        self.set_clip(name)?;
        self.play();
        Ok(())
    }

    /// Pause playback, keeping the current time
    pub fn pause(&mut self) {
        if self.state == PlayState::Playing {
            self.state = PlayState::Paused;
            tracing::debug!("Animation paused at {:.3}s", self.time);
        }
    }

    /// Stop playback, rewind to 0 and put every node back in its bind pose
    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
        self.time = 0.0;
        for name in self.set.nodes.keys() {
            if let Some(node) = self.sink.node_mut(name) {
                *node = NodeTransform::IDENTITY;
            }
        }
        tracing::debug!("Animation stopped");
    }

    /// Jump to a fraction of the clip duration and resample
    pub fn seek_percent(&mut self, percent: f32) {
        let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 1.0) };
        self.set_time(percent * self.duration());
    }

    /// Jump to `time` seconds, applying the loop mode, and resample
    pub fn set_time(&mut self, time: f32) {
        self.time = boundary_time(time, self.duration(), self.loop_mode);
        self.sample();
    }

    /// Move time forward by `dt * speed` while playing.
    ///
    /// Returns false without doing anything when not playing.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.state != PlayState::Playing {
            return false;
        }
        self.set_time(self.time + dt * self.speed);
        true
    }

    /// Advance by one frame interval
    pub fn tick(&mut self) -> bool {
        self.advance(self.frame_interval())
    }

    /// Set the frame rate used by [`tick`](Self::tick). Non-positive rates
    /// are ignored.
    pub fn set_frame_rate(&mut self, fps: f32) {
        if fps.is_finite() && fps > 0.0 {
            self.frame_rate = fps;
        } else {
            tracing::warn!("Ignoring invalid frame rate {}", fps);
        }
    }

    /// Frames per second used by `tick`
    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    /// Seconds per frame
    pub fn frame_interval(&self) -> f32 {
        1.0 / self.frame_rate
    }

    /// Set the time multiplier; negative plays backwards
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Time multiplier
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set what happens when time leaves the clip
    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    /// Boundary policy
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Transport state
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Current time in seconds
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Duration of the current clip, 0 without one
    pub fn duration(&self) -> f32 {
        self.clip().map_or(0.0, |c| c.duration)
    }

    /// Current clip
    pub fn clip(&self) -> Option<&AnimationClip> {
        self.current.and_then(|i| self.set.clips.get(i))
    }

    /// Name of the current clip
    pub fn clip_name(&self) -> Option<&str> {
        self.clip().map(|c| c.name.as_str())
    }

    /// Clips and bind poses being played
    pub fn animation_set(&self) -> &AnimationSet {
        &self.set
    }

    /// Sink receiving node transforms
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Sink, mutably
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the player, returning the sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Write every track of the current clip at the current time
    fn sample(&mut self) {
        let Some(clip) = self.current.and_then(|i| self.set.clips.get(i)) else {
            return;
        };
        let time = self.time;
        for (name, track) in &clip.tracks {
            let Some(node) = self.sink.node_mut(name) else {
                continue;
            };
            let fallback;
            let bind = match self.set.nodes.get(name) {
                Some(bind) => bind,
                None => {
                    fallback = NodeBindPose::identity(name.as_str());
                    &fallback
                }
            };
            if let Some(v) = sample_vec3(&track.translation_keys, time) {
                node.translation = bind.to_local_translation(v);
            }
            if let Some(q) = sample_quat(&track.rotation_keys, time) {
                node.rotation = bind.to_local_rotation(q);
            }
            if let Some(v) = sample_vec3(&track.scale_keys, time) {
                node.scale = bind.to_local_scale(v);
            }
        }
    }
}

/// Bring `time` back into `[0, duration]`
fn boundary_time(time: f32, duration: f32, mode: LoopMode) -> f32 {
    if !time.is_finite() || !(duration > 0.0) {
        return 0.0;
    }
    match mode {
        LoopMode::Clamp => time.clamp(0.0, duration),
        LoopMode::Loop if (0.0..=duration).contains(&time) => time,
        LoopMode::Loop => time.rem_euclid(duration),
    }
}
