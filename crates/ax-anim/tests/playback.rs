//! Parsed clips driven through the player into a node table

mod common;

use std::sync::Arc;
use std::thread;

use approx::assert_relative_eq;
use ax_anim::{
    AnimationPlayer, LoopMode, NodeTransform, NodeTransformTable, PlayState,
    SharedNodeTransforms, parse_animation_set,
};
use common::rig_asset;
use glam::{Quat, Vec3};

fn rig_player() -> AnimationPlayer<NodeTransformTable> {
    let set = parse_animation_set(&rig_asset()).unwrap();
    let table = NodeTransformTable::for_set(&set);
    AnimationPlayer::new(set, table, 60.0)
}

#[test]
fn test_translation_is_relative_to_bind_pose() {
    let mut p = rig_player();
    p.set_time(1.5);

    // Sampled (1.5, 0, 0) minus bind (0, 1, 0)
    let hips = p.sink().get("hips").unwrap();
    assert_relative_eq!(hips.translation.x, 1.5, epsilon = 1e-5);
    assert_relative_eq!(hips.translation.y, -1.0, epsilon = 1e-5);
    assert_eq!(hips.scale, Vec3::ONE);
}

#[test]
fn test_rotation_and_scale_channels() {
    let mut p = rig_player();
    p.seek_percent(0.5);
    assert_eq!(p.current_time(), 2.0);
    let spine = p.sink().get("spine").unwrap();
    assert!(spine.rotation.abs_diff_eq(Quat::from_rotation_z(std::f32::consts::FRAC_PI_4), 1e-5));

    p.play_clip("animation_1").unwrap();
    p.set_time(1.0);
    // Sampled scale 3 over bind scale 2
    let spine = p.sink().get("spine").unwrap();
    assert_relative_eq!(spine.scale.x, 1.5, epsilon = 1e-5);
}

#[test]
fn test_loop_playback_over_many_ticks() {
    let mut p = rig_player();
    p.set_loop_mode(LoopMode::Loop);
    p.set_frame_rate(10.0);
    p.play();
    for _ in 0..45 {
        p.tick();
    }
    // 4.5s into a 4s clip
    assert_relative_eq!(p.current_time(), 0.5, epsilon = 1e-3);
    assert_eq!(p.state(), PlayState::Playing);
}

#[test]
fn test_stop_returns_nodes_to_bind_pose() {
    let mut p = rig_player();
    p.play();
    p.advance(3.0);
    assert_ne!(p.sink().get("hips"), Some(&NodeTransform::IDENTITY));

    p.stop();
    let table = p.into_sink();
    for (_, transform) in table.iter() {
        assert_eq!(*transform, NodeTransform::IDENTITY);
    }
}

#[test]
fn test_snapshots_cross_threads() {
    let shared = Arc::new(SharedNodeTransforms::new());
    let mut p = rig_player();
    p.play();
    p.advance(1.0);
    shared.publish(p.sink());

    let reader = Arc::clone(&shared);
    let x = thread::spawn(move || {
        reader
            .latest()
            .get("hips")
            .map_or(f32::NAN, |t| t.translation.x)
    })
    .join()
    .unwrap();
    assert_relative_eq!(x, 1.0, epsilon = 1e-5);
}
