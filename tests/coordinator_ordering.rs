/*
 *  tests/coordinator_ordering.rs
 *
 *  Frames from a replaced effect never land after its successor starts
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 */

mod common;

use std::time::Duration;

use cabinet_glow::constants::NUM_LEDS;
use cabinet_glow::display::drivers::mock::LedOp;
use cabinet_glow::display::{BlendTiming, Color, PixelBuffer};
use cabinet_glow::effects::{EffectKind, EffectSpec};
use cabinet_glow::CoordinatorState;

const BLUE: Color = Color::new(0, 0, 255);

const GAMES: &str = "  rainbow.exe: {led_effect: rainbow}\n\
                     \x20 chase.exe: {led_effect: theater-chase, led_color: [0, 0, 255]}\n\
                     \x20 solid.exe: {led_color: [10, 20, 30]}\n";

fn is_chase(frame: &PixelBuffer) -> bool {
    frame.pixels().iter().all(|p| *p == BLUE || *p == Color::BLACK)
}

/// Index of the last faded submission
fn last_fade(ops: &[LedOp]) -> usize {
    ops.iter()
        .rposition(|op| matches!(op, LedOp::Faded(_)))
        .expect("a transition fade")
}

#[tokio::test]
async fn test_old_frames_never_follow_new_fade() {
    let cfg = common::test_config("ordering", GAMES);
    let (mut coord, leds, _vfd) = common::coordinator(&cfg);

    coord.apply_game("rainbow.exe").await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    coord.apply_game("chase.exe").await;
    tokio::time::sleep(Duration::from_millis(160)).await;
    coord.shutdown().await;

    let ops = leds.ops();
    let fade = last_fade(&ops);
    assert_eq!(ops[fade], LedOp::Faded(PixelBuffer::filled(NUM_LEDS, BLUE)));
    assert_eq!(ops[fade - 1], LedOp::Blend(BlendTiming::new(60, 2)));

    let before = &ops[..fade - 1];
    assert!(before.iter().any(|op| matches!(op, LedOp::Immediate(_))), "rainbow animated");

    let after: Vec<&PixelBuffer> = ops[fade + 1..].iter().filter_map(LedOp::frame).collect();
    assert!(!after.is_empty(), "chase animated");
    assert!(after.iter().all(|f| is_chase(f)), "rainbow frame after chase fade");
}

#[tokio::test]
async fn test_solid_effect_stops_drawing() {
    let cfg = common::test_config("solid", GAMES);
    let (mut coord, leds, _vfd) = common::coordinator(&cfg);

    coord.apply_game("chase.exe").await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    coord.apply_game("solid.exe").await;
    assert_eq!(
        coord.state(),
        CoordinatorState::Active(EffectSpec::new(EffectKind::Solid, Color::new(10, 20, 30), Color::BLACK))
    );

    let settled = leds.ops().len();
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(leds.ops().len(), settled, "solid session drew frames");

    coord.shutdown().await;
}

#[tokio::test]
async fn test_reapply_same_game_restarts_cleanly() {
    let cfg = common::test_config("reapply", GAMES);
    let (mut coord, leds, _vfd) = common::coordinator(&cfg);

    coord.apply_game("chase.exe").await;
    let first = coord.session_id();
    coord.apply_game("chase.exe").await;
    assert_ne!(coord.session_id(), first);

    tokio::time::sleep(Duration::from_millis(80)).await;
    coord.shutdown().await;

    let state = leds.state();
    let state = state.lock().unwrap();
    assert_eq!(state.faded_count(), 2);
    assert!(state.frames().iter().all(|f| is_chase(f)));
}
