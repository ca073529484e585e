/*
 *  tests/end_to_end.rs
 *
 *  Full cycle: idle, chess starts, chess exits
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 */

mod common;

use std::time::Duration;

use cabinet_glow::constants::{IDLE_GAME, NUM_LEDS};
use cabinet_glow::display::drivers::mock::{LedOp, VfdOp};
use cabinet_glow::display::{BlendTiming, Color, PixelBuffer};
use cabinet_glow::effects::rainbow::rainbow_frame;
use cabinet_glow::effects::{EffectKind, EffectSpec};
use cabinet_glow::{CoordinatorState, GameWatcher};
use common::{FakeProcesses, BANNER};

const CHESS: &str = "  chess.exe:\n    led_effect: rainbow\n    scroll_text: Chess\n";

#[tokio::test]
async fn test_chess_session() {
    let cfg = common::test_config("e2e", CHESS);
    let (mut coord, leds, vfd) = common::coordinator(&cfg);
    let procs = FakeProcesses::default();
    let mut watcher = GameWatcher::new(Box::new(procs.clone()), cfg.game_dirs());

    // startup shows the idle scene
    coord.apply_game(IDLE_GAME).await;
    assert_eq!(coord.state(), CoordinatorState::Active(EffectSpec::solid(Color::IDLE_YELLOW)));
    assert_eq!(
        leds.ops(),
        vec![
            LedOp::Blend(BlendTiming::new(60, 2)),
            LedOp::Faded(PixelBuffer::filled(NUM_LEDS, Color::IDLE_YELLOW)),
        ]
    );
    leds.clear_ops();
    vfd.state().lock().unwrap().ops.clear();

    // chess launches
    procs.set(&["/usr/bin/explorer", r"C:\Games\Chess\chess.exe"]);
    let game = watcher.poll().expect("chess detected");
    assert_eq!(game, "chess.exe");
    coord.apply_game(&game).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let ops = leds.ops();
    assert_eq!(ops[0], LedOp::Blend(BlendTiming::new(60, 2)));
    assert_eq!(ops[1], LedOp::Faded(rainbow_frame(NUM_LEDS, 0)));
    assert!(ops.len() > 3, "rainbow animating");
    assert!(ops[2..].iter().all(|op| matches!(op, LedOp::Immediate(_))));

    let chess_text = format!("Chess   {}", BANNER);
    assert_eq!(vfd.state().lock().unwrap().texts(), vec![chess_text.as_str(), chess_text.as_str()]);
    assert_eq!(&vfd.ops()[..2], &[VfdOp::Reset, VfdOp::Power(true)]);

    // same table again, no event
    assert_eq!(watcher.poll(), None);

    // chess exits
    procs.set(&["/usr/bin/explorer"]);
    let game = watcher.poll().expect("exit detected");
    assert_eq!(game, IDLE_GAME);
    coord.apply_game(&game).await;

    let settled = leds.ops();
    let state = leds.state();
    assert_eq!(state.lock().unwrap().faded_count(), 2);
    assert_eq!(
        settled.last(),
        Some(&LedOp::Faded(PixelBuffer::filled(NUM_LEDS, Color::IDLE_YELLOW)))
    );
    assert_eq!(coord.session_effect().map(|e| e.kind), Some(EffectKind::Solid));

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(leds.ops().len(), settled.len(), "idle scene is static");

    let texts: Vec<String> = vfd
        .state()
        .lock()
        .unwrap()
        .texts()
        .iter()
        .map(|t| t.to_string())
        .collect();
    assert_eq!(texts[texts.len() - 2..], [BANNER.to_string(), BANNER.to_string()]);

    coord.shutdown().await;
}

#[tokio::test]
async fn test_unknown_game_is_logged() {
    let cfg = common::test_config("e2e-unknown", "");
    let log = cfg.unknown_games_log();
    let _ = std::fs::remove_file(&log);
    let (mut coord, _leds, vfd) = common::coordinator(&cfg);

    coord.apply_game("mystery.exe").await;
    coord.shutdown().await;

    let logged = std::fs::read_to_string(&log).expect("unknown games log written");
    std::fs::remove_file(&log).ok();
    assert!(logged.starts_with("# Unknown Games"));
    assert!(logged.contains("mystery.exe:"));
    assert!(logged.contains("Playing Unknown Game (mystery.exe)"));

    let texts = vfd.state().lock().unwrap().texts().len();
    assert_eq!(texts, 2);
}

#[tokio::test]
async fn test_missing_artwork_does_not_block_text() {
    let games = "  art.exe:\n    scroll_text: Art\n    ascii_file: /nonexistent/art.txt\n";
    let cfg = common::test_config("e2e-art", games);
    let (mut coord, _leds, vfd) = common::coordinator(&cfg);

    coord.apply_game("art.exe").await;
    coord.shutdown().await;

    let ops = vfd.ops();
    assert!(!ops.iter().any(|op| matches!(op, VfdOp::Bitmap { .. })));
    let art = format!("Art   {}", BANNER);
    assert_eq!(vfd.state().lock().unwrap().texts(), vec![art.as_str(), art.as_str()]);
}
