//! Constants shared across the controller.

use std::time::Duration;

use crate::display::traits::BlendTiming;

/// Logical pixels on the cabinet strip.
pub const NUM_LEDS: usize = 22;

/// Reserved identifier reported when no game process is running.
pub const IDLE_GAME: &str = "NO_GAME";

/// Marquee banner, padded so it scrolls in from and out to blank.
pub const DEFAULT_BANNER: &str = "           Cabinet Glow           ";

/// Process table poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Install directories a game executable must live under (matched case-insensitively).
pub const DEFAULT_GAME_DIRS: [&str; 2] = [r"c:\games", r"c:\emulators"];

/// Unknown-games log, relative to the home directory.
pub const UNKNOWN_GAMES_FILE: &str = "unknown_games.txt";

// Game switch timings
/// Fade used when switching to a new effect (60 frames, 2ms apart).
pub const TRANSITION_BLEND: BlendTiming = BlendTiming::new(60, 2);
/// Wait after the transition fade before animating.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);
/// Gap between the two scroll text writes.
pub const TEXT_REWRITE_DELAY: Duration = Duration::from_millis(300);
/// Longest wait for an animation session to acknowledge cancellation.
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

// VFD text window
pub const VFD_TEXT_LINE: u8 = 0;
pub const VFD_TEXT_COL: u8 = 2;
pub const VFD_TEXT_WIDTH: u16 = 160;
pub const VFD_SCROLL_SPEED: u8 = 1;
pub const VFD_BRIGHTNESS: u8 = 4;

// Coin blink overlay
pub const COIN_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub const COIN_BLINK_DURATION: Duration = Duration::from_millis(300);
