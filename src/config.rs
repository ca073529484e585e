use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::audio::AudioSettings;
use crate::constants::{
    COIN_POLL_INTERVAL, DEFAULT_BANNER, DEFAULT_GAME_DIRS, DEFAULT_POLL_INTERVAL, JOIN_TIMEOUT,
    NUM_LEDS, SETTLE_DELAY, TEXT_REWRITE_DELAY, TRANSITION_BLEND, UNKNOWN_GAMES_FILE,
};
use crate::display::{BlendTiming, Color, PixelOrder};
use crate::effects::{EffectKind, EffectSpec};
use crate::presentation::VfdSettings;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// One configured game, keyed by executable name in [`Config::games`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    #[serde(default = "default_effect")]
    pub led_effect: EffectKind,
    #[serde(default = "default_color")]
    pub led_color: Color,
    #[serde(default)]
    pub led_color_2: Color,
    #[serde(default)]
    pub scroll_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascii_file: Option<PathBuf>,
    /// Where the game is installed, for the operator's reference only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_path: Option<String>,
}

fn default_effect() -> EffectKind { EffectKind::Solid }
fn default_color() -> Color { Color::WHITE }

impl GameEntry {
    pub fn effect(&self) -> EffectSpec {
        EffectSpec::new(self.led_effect, self.led_color, self.led_color_2)
    }
}

/// Executable name -> settings, exact match
pub type GameLibrary = BTreeMap<String, GameEntry>;

/// What the cabinet shows when no game is running
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    pub color: Color,
    pub scroll_text: String,
    pub ascii_file: Option<PathBuf>,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self { color: Color::IDLE_YELLOW, scroll_text: String::new(), ascii_file: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub settle_ms: u64,
    pub text_rewrite_ms: u64,
    pub join_timeout_ms: u64,
    pub transition_blend: BlendTiming,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            settle_ms: SETTLE_DELAY.as_millis() as u64,
            text_rewrite_ms: TEXT_REWRITE_DELAY.as_millis() as u64,
            join_timeout_ms: JOIN_TIMEOUT.as_millis() as u64,
            transition_blend: TRANSITION_BLEND,
        }
    }
}

impl Timings {
    pub fn settle(&self) -> Duration { Duration::from_millis(self.settle_ms) }
    pub fn text_rewrite(&self) -> Duration { Duration::from_millis(self.text_rewrite_ms) }
    pub fn join_timeout(&self) -> Duration { Duration::from_millis(self.join_timeout_ms) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LedConfig {
    /// Device position -> logical position, identity when absent
    pub pixel_order: Option<PixelOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinConfig {
    pub enabled: bool,
    pub poll_ms: u64,
}

impl Default for CoinConfig {
    fn default() -> Self {
        Self { enabled: true, poll_ms: COIN_POLL_INTERVAL.as_millis() as u64 }
    }
}

/// Top-level app configuration. Every group is optional; accessors fill defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General options
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub poll_interval_secs: Option<u64>,
    pub game_dirs: Option<Vec<String>>,
    pub unknown_games_log: Option<PathBuf>,
    /// Effects an unrecognised game may be given
    pub unknown_effects: Option<Vec<EffectKind>>,
    pub banner: Option<String>,
    pub idle: Option<IdleConfig>,
    pub timings: Option<Timings>,
    pub leds: Option<LedConfig>,
    pub vfd: Option<VfdSettings>,
    pub audio: Option<AudioSettings>,
    pub coin: Option<CoinConfig>,
    pub games: Option<GameLibrary>,
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_secs.map(Duration::from_secs).unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    pub fn game_dirs(&self) -> Vec<String> {
        self.game_dirs
            .clone()
            .unwrap_or_else(|| DEFAULT_GAME_DIRS.iter().map(|s| s.to_string()).collect())
    }

    /// Explicit path, else `~/unknown_games.txt`, else the working directory
    pub fn unknown_games_log(&self) -> PathBuf {
        self.unknown_games_log.clone().unwrap_or_else(|| {
            home_dir()
                .map(|h| h.join(UNKNOWN_GAMES_FILE))
                .unwrap_or_else(|| PathBuf::from(UNKNOWN_GAMES_FILE))
        })
    }

    pub fn unknown_effects(&self) -> Vec<EffectKind> {
        self.unknown_effects.clone().unwrap_or_else(|| {
            vec![
                EffectKind::Rainbow,
                EffectKind::TwoColorSine,
                EffectKind::TheaterChase,
                EffectKind::Pulse,
                EffectKind::Solid,
            ]
        })
    }

    pub fn banner(&self) -> &str {
        self.banner.as_deref().unwrap_or(DEFAULT_BANNER)
    }

    pub fn idle(&self) -> IdleConfig {
        self.idle.clone().unwrap_or_default()
    }

    pub fn timings(&self) -> Timings {
        self.timings.unwrap_or_default()
    }

    pub fn pixel_order(&self) -> PixelOrder {
        self.leds
            .as_ref()
            .and_then(|l| l.pixel_order.clone())
            .unwrap_or_else(|| PixelOrder::identity(NUM_LEDS))
    }

    pub fn vfd(&self) -> VfdSettings {
        self.vfd.unwrap_or_default()
    }

    pub fn audio(&self) -> AudioSettings {
        self.audio.clone().unwrap_or_default()
    }

    pub fn coin(&self) -> CoinConfig {
        self.coin.unwrap_or_default()
    }

    pub fn games(&self) -> GameLibrary {
        self.games.clone().unwrap_or_default()
    }

    pub fn from_yaml_str(s: &str) -> Result<Config, ConfigError> {
        let cfg: Config = serde_yaml::from_str(s)?;
        Ok(cfg)
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "cabinet-glow", version, about = "Arcade cabinet lighting and marquee controller")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, short = 'c', value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(long = "debug", short = 'v', alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Seconds between process table polls
    #[arg(long)]
    pub poll_interval_secs: Option<u64>,
    /// Game install directory prefix, repeatable
    #[arg(long = "game-dir", value_hint = ValueHint::DirPath)]
    pub game_dirs: Vec<String>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub unknown_games_log: Option<PathBuf>,
    /// Capture device name (substring) for the VU meter
    #[arg(long)]
    pub audio_device: Option<String>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: read YAML, merge CLI, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Pretty YAML of the effective config (nice for debugging)
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/cabinet-glow/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/cabinet-glow/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/cabinet-glow.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["cabinet-glow.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    Config::from_yaml_str(&s)
}

/// Shallow merge `src` into `dst`, Option-by-Option. Game maps are unioned.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()          { dst.log_level = src.log_level; }
    if src.poll_interval_secs.is_some() { dst.poll_interval_secs = src.poll_interval_secs; }
    if src.game_dirs.is_some()          { dst.game_dirs = src.game_dirs; }
    if src.unknown_games_log.is_some()  { dst.unknown_games_log = src.unknown_games_log; }
    if src.unknown_effects.is_some()    { dst.unknown_effects = src.unknown_effects; }
    if src.banner.is_some()             { dst.banner = src.banner; }
    if src.idle.is_some()               { dst.idle = src.idle; }
    if src.timings.is_some()            { dst.timings = src.timings; }
    if src.leds.is_some()               { dst.leds = src.leds; }
    if src.vfd.is_some()                { dst.vfd = src.vfd; }
    if src.audio.is_some()              { dst.audio = src.audio; }
    if src.coin.is_some()               { dst.coin = src.coin; }
    match (&mut dst.games, src.games) {
        (None, Some(g)) => dst.games = Some(g),
        (Some(d), Some(s)) => d.extend(s),
        _ => {}
    }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug                         { cfg.log_level = Some("debug".into()); }
    if cli.log_level.is_some()           { cfg.log_level = cli.log_level.clone(); }
    if cli.poll_interval_secs.is_some()  { cfg.poll_interval_secs = cli.poll_interval_secs; }
    if !cli.game_dirs.is_empty()         { cfg.game_dirs = Some(cli.game_dirs.clone()); }
    if cli.unknown_games_log.is_some()   { cfg.unknown_games_log = cli.unknown_games_log.clone(); }
    if let Some(dev) = cli.audio_device.as_ref() {
        let audio = cfg.audio.get_or_insert_with(AudioSettings::default);
        audio.device_hint = Some(dev.clone());
    }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.poll_interval_secs == Some(0) {
        return Err(ConfigError::Validation("poll_interval_secs must be > 0".into()));
    }
    if cfg.game_dirs.as_ref().is_some_and(|d| d.is_empty()) {
        return Err(ConfigError::Validation("game_dirs must list at least one directory".into()));
    }
    if cfg.unknown_effects.as_ref().is_some_and(|e| e.is_empty()) {
        return Err(ConfigError::Validation("unknown_effects must not be empty".into()));
    }
    if let Some(order) = cfg.leds.as_ref().and_then(|l| l.pixel_order.as_ref()) {
        if order.len() != NUM_LEDS {
            return Err(ConfigError::Validation(format!(
                "leds.pixel_order must have {} entries, found {}",
                NUM_LEDS,
                order.len()
            )));
        }
        order
            .validate()
            .map_err(|e| ConfigError::Validation(format!("leds.pixel_order: {}", e)))?;
    }
    if let Some(t) = cfg.timings.as_ref() {
        if t.join_timeout_ms == 0 {
            return Err(ConfigError::Validation("timings.join_timeout_ms must be > 0".into()));
        }
    }
    if let Some(a) = cfg.audio.as_ref() {
        if !(a.scale_factor.is_finite() && a.scale_factor > 0.0) {
            return Err(ConfigError::Validation("audio.scale_factor must be > 0".into()));
        }
    }
    if cfg.coin.as_ref().is_some_and(|c| c.poll_ms == 0) {
        return Err(ConfigError::Validation("coin.poll_ms must be > 0".into()));
    }
    Ok(())
}
