/*
 *  tests/common/mod.rs
 *
 *  Shared fixtures for the integration tests
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 */

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use cabinet_glow::config::{self, Config};
use cabinet_glow::constants::NUM_LEDS;
use cabinet_glow::display::drivers::{MockLedStrip, MockVfd};
use cabinet_glow::display::{shared_leds, shared_vfd};
use cabinet_glow::watcher::{exe_name, ProcessInfo, ProcessSource};
use cabinet_glow::EffectCoordinator;

pub const BANNER: &str = "[cab]";

pub fn temp_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cabinet-glow-it-{}-{}.txt", tag, std::process::id()))
}

/// Config with short timings, no audio and `games` appended under `games:`
pub fn test_config(tag: &str, games: &str) -> Config {
    let yaml = format!(
        "banner: '{BANNER}'\n\
         unknown_games_log: {}\n\
         timings:\n  settle_ms: 5\n  text_rewrite_ms: 2\n  join_timeout_ms: 500\n\
         audio:\n  enabled: false\n\
         games:\n{}",
        temp_path(tag).display(),
        games
    );
    let cfg = Config::from_yaml_str(&yaml).expect("test config parses");
    config::validate(&cfg).expect("test config valid");
    cfg
}

pub fn coordinator(cfg: &Config) -> (EffectCoordinator, MockLedStrip, MockVfd) {
    let leds = MockLedStrip::new(NUM_LEDS);
    let vfd = MockVfd::new();
    let coord = EffectCoordinator::new(shared_leds(leds.clone()), shared_vfd(vfd.clone()), cfg);
    (coord, leds, vfd)
}

/// Process table the test can rewrite between polls
#[derive(Clone, Default)]
pub struct FakeProcesses {
    table: Arc<Mutex<Vec<ProcessInfo>>>,
}

impl FakeProcesses {
    pub fn set(&self, exes: &[&str]) {
        let table = exes
            .iter()
            .enumerate()
            .map(|(i, exe)| ProcessInfo {
                pid: 100 + i as u32,
                name: exe_name(exe).to_string(),
                exe: Some(exe.to_string()),
            })
            .collect();
        *self.table.lock().unwrap() = table;
    }
}

impl ProcessSource for FakeProcesses {
    fn processes(&mut self) -> Vec<ProcessInfo> {
        self.table.lock().unwrap().clone()
    }
}
