/*
 *  watcher.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Game watcher - polls the process table for anything installed under
 *  the configured game directories
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, error, info};

use crate::constants::IDLE_GAME;
use crate::coordinator::EffectCoordinator;

/// One row of the process table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    /// Full executable path, `None` when it cannot be read
    pub exe: Option<String>,
}

/// Anything that can list running processes
pub trait ProcessSource: Send {
    fn processes(&mut self) -> Vec<ProcessInfo>;
}

/// Reads `/proc`. Processes that vanish or deny access mid-scan are skipped.
#[derive(Debug, Default)]
pub struct ProcfsSource;

impl ProcfsSource {
    pub fn new() -> Self {
        Self
    }

    fn read_process(dir: &Path, pid: u32) -> Option<ProcessInfo> {
        let exe = match wine_path(dir) {
            Some(path) => path,
            None => fs::read_link(dir.join("exe")).ok()?.to_string_lossy().into_owned(),
        };
        Some(ProcessInfo { pid, name: exe_name(&exe).to_string(), exe: Some(exe) })
    }
}

/// Windows path of a Wine process, taken from argv[0]
fn wine_path(dir: &Path) -> Option<String> {
    let cmdline = fs::read(dir.join("cmdline")).ok()?;
    let argv0 = cmdline.split(|b| *b == 0).next()?;
    let argv0 = String::from_utf8_lossy(argv0);
    argv0.contains(":\\").then(|| argv0.into_owned())
}

/// Last path component, either separator
pub fn exe_name(path: &str) -> &str {
    path.rsplit(|c| c == '\\' || c == '/').next().unwrap_or(path)
}

impl ProcessSource for ProcfsSource {
    fn processes(&mut self) -> Vec<ProcessInfo> {
        let entries = match fs::read_dir("/proc") {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error reading /proc: {}", e);
                return Vec::new();
            }
        };

        entries
            .flatten()
            .filter_map(|entry| {
                let pid = entry.file_name().to_str()?.parse::<u32>().ok()?;
                Self::read_process(&entry.path(), pid)
            })
            .collect()
    }
}

/// First process whose executable sits under one of `dirs`, case-insensitive
pub fn find_game<'a>(processes: &'a [ProcessInfo], dirs: &[String]) -> Option<&'a ProcessInfo> {
    let dirs: Vec<String> = dirs.iter().map(|d| d.to_lowercase()).collect();
    processes.iter().find(|p| {
        p.exe
            .as_deref()
            .map(str::to_lowercase)
            .is_some_and(|exe| dirs.iter().any(|d| exe.starts_with(d.as_str())))
    })
}

/// Tracks which game is running and reports changes
pub struct GameWatcher {
    source: Arc<Mutex<Box<dyn ProcessSource>>>,
    game_dirs: Vec<String>,
    current: String,
}

impl GameWatcher {
    pub fn new(source: Box<dyn ProcessSource>, game_dirs: Vec<String>) -> Self {
        Self { source: Arc::new(Mutex::new(source)), game_dirs, current: IDLE_GAME.to_string() }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Name of the running game, or the idle marker
    pub fn detect(&mut self) -> String {
        let processes = lock_source(&self.source).processes();
        self.identify(&processes)
    }

    /// `detect` with the process scan moved onto the blocking pool
    pub async fn detect_blocking(&mut self) -> String {
        let source = Arc::clone(&self.source);
        let processes = match tokio::task::spawn_blocking(move || lock_source(&source).processes()).await {
            Ok(processes) => processes,
            Err(e) => {
                error!("Process scan failed: {}", e);
                Vec::new()
            }
        };
        self.identify(&processes)
    }

    fn identify(&self, processes: &[ProcessInfo]) -> String {
        match find_game(processes, &self.game_dirs) {
            Some(p) => {
                debug!("Found game: {} => {:?}", p.name, p.exe);
                p.name.clone()
            }
            None => IDLE_GAME.to_string(),
        }
    }

    /// Record `detected`, returning it only when it differs from the last one
    pub fn observe(&mut self, detected: String) -> Option<String> {
        if detected == self.current {
            debug!("{} still current, no action", detected);
            return None;
        }
        info!("Switching from '{}' to '{}'", self.current, detected);
        self.current = detected.clone();
        Some(detected)
    }

    pub fn poll(&mut self) -> Option<String> {
        let detected = self.detect();
        self.observe(detected)
    }

    /// Poll forever, handing each change to the coordinator. Cancel by
    /// dropping the future.
    pub async fn run(&mut self, coordinator: &mut EffectCoordinator, interval: Duration) {
        info!("Game detection started, checking every {:?}", interval);
        loop {
            let detected = self.detect_blocking().await;
            if let Some(game) = self.observe(detected) {
                coordinator.apply_game(&game).await;
            }
            coordinator.reap().await;
            tokio::time::sleep(interval).await;
        }
    }
}

fn lock_source(source: &Mutex<Box<dyn ProcessSource>>) -> MutexGuard<'_, Box<dyn ProcessSource>> {
    source.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: u32, exe: &str) -> ProcessInfo {
        ProcessInfo { pid, name: exe_name(exe).to_string(), exe: Some(exe.to_string()) }
    }

    fn dirs() -> Vec<String> {
        vec![r"c:\games".to_string(), r"c:\emulators".to_string()]
    }

    #[test]
    fn test_exe_name() {
        assert_eq!(exe_name(r"C:\Games\Chess\chess.exe"), "chess.exe");
        assert_eq!(exe_name("/usr/bin/bash"), "bash");
        assert_eq!(exe_name("plain"), "plain");
    }

    #[test]
    fn test_find_game_is_case_insensitive_prefix() {
        let procs = vec![
            proc(1, "/usr/bin/explorer"),
            ProcessInfo { pid: 2, name: "hidden".into(), exe: None },
            proc(3, r"C:\GAMES\Chess\chess.exe"),
            proc(4, r"C:\Emulators\mame.exe"),
        ];
        assert_eq!(find_game(&procs, &dirs()).map(|p| p.pid), Some(3));
        assert!(find_game(&procs[..2], &dirs()).is_none());
    }

    #[test]
    fn test_prefix_not_substring() {
        let procs = vec![proc(1, r"D:\backup\c:\games\x.exe")];
        assert!(find_game(&procs, &dirs()).is_none());
    }

    #[test]
    fn test_observe_reports_changes_only() {
        struct Nothing;
        impl ProcessSource for Nothing {
            fn processes(&mut self) -> Vec<ProcessInfo> {
                Vec::new()
            }
        }
        let mut w = GameWatcher::new(Box::new(Nothing), dirs());
        assert_eq!(w.current(), IDLE_GAME);
        assert_eq!(w.poll(), None);
        assert_eq!(w.observe("chess.exe".into()), Some("chess.exe".into()));
        assert_eq!(w.observe("chess.exe".into()), None);
        assert_eq!(w.poll(), Some(IDLE_GAME.to_string()));
    }

    #[tokio::test]
    async fn test_detect_blocking_scans_off_runtime() {
        struct Chess(std::thread::ThreadId);
        impl ProcessSource for Chess {
            fn processes(&mut self) -> Vec<ProcessInfo> {
                assert_ne!(std::thread::current().id(), self.0, "scan ran on the runtime thread");
                vec![proc(7, r"C:\Games\Chess\chess.exe")]
            }
        }
        let mut w = GameWatcher::new(Box::new(Chess(std::thread::current().id())), dirs());
        assert_eq!(w.detect_blocking().await, "chess.exe");
        assert_eq!(w.current(), IDLE_GAME);
    }

    #[test]
    fn test_procfs_lists_self() {
        let mut src = ProcfsSource::new();
        let me = std::process::id();
        assert!(src.processes().iter().any(|p| p.pid == me));
    }
}
