/*
 *  unknown_games.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Append-only log of games with no configuration, ready to paste into games:
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

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;
use log::info;
use thiserror::Error;

use crate::config::GameEntry;
use crate::effects::EffectSpec;

pub const LOG_HEADER: &str = "# Unknown Games\n\n";

#[derive(Debug, Error)]
pub enum UnknownLogError {
    #[error("unknown games log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("serialising placeholder: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Placeholder `games:` entry for `exe` carrying the randomised settings it was given
pub fn placeholder_entry(exe: &str, effect: &EffectSpec, scroll_text: &str) -> Result<String, UnknownLogError> {
    let entry = GameEntry {
        led_effect: effect.kind,
        led_color: effect.color1,
        led_color_2: effect.color2,
        scroll_text: scroll_text.to_string(),
        ascii_file: None,
        // display string only, never resolved
        launch_path: Some(format!(r"C:\Games\Unknown\{}", exe)),
    };
    let mut block = BTreeMap::new();
    block.insert(exe, entry);
    Ok(serde_yaml::to_string(&block)?)
}

#[derive(Debug, Clone)]
pub struct UnknownGamesLog {
    path: PathBuf,
}

impl UnknownGamesLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append a placeholder block, writing the header first if the file is new
    pub fn record(&self, exe: &str, effect: &EffectSpec, scroll_text: &str) -> Result<(), UnknownLogError> {
        let io_err = |source: io::Error| UnknownLogError::Io { path: self.path.clone(), source };

        match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(mut f) => f.write_all(LOG_HEADER.as_bytes()).map_err(io_err)?,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(io_err(e)),
        }

        let block = placeholder_entry(exe, effect, scroll_text)?;
        let mut f = OpenOptions::new().append(true).open(&self.path).map_err(io_err)?;
        write!(
            f,
            "# first seen {}\n{}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            block
        )
        .map_err(io_err)?;

        info!("recorded unknown game {} in {}", exe, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameLibrary;
    use crate::display::Color;
    use crate::effects::EffectKind;

    fn temp_log(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cabinet-glow-unknown-{}-{}.txt", tag, std::process::id()))
    }

    fn spec() -> EffectSpec {
        EffectSpec::new(EffectKind::Pulse, Color::new(1, 2, 3), Color::new(4, 5, 6))
    }

    #[test]
    fn test_header_written_once() {
        let path = temp_log("header");
        let _ = std::fs::remove_file(&path);
        let log = UnknownGamesLog::new(&path);

        log.record("a.exe", &spec(), "Playing Unknown Game (a.exe)").unwrap();
        log.record("b.exe", &spec(), "Playing Unknown Game (b.exe)").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(text.starts_with(LOG_HEADER));
        assert_eq!(text.matches("# Unknown Games").count(), 1);
        assert!(text.find("a.exe").unwrap() < text.find("b.exe").unwrap());
        assert!(text.contains(r"C:\Games\Unknown\b.exe"));
    }

    #[test]
    fn test_placeholder_parses_as_library() {
        let block = placeholder_entry("odd game.exe", &spec(), "Playing Unknown Game (odd game.exe)").unwrap();
        let lib: GameLibrary = serde_yaml::from_str(&block).unwrap();
        let entry = &lib["odd game.exe"];
        assert_eq!(entry.effect(), spec());
        assert_eq!(entry.scroll_text, "Playing Unknown Game (odd game.exe)");
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let log = UnknownGamesLog::new("/nonexistent-dir/unknown.txt");
        assert!(matches!(log.record("x.exe", &spec(), ""), Err(UnknownLogError::Io { .. })));
    }
}
