/*
 *  presentation.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Marquee VFD - scrolling text and ASCII art
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

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    VFD_BRIGHTNESS, VFD_SCROLL_SPEED, VFD_TEXT_COL, VFD_TEXT_LINE, VFD_TEXT_WIDTH,
};
use crate::display::{DisplayError, SharedVfd};

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("VFD: {0}")]
    Display(#[from] DisplayError),
    #[error("reading artwork {path}: {source}")]
    Artwork {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Scroll text window and panel settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VfdSettings {
    pub line: u8,
    pub col: u8,
    pub width: u16,
    pub scroll_speed: u8,
    pub brightness: u8,
}

impl Default for VfdSettings {
    fn default() -> Self {
        Self {
            line: VFD_TEXT_LINE,
            col: VFD_TEXT_COL,
            width: VFD_TEXT_WIDTH,
            scroll_speed: VFD_SCROLL_SPEED,
            brightness: VFD_BRIGHTNESS,
        }
    }
}

/// Text actually scrolled: the banner alone for blank text, else text then banner
pub fn compose_text(text: &str, banner: &str) -> String {
    if text.trim().is_empty() {
        banner.to_string()
    } else {
        format!("{}   {}", text, banner)
    }
}

/// Split artwork into lines, dropping one trailing blank line
pub fn artwork_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    if lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}

/// Everything the coordinator shows on the marquee goes through here
pub struct Presentation {
    vfd: SharedVfd,
    settings: VfdSettings,
    banner: String,
    rewrite_delay: Duration,
}

impl Presentation {
    pub fn new(vfd: SharedVfd, settings: VfdSettings, banner: String, rewrite_delay: Duration) -> Self {
        Self { vfd, settings, banner, rewrite_delay }
    }

    /// Reset the panel and power it up, clearing any previous art
    pub async fn reset(&self) -> Result<(), PresentationError> {
        let mut vfd = self.vfd.lock().await;
        vfd.reset()?;
        vfd.power(true)?;
        Ok(())
    }

    /// Scroll `text` followed by the banner.
    ///
    /// The text is written twice, `rewrite_delay` apart: the VFD can drop a
    /// write that lands mid-refresh.
    pub async fn set_text(&self, text: &str) -> Result<(), PresentationError> {
        let composed = compose_text(text, &self.banner);
        {
            let mut vfd = self.vfd.lock().await;
            vfd.set_text_window(self.settings.line, self.settings.col, self.settings.width)?;
            vfd.set_scroll_speed(self.settings.scroll_speed)?;
            vfd.set_brightness(self.settings.brightness)?;
            vfd.write_scroll_text(&composed)?;
        }
        tokio::time::sleep(self.rewrite_delay).await;
        self.vfd.lock().await.write_scroll_text(&composed)?;

        info!("VFD text => '{}' => '{}'", text, composed);
        Ok(())
    }

    /// Draw an ASCII art file at the top left of the panel
    pub async fn show_artwork(&self, path: &Path) -> Result<(), PresentationError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PresentationError::Artwork { path: path.to_path_buf(), source })?;
        let lines = artwork_lines(&content);

        let mut vfd = self.vfd.lock().await;
        vfd.power(true)?;
        let bitmap = vfd.convert_ascii_art(&lines)?;
        let columns = vfd.rotate_bitmap(&bitmap);
        vfd.draw_bitmap(0, 0, bitmap.width, bitmap.height / 8, &columns)?;

        debug!("artwork {} drawn, {}x{}", path.display(), bitmap.width, bitmap.height);
        Ok(())
    }
}
