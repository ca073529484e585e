/*
 *  display/drivers/emulator.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Log-backed LED strip and VFD for running without the cabinet hardware
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

use log::{debug, info, trace};

use crate::display::color::PixelBuffer;
use crate::display::error::DisplayError;
use crate::display::traits::{BlendTiming, LedStrip, Vfd};

/// Render a frame as `#rrggbb` cells for the log
fn frame_hex(buffer: &PixelBuffer) -> String {
    buffer
        .pixels()
        .iter()
        .map(|c| format!("{:02x}{:02x}{:02x}", c.r, c.g, c.b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Emulator LED strip
///
/// Writes frames to the log instead of the strip controller. Immediate
/// frames are logged at trace level (they arrive up to 100 times a second),
/// faded frames at debug.
#[derive(Debug)]
pub struct EmulatorLedStrip {
    pixel_count: usize,
    blend: BlendTiming,
    frame_count: u64,
}

impl EmulatorLedStrip {
    pub fn new(pixel_count: usize) -> Self {
        info!("LED emulator: {} pixels", pixel_count);
        Self {
            pixel_count,
            blend: BlendTiming::new(0, 0),
            frame_count: 0,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn check_len(&self, buffer: &PixelBuffer) -> Result<(), DisplayError> {
        if buffer.len() != self.pixel_count {
            return Err(DisplayError::BufferSizeMismatch {
                expected: self.pixel_count,
                actual: buffer.len(),
            });
        }
        Ok(())
    }
}

impl LedStrip for EmulatorLedStrip {
    fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    fn configure_blend(&mut self, timing: BlendTiming) -> Result<(), DisplayError> {
        if timing != self.blend {
            debug!(
                "LED emulator: blend {} frames x {}ms",
                timing.frame_count, timing.per_frame_delay_ms
            );
        }
        self.blend = timing;
        Ok(())
    }

    fn submit_immediate(&mut self, buffer: &PixelBuffer) -> Result<(), DisplayError> {
        self.check_len(buffer)?;
        self.frame_count += 1;
        trace!("LED emulator: draw [{}]", frame_hex(buffer));
        Ok(())
    }

    fn submit_faded(&mut self, buffer: &PixelBuffer) -> Result<(), DisplayError> {
        self.check_len(buffer)?;
        self.frame_count += 1;
        debug!(
            "LED emulator: fade over {}x{}ms to [{}]",
            self.blend.frame_count,
            self.blend.per_frame_delay_ms,
            frame_hex(buffer)
        );
        Ok(())
    }
}

/// Emulator VFD, logs text and bitmap geometry
#[derive(Debug, Default)]
pub struct EmulatorVfd {
    powered: bool,
}

impl EmulatorVfd {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Vfd for EmulatorVfd {
    fn reset(&mut self) -> Result<(), DisplayError> {
        debug!("VFD emulator: reset");
        Ok(())
    }

    fn power(&mut self, on: bool) -> Result<(), DisplayError> {
        if on != self.powered {
            debug!("VFD emulator: power {}", if on { "on" } else { "off" });
        }
        self.powered = on;
        Ok(())
    }

    fn set_text_window(&mut self, line: u8, col: u8, width: u16) -> Result<(), DisplayError> {
        debug!("VFD emulator: text window line {} col {} width {}", line, col, width);
        Ok(())
    }

    fn set_scroll_speed(&mut self, speed: u8) -> Result<(), DisplayError> {
        debug!("VFD emulator: scroll speed {}", speed);
        Ok(())
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        debug!("VFD emulator: brightness {}", level);
        Ok(())
    }

    fn write_scroll_text(&mut self, text: &str) -> Result<(), DisplayError> {
        info!("VFD emulator: scrolling '{}'", text.trim());
        Ok(())
    }

    fn draw_bitmap(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height_words: u16,
        bitmap: &[u8],
    ) -> Result<(), DisplayError> {
        if bitmap.len() != width as usize * height_words as usize {
            return Err(DisplayError::InvalidBitmap(format!(
                "expected {} bytes, got {}",
                width as usize * height_words as usize,
                bitmap.len()
            )));
        }
        info!(
            "VFD emulator: bitmap {}x{} at ({}, {})",
            width,
            height_words as u32 * 8,
            x,
            y
        );
        Ok(())
    }
}
