/*
 *  display/traits.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for the LED strip and VFD abstraction
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

use serde::{Deserialize, Serialize};

use crate::display::bitmap::{self, Bitmap};
use crate::display::color::PixelBuffer;
use crate::display::error::DisplayError;
use crate::display::pixel_order::PixelOrder;

/// Hardware-side interpolation used by [`LedStrip::submit_faded`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendTiming {
    /// Intermediate frames the controller renders between old and new
    pub frame_count: u16,
    /// Delay between intermediate frames
    pub per_frame_delay_ms: u16,
}

impl BlendTiming {
    pub const fn new(frame_count: u16, per_frame_delay_ms: u16) -> Self {
        Self { frame_count, per_frame_delay_ms }
    }
}

/// Minimal LED strip abstraction - every strip backend implements this
///
/// The controller firmware owns pixel timing; this side only pushes whole
/// frames, either drawn at once or cross-faded using the last configured
/// [`BlendTiming`].
pub trait LedStrip: Send {
    /// Number of logical pixels on the strip
    fn pixel_count(&self) -> usize;

    /// Permute a logical frame into device order
    fn remap(&self, order: &PixelOrder, buffer: &PixelBuffer) -> Result<PixelBuffer, DisplayError> {
        order.apply(buffer)
    }

    /// Set the interpolation used by subsequent faded submissions
    fn configure_blend(&mut self, timing: BlendTiming) -> Result<(), DisplayError>;

    /// Set and draw a frame with no interpolation
    fn submit_immediate(&mut self, buffer: &PixelBuffer) -> Result<(), DisplayError>;

    /// Fade from the current frame to `buffer`
    fn submit_faded(&mut self, buffer: &PixelBuffer) -> Result<(), DisplayError>;
}

/// Vacuum fluorescent display on the cabinet marquee
///
/// Text is handled by the VFD controller's scroll engine; graphics are
/// column-major bitmaps, one byte per 8-pixel page.
pub trait Vfd: Send {
    fn reset(&mut self) -> Result<(), DisplayError>;

    fn power(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Restrict scrolling text to `width` pixels starting at (line, col)
    fn set_text_window(&mut self, line: u8, col: u8, width: u16) -> Result<(), DisplayError>;

    fn set_scroll_speed(&mut self, speed: u8) -> Result<(), DisplayError>;

    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError>;

    fn write_scroll_text(&mut self, text: &str) -> Result<(), DisplayError>;

    fn draw_bitmap(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height_words: u16,
        bitmap: &[u8],
    ) -> Result<(), DisplayError>;

    fn convert_ascii_art(&self, lines: &[String]) -> Result<Bitmap, DisplayError> {
        bitmap::convert_ascii_art(lines)
    }

    fn rotate_bitmap(&self, bitmap: &Bitmap) -> Vec<u8> {
        bitmap::rotate_bitmap(bitmap)
    }
}
