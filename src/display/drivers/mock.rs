/*
 *  display/drivers/mock.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock LED strip and VFD drivers for testing without hardware
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

use std::sync::{Arc, Mutex};

use crate::display::color::PixelBuffer;
use crate::display::error::DisplayError;
use crate::display::traits::{BlendTiming, LedStrip, Vfd};

/// One call made against a [`MockLedStrip`], in submission order
#[derive(Debug, Clone, PartialEq)]
pub enum LedOp {
    Blend(BlendTiming),
    Immediate(PixelBuffer),
    Faded(PixelBuffer),
}

impl LedOp {
    /// The frame carried by a submission, `None` for blend configuration
    pub fn frame(&self) -> Option<&PixelBuffer> {
        match self {
            LedOp::Immediate(b) | LedOp::Faded(b) => Some(b),
            LedOp::Blend(_) => None,
        }
    }
}

/// Internal state for the mock strip (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockLedState {
    /// Every call in order
    pub ops: Vec<LedOp>,

    /// Simulate failures (for error testing)
    pub simulate_submit_failure: bool,
}

impl MockLedState {
    pub fn frames(&self) -> Vec<&PixelBuffer> {
        self.ops.iter().filter_map(LedOp::frame).collect()
    }

    pub fn faded_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, LedOp::Faded(_))).count()
    }

    pub fn immediate_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, LedOp::Immediate(_))).count()
    }
}

/// Mock LED strip
///
/// Records every submission so tests can assert on ordering. Clones share
/// the same state, so keep one clone and hand the other to the coordinator.
#[derive(Debug, Clone)]
pub struct MockLedStrip {
    pixel_count: usize,
    state: Arc<Mutex<MockLedState>>,
}

impl MockLedStrip {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            pixel_count,
            state: Arc::new(Mutex::new(MockLedState::default())),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockLedState>> {
        Arc::clone(&self.state)
    }

    pub fn ops(&self) -> Vec<LedOp> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state.lock().unwrap().ops.clear();
    }

    fn record(&self, op: LedOp) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        if state.simulate_submit_failure && op.frame().is_some() {
            return Err(DisplayError::Other("Simulated submit failure".to_string()));
        }
        state.ops.push(op);
        Ok(())
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

impl LedStrip for MockLedStrip {
    fn pixel_count(&self) -> usize {
        self.pixel_count
    }

    fn configure_blend(&mut self, timing: BlendTiming) -> Result<(), DisplayError> {
        self.record(LedOp::Blend(timing))
    }

    fn submit_immediate(&mut self, buffer: &PixelBuffer) -> Result<(), DisplayError> {
        self.check_len(buffer)?;
        self.record(LedOp::Immediate(buffer.clone()))
    }

    fn submit_faded(&mut self, buffer: &PixelBuffer) -> Result<(), DisplayError> {
        self.check_len(buffer)?;
        self.record(LedOp::Faded(buffer.clone()))
    }
}

/// One call made against a [`MockVfd`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VfdOp {
    Reset,
    Power(bool),
    TextWindow { line: u8, col: u8, width: u16 },
    ScrollSpeed(u8),
    Brightness(u8),
    ScrollText(String),
    Bitmap { x: u16, y: u16, width: u16, height_words: u16, bytes: usize },
}

#[derive(Debug, Default)]
pub struct MockVfdState {
    pub ops: Vec<VfdOp>,
    pub simulate_failure: bool,
}

impl MockVfdState {
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                VfdOp::ScrollText(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Mock VFD, same sharing rules as [`MockLedStrip`]
#[derive(Debug, Clone, Default)]
pub struct MockVfd {
    state: Arc<Mutex<MockVfdState>>,
}

impl MockVfd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Arc<Mutex<MockVfdState>> {
        Arc::clone(&self.state)
    }

    pub fn ops(&self) -> Vec<VfdOp> {
        self.state.lock().unwrap().ops.clone()
    }

    fn record(&self, command: &'static str, op: VfdOp) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        if state.simulate_failure {
            return Err(DisplayError::CommandFailed {
                command,
                reason: "simulated".to_string(),
            });
        }
        state.ops.push(op);
        Ok(())
    }
}

impl Vfd for MockVfd {
    fn reset(&mut self) -> Result<(), DisplayError> {
        self.record("reset", VfdOp::Reset)
    }

    fn power(&mut self, on: bool) -> Result<(), DisplayError> {
        self.record("power", VfdOp::Power(on))
    }

    fn set_text_window(&mut self, line: u8, col: u8, width: u16) -> Result<(), DisplayError> {
        self.record("text_window", VfdOp::TextWindow { line, col, width })
    }

    fn set_scroll_speed(&mut self, speed: u8) -> Result<(), DisplayError> {
        self.record("scroll_speed", VfdOp::ScrollSpeed(speed))
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        self.record("brightness", VfdOp::Brightness(level))
    }

    fn write_scroll_text(&mut self, text: &str) -> Result<(), DisplayError> {
        self.record("scroll_text", VfdOp::ScrollText(text.to_string()))
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
                "{}x{} pages needs {} bytes, got {}",
                width,
                height_words,
                width as usize * height_words as usize,
                bitmap.len()
            )));
        }
        self.record(
            "draw_bitmap",
            VfdOp::Bitmap { x, y, width, height_words, bytes: bitmap.len() },
        )
    }
}
