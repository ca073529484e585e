/*
 *  effects/rainbow.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Rainbow cycle across the strip
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

use std::time::Duration;

use crate::display::color::{Color, PixelBuffer};
use crate::effects::{EffectError, FrameGenerator, SubmitMode};

const CADENCE: Duration = Duration::from_millis(10);

/// Three band hue wheel, red -> green -> blue -> red over 0..=255
pub fn wheel(pos: u8) -> Color {
    match pos {
        0..=84 => Color::new(pos * 3, 255 - pos * 3, 0),
        85..=169 => {
            let p = pos - 85;
            Color::new(255 - p * 3, 0, p * 3)
        }
        _ => {
            let p = pos - 170;
            Color::new(0, p * 3, 255 - p * 3)
        }
    }
}

/// One rainbow frame, hue offset by `step`
pub fn rainbow_frame(num_leds: usize, step: usize) -> PixelBuffer {
    if num_leds == 0 {
        return PixelBuffer::default();
    }
    (0..num_leds)
        .map(|i| wheel(((i * 256 / num_leds + step) & 0xff) as u8))
        .collect()
}

#[derive(Debug)]
pub struct Rainbow {
    num_leds: usize,
    step: usize,
}

impl Rainbow {
    pub fn new(num_leds: usize) -> Self {
        Self { num_leds, step: 0 }
    }
}

impl FrameGenerator for Rainbow {
    fn next_frame(&mut self) -> Result<PixelBuffer, EffectError> {
        let frame = rainbow_frame(self.num_leds, self.step);
        self.step = (self.step + 1) % 256;
        Ok(frame)
    }

    fn submit_mode(&self) -> SubmitMode {
        SubmitMode::Immediate
    }

    fn cadence(&self) -> Duration {
        CADENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NUM_LEDS;

    #[test]
    fn test_wheel_band_edges() {
        assert_eq!(wheel(0), Color::new(0, 255, 0));
        assert_eq!(wheel(84), Color::new(252, 3, 0));
        assert_eq!(wheel(85), Color::new(255, 0, 0));
        assert_eq!(wheel(170), Color::new(0, 0, 255));
        assert_eq!(wheel(255), Color::new(0, 255, 0));
    }

    #[test]
    fn test_frame_length() {
        for step in [0, 1, 100, 255] {
            assert_eq!(rainbow_frame(NUM_LEDS, step).len(), NUM_LEDS);
        }
    }

    #[test]
    fn test_period_256() {
        assert_eq!(rainbow_frame(NUM_LEDS, 0), rainbow_frame(NUM_LEDS, 256));
        assert_eq!(rainbow_frame(NUM_LEDS, 17), rainbow_frame(NUM_LEDS, 17 + 256));
    }

    #[test]
    fn test_generator_wraps_step() {
        let mut generator = Rainbow::new(NUM_LEDS);
        let first = generator.next_frame().unwrap();
        for _ in 0..255 {
            generator.next_frame().unwrap();
        }
        assert_eq!(generator.next_frame().unwrap(), first);
        assert_eq!(generator.submit_mode(), SubmitMode::Immediate);
    }
}
