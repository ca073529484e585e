/*
 *  effects/theater_chase.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Theater chase, every third pixel lit and marching
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

const CADENCE: Duration = Duration::from_millis(50);

pub fn chase_frame(num_leds: usize, offset: usize, color: Color) -> PixelBuffer {
    (0..num_leds)
        .map(|i| if (i + offset) % 3 == 0 { color } else { Color::BLACK })
        .collect()
}

#[derive(Debug)]
pub struct TheaterChase {
    num_leds: usize,
    color: Color,
    offset: usize,
}

impl TheaterChase {
    pub fn new(num_leds: usize, color: Color) -> Self {
        Self { num_leds, color, offset: 0 }
    }
}

impl FrameGenerator for TheaterChase {
    fn next_frame(&mut self) -> Result<PixelBuffer, EffectError> {
        let frame = chase_frame(self.num_leds, self.offset, self.color);
        self.offset = (self.offset + 1) % 3;
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

    const RED: Color = Color::new(255, 0, 0);

    #[test]
    fn test_one_third_lit() {
        for offset in 0..3 {
            let lit = chase_frame(NUM_LEDS, offset, RED).lit_count();
            let third = NUM_LEDS / 3;
            assert!(lit == third || lit == third + 1, "offset {} lit {}", offset, lit);
        }
    }

    #[test]
    fn test_offset_period_three() {
        let mut generator = TheaterChase::new(NUM_LEDS, RED);
        let frames: Vec<_> = (0..4).map(|_| generator.next_frame().unwrap()).collect();
        assert_eq!(frames[0], frames[3]);
        assert_ne!(frames[0], frames[1]);
        assert_ne!(frames[1], frames[2]);
    }

    #[test]
    fn test_pattern_position() {
        let frame = chase_frame(6, 1, RED);
        assert_eq!(frame.get(2), Some(RED));
        assert_eq!(frame.get(5), Some(RED));
        assert_eq!(frame.get(0), Some(Color::BLACK));
    }
}
