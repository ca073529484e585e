/*
 *  effects/pulse.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Whole-strip breathing pulse on one color
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

const CADENCE: Duration = Duration::from_millis(20);
const INCREMENT: f64 = 0.1;

pub fn intensity(step: f64) -> f64 {
    (step.sin() + 1.0) / 2.0
}

pub fn pulse_frame(num_leds: usize, step: f64, color: Color) -> PixelBuffer {
    PixelBuffer::filled(num_leds, color.scaled(intensity(step)))
}

#[derive(Debug)]
pub struct Pulse {
    num_leds: usize,
    color: Color,
    step: f64,
}

impl Pulse {
    pub fn new(num_leds: usize, color: Color) -> Self {
        Self { num_leds, color, step: 0.0 }
    }
}

impl FrameGenerator for Pulse {
    fn next_frame(&mut self) -> Result<PixelBuffer, EffectError> {
        let frame = pulse_frame(self.num_leds, self.step, self.color);
        self.step += INCREMENT;
        Ok(frame)
    }

    fn submit_mode(&self) -> SubmitMode {
        SubmitMode::Immediate
    }

    fn cadence(&self) -> Duration {
        CADENCE
    }
}
