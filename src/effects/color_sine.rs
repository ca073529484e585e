/*
 *  effects/color_sine.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mirrored sine blend between two colors
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

use std::f64::consts::PI;
use std::time::Duration;

use crate::display::color::{Color, PixelBuffer};
use crate::display::traits::BlendTiming;
use crate::effects::{EffectError, FrameGenerator, SubmitMode};

const CADENCE: Duration = Duration::from_millis(50);
const BLEND: BlendTiming = BlendTiming::new(4, 2);
const WIDTH: f64 = 5.0;
const RESOLUTION: f64 = 0.1;

/// Weight of `color1` at position `pos` for the given wave step
pub fn sine_value(pos: usize, step: f64, width: f64) -> f64 {
    (((pos as f64 + step) / width * PI).sin() + 1.0) / 2.0
}

/// Build one frame: a half-strip wave, mirrored onto the other half.
///
/// With `reverse` the mirrored half comes first, so the wave runs outward
/// from the middle of the strip. Odd strip lengths leave the last position
/// dark.
pub fn color_sine_frame(
    num_leds: usize,
    step: f64,
    color1: Color,
    color2: Color,
    width: f64,
    reverse: bool,
) -> PixelBuffer {
    let half: Vec<Color> = (0..num_leds / 2)
        .map(|i| color1.blend(color2, sine_value(i, step, width)))
        .collect();
    let mirrored = half.iter().rev().copied();

    let mut pixels: Vec<Color> = if reverse {
        mirrored.chain(half.iter().copied()).collect()
    } else {
        half.iter().copied().chain(mirrored).collect()
    };
    pixels.resize(num_leds, Color::BLACK);
    PixelBuffer::from(pixels)
}

#[derive(Debug)]
pub struct ColorSine {
    num_leds: usize,
    color1: Color,
    color2: Color,
    step: f64,
}

impl ColorSine {
    pub fn new(num_leds: usize, color1: Color, color2: Color) -> Self {
        Self { num_leds, color1, color2, step: 0.0 }
    }
}

impl FrameGenerator for ColorSine {
    fn next_frame(&mut self) -> Result<PixelBuffer, EffectError> {
        let frame =
            color_sine_frame(self.num_leds, self.step, self.color1, self.color2, WIDTH, true);
        self.step += RESOLUTION;
        if self.step >= WIDTH * 2.0 {
            self.step = 0.0;
        }
        Ok(frame)
    }

    fn submit_mode(&self) -> SubmitMode {
        SubmitMode::Faded(BLEND)
    }

    fn cadence(&self) -> Duration {
        CADENCE
    }
}
