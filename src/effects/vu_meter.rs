/*
 *  effects/vu_meter.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Symmetric VU meter, grows from the middle of the strip
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

use crate::audio::AmplitudeCell;
use crate::display::color::{Color, PixelBuffer};
use crate::display::traits::BlendTiming;
use crate::effects::{EffectError, FrameGenerator, SubmitMode};

const CADENCE: Duration = Duration::from_millis(30);
const BLEND: BlendTiming = BlendTiming::new(2, 1);

/// Weight given to the newest amplitude reading
const SMOOTHING: f64 = 0.2;

pub fn smooth(previous: f64, latest: f64) -> f64 {
    latest * SMOOTHING + previous * (1.0 - SMOOTHING)
}

/// Pixels lit on each side of the center for a smoothed level (0..=100)
pub fn active_count(num_leds: usize, smoothed: f64) -> usize {
    let fraction = (smoothed / 100.0).clamp(0.0, 1.0);
    ((num_leds / 2) as f64 * fraction) as usize
}

/// Per-position brightness for `active` pixels each side of center.
///
/// Ring k (k = 0 at the center pair) gets (k + 1) / active, so the outermost
/// lit pair is always at full brightness and the center pair is dimmest.
pub fn brightness_profile(num_leds: usize, active: usize) -> Vec<f64> {
    let mut profile = vec![0.0; num_leds];
    if active == 0 || num_leds == 0 {
        return profile;
    }
    let left_center = (num_leds / 2).saturating_sub(1);
    let right_center = num_leds - 1 - left_center;

    for k in 0..active {
        let brightness = (k + 1) as f64 / active as f64;
        if let Some(left) = left_center.checked_sub(k) {
            profile[left] = brightness;
        }
        if let Some(slot) = profile.get_mut(right_center + k) {
            *slot = brightness;
        }
    }
    profile
}

pub fn vu_frame(num_leds: usize, smoothed: f64, color: Color) -> PixelBuffer {
    brightness_profile(num_leds, active_count(num_leds, smoothed))
        .into_iter()
        .map(|b| color.scaled(b))
        .collect()
}

/// Audio reactive generator, reads the latest level from an [`AmplitudeCell`]
#[derive(Debug)]
pub struct VuMeter {
    num_leds: usize,
    color: Color,
    amplitude: AmplitudeCell,
    smoothed: f64,
}

impl VuMeter {
    pub fn new(num_leds: usize, color: Color, amplitude: AmplitudeCell) -> Self {
        Self { num_leds, color, amplitude, smoothed: 0.0 }
    }
}

impl FrameGenerator for VuMeter {
    fn next_frame(&mut self) -> Result<PixelBuffer, EffectError> {
        if let Some(reason) = self.amplitude.failure() {
            return Err(EffectError::AudioLost(reason));
        }
        self.smoothed = smooth(self.smoothed, self.amplitude.get() as f64);
        Ok(vu_frame(self.num_leds, self.smoothed, self.color))
    }

    fn submit_mode(&self) -> SubmitMode {
        SubmitMode::Faded(BLEND)
    }

    fn cadence(&self) -> Duration {
        CADENCE
    }
}
