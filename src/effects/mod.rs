/*
 *  effects/mod.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  LED effects - one frame generator per effect kind
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

pub mod color_sine;
pub mod pulse;
pub mod rainbow;
pub mod theater_chase;
pub mod vu_meter;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AmplitudeCell;
use crate::display::color::{Color, PixelBuffer};
use crate::display::traits::BlendTiming;

pub use color_sine::ColorSine;
pub use pulse::Pulse;
pub use rainbow::Rainbow;
pub use theater_chase::TheaterChase;
pub use vu_meter::VuMeter;

/// Which effect a game runs on the strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    Solid,
    #[serde(alias = "two color", alias = "two-color", alias = "color-sine")]
    TwoColorSine,
    Rainbow,
    #[serde(alias = "theater chase", alias = "chase")]
    TheaterChase,
    Pulse,
    #[serde(alias = "vu meter", alias = "vu")]
    VuMeter,
}

impl EffectKind {
    pub const ALL: [EffectKind; 6] = [
        EffectKind::Solid,
        EffectKind::TwoColorSine,
        EffectKind::Rainbow,
        EffectKind::TheaterChase,
        EffectKind::Pulse,
        EffectKind::VuMeter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Solid => "solid",
            EffectKind::TwoColorSine => "two-color-sine",
            EffectKind::Rainbow => "rainbow",
            EffectKind::TheaterChase => "theater-chase",
            EffectKind::Pulse => "pulse",
            EffectKind::VuMeter => "vu-meter",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An effect plus the two colors it was configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectSpec {
    pub kind: EffectKind,
    pub color1: Color,
    pub color2: Color,
}

impl EffectSpec {
    pub fn new(kind: EffectKind, color1: Color, color2: Color) -> Self {
        Self { kind, color1, color2 }
    }

    pub fn solid(color: Color) -> Self {
        Self::new(EffectKind::Solid, color, Color::BLACK)
    }
}

impl fmt::Display for EffectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} c1=[{},{},{}] c2=[{},{},{}]",
            self.kind,
            self.color1.r, self.color1.g, self.color1.b,
            self.color2.r, self.color2.g, self.color2.b
        )
    }
}

/// How a generator's frames reach the strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// Set and draw, no interpolation (chase and rainbow style effects)
    Immediate,
    /// Hardware cross-fade with the given timing (smooth effects)
    Faded(BlendTiming),
}

#[derive(Debug, Error)]
pub enum EffectError {
    /// Capture stream died underneath the VU meter; ends the session
    #[error("audio stream lost: {0}")]
    AudioLost(String),
}

/// Produces one frame per animation tick
///
/// Generators never block or do I/O; the driver owns pacing and submission.
pub trait FrameGenerator: Send {
    /// Render the current step and advance to the next one
    fn next_frame(&mut self) -> Result<PixelBuffer, EffectError>;

    fn submit_mode(&self) -> SubmitMode;

    /// Time between frames
    fn cadence(&self) -> Duration;
}

/// Build the generator for an animated effect. `Solid` has none.
///
/// The VU meter reads from `amplitude`; without one it cannot run and `None`
/// is returned so the caller can fall back.
pub fn build_generator(
    spec: &EffectSpec,
    num_leds: usize,
    amplitude: Option<AmplitudeCell>,
) -> Option<Box<dyn FrameGenerator>> {
    match spec.kind {
        EffectKind::Solid => None,
        EffectKind::Rainbow => Some(Box::new(Rainbow::new(num_leds))),
        EffectKind::TheaterChase => Some(Box::new(TheaterChase::new(num_leds, spec.color1))),
        EffectKind::TwoColorSine => {
            Some(Box::new(ColorSine::new(num_leds, spec.color1, spec.color2)))
        }
        EffectKind::Pulse => Some(Box::new(Pulse::new(num_leds, spec.color1))),
        EffectKind::VuMeter => amplitude
            .map(|cell| Box::new(VuMeter::new(num_leds, spec.color1, cell)) as Box<dyn FrameGenerator>),
    }
}

/// The frame faded in while switching to `spec`, before the animation starts
pub fn initial_frame(spec: &EffectSpec, num_leds: usize) -> PixelBuffer {
    match spec.kind {
        EffectKind::Rainbow => rainbow::rainbow_frame(num_leds, 0),
        _ => PixelBuffer::filled(num_leds, spec.color1),
    }
}
