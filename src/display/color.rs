/*
 *  display/color.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  RGB color and frame buffer types shared by effects and LED drivers
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

use rand::Rng;
use serde::{Deserialize, Serialize};

/// 24-bit RGB value as the LED strip consumes it
///
/// Serialized as a plain `[r, g, b]` list so game entries read naturally in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    /// Coin blink color
    pub const YELLOW: Color = Color::new(255, 255, 0);
    /// Attract mode color when no game is running
    pub const IDLE_YELLOW: Color = Color::new(215, 230, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `factor` (0.0..=1.0), truncating toward zero.
    pub fn scaled(&self, factor: f64) -> Color {
        let f = factor.clamp(0.0, 1.0);
        Color::new(
            (self.r as f64 * f) as u8,
            (self.g as f64 * f) as u8,
            (self.b as f64 * f) as u8,
        )
    }

    /// Weighted blend `self * weight + other * (1 - weight)`, truncated per channel.
    pub fn blend(&self, other: Color, weight: f64) -> Color {
        let mix = |a: u8, b: u8| (a as f64 * weight + b as f64 * (1.0 - weight)) as u8;
        Color::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Uniformly random color, each channel independent.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Color {
        Color::new(rng.random(), rng.random(), rng.random())
    }

    pub fn is_black(&self) -> bool {
        *self == Color::BLACK
    }
}

impl From<[u8; 3]> for Color {
    fn from(c: [u8; 3]) -> Self {
        Color::new(c[0], c[1], c[2])
    }
}

impl From<Color> for [u8; 3] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b]
    }
}

/// One frame of logical pixels, position 0 first
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    pixels: Vec<Color>,
}

impl PixelBuffer {
    pub fn filled(len: usize, color: Color) -> Self {
        Self { pixels: vec![color; len] }
    }

    pub fn black(len: usize) -> Self {
        Self::filled(len, Color::BLACK)
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.pixels.get(index).copied()
    }

    /// Number of positions that are not black
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|c| !c.is_black()).count()
    }

    /// Flatten to the `r, g, b, r, g, b, ...` byte layout the strip expects.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| [c.r, c.g, c.b]).collect()
    }
}

impl From<Vec<Color>> for PixelBuffer {
    fn from(pixels: Vec<Color>) -> Self {
        Self { pixels }
    }
}

impl FromIterator<Color> for PixelBuffer {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        Self { pixels: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_truncates() {
        let c = Color::new(255, 100, 3);
        assert_eq!(c.scaled(0.5), Color::new(127, 50, 1));
        assert_eq!(c.scaled(0.0), Color::BLACK);
        assert_eq!(c.scaled(1.0), c);
    }

    #[test]
    fn test_blend_endpoints() {
        let a = Color::new(200, 0, 50);
        let b = Color::new(0, 100, 250);
        assert_eq!(a.blend(b, 1.0), a);
        assert_eq!(a.blend(b, 0.0), b);
        assert_eq!(a.blend(b, 0.5), Color::new(100, 50, 150));
    }

    #[test]
    fn test_to_bytes_layout() {
        let buf = PixelBuffer::from(vec![Color::new(1, 2, 3), Color::new(4, 5, 6)]);
        assert_eq!(buf.to_bytes(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_yaml_list_form() {
        let c: Color = serde_yaml::from_str("[10, 20, 30]").unwrap();
        assert_eq!(c, Color::new(10, 20, 30));
    }
}
