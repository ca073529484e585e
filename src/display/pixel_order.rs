/*
 *  display/pixel_order.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Logical to physical LED position mapping
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

use super::color::PixelBuffer;
use super::error::DisplayError;

/// Device pixel order: slot `k` of the device frame shows logical pixel `order[k]`.
///
/// Effects always render left to right in logical order; the cabinet wiring
/// snakes around the marquee, so every frame passes through this table before
/// it reaches the strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PixelOrder(Vec<usize>);

impl PixelOrder {
    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    /// Build from a raw table, rejecting anything that is not a permutation of `0..len`.
    pub fn new(order: Vec<usize>) -> Result<Self, String> {
        let order = Self(order);
        order.validate()?;
        Ok(order)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<(), String> {
        let mut seen = vec![false; self.0.len()];
        for &slot in &self.0 {
            match seen.get_mut(slot) {
                Some(s) if !*s => *s = true,
                Some(_) => return Err(format!("pixel_order repeats index {}", slot)),
                None => {
                    return Err(format!(
                        "pixel_order index {} out of range for {} pixels",
                        slot,
                        self.0.len()
                    ))
                }
            }
        }
        Ok(())
    }

    /// Permute `buffer` into device order. Colors are copied, never altered.
    pub fn apply(&self, buffer: &PixelBuffer) -> Result<PixelBuffer, DisplayError> {
        if buffer.len() != self.0.len() {
            return Err(DisplayError::BufferSizeMismatch { expected: self.0.len(), actual: buffer.len() });
        }
        let src = buffer.pixels();
        Ok(self.0.iter().map(|&i| src[i]).collect())
    }
}
