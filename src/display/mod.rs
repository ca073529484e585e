/*
 *  display/mod.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - LED strip and VFD behind narrow traits
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

use std::sync::Arc;

use tokio::sync::Mutex;

// Core trait definitions
pub mod traits;
pub mod error;
pub mod color;
pub mod pixel_order;
pub mod bitmap;

// Backends
pub mod drivers;

// Re-exports for convenience
pub use traits::{BlendTiming, LedStrip, Vfd};
pub use error::DisplayError;
pub use color::{Color, PixelBuffer};
pub use pixel_order::PixelOrder;
pub use bitmap::Bitmap;

/// LED strip handle shared by the animation driver and the coin blink.
/// Every frame submission happens under this lock.
pub type SharedLedStrip = Arc<Mutex<Box<dyn LedStrip>>>;

/// VFD handle, only the coordinator writes to it
pub type SharedVfd = Arc<Mutex<Box<dyn Vfd>>>;

pub fn shared_leds<L: LedStrip + 'static>(leds: L) -> SharedLedStrip {
    Arc::new(Mutex::new(Box::new(leds)))
}

pub fn shared_vfd<V: Vfd + 'static>(vfd: V) -> SharedVfd {
    Arc::new(Mutex::new(Box::new(vfd)))
}
