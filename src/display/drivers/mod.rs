/*
 *  display/drivers/mod.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  LED strip and VFD backends
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

// Recording backend for tests, public so integration tests can inspect it
pub mod mock;

// Log-only backend for running away from the cabinet
pub mod emulator;

pub use emulator::{EmulatorLedStrip, EmulatorVfd};
pub use mock::{MockLedStrip, MockVfd};
