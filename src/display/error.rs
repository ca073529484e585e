/*
 *  display/error.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error type for the LED strip and VFD backends
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

use thiserror::Error;

/// Errors raised by LED and VFD backends.
///
/// All of these are treated as transient by the animation driver and the
/// coordinator: the failed frame or command is logged and skipped.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Device I/O failed (serial/USB write, short write, timeout)
    #[error("Device I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Device refused or failed a command
    #[error("Device command '{command}' failed: {reason}")]
    CommandFailed { command: &'static str, reason: String },

    /// Frame length does not match the strip
    #[error("Buffer size mismatch: expected {expected} pixels, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Bitmap geometry is inconsistent with the supplied bytes
    #[error("Invalid bitmap: {0}")]
    InvalidBitmap(String),

    #[error("{0}")]
    Other(String),
}
