/*
 *  display/bitmap.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  ASCII art to VFD bitmap conversion
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

use crate::display::error::DisplayError;

/// Monochrome bitmap, row-major, 8 horizontal pixels per byte, MSB leftmost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u16,
    /// Always a multiple of 8 so the VFD can address it in byte-high pages
    pub height: u16,
    pub data: Vec<u8>,
}

impl Bitmap {
    pub fn row_bytes(width: u16) -> usize {
        (width as usize).div_ceil(8)
    }

    pub fn pixel(&self, x: u16, y: u16) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * Self::row_bytes(self.width) + x as usize / 8;
        self.data[idx] & (0x80 >> (x % 8)) != 0
    }
}

/// Any character other than a space is a lit pixel. Line endings are ignored,
/// the widest line sets the width and the height is padded to whole pages.
/// Art wider or taller than the VFD can address is rejected.
pub fn convert_ascii_art(lines: &[String]) -> Result<Bitmap, DisplayError> {
    let rows: Vec<&str> = lines
        .iter()
        .map(|l| l.trim_end_matches(['\r', '\n']))
        .collect();

    let widest = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    let width = u16::try_from(widest)
        .map_err(|_| DisplayError::InvalidBitmap(format!("art is {} columns wide", widest)))?;
    let height = u16::try_from(rows.len().div_ceil(8) * 8)
        .map_err(|_| DisplayError::InvalidBitmap(format!("art is {} lines tall", rows.len())))?;
    let row_bytes = Bitmap::row_bytes(width);
    let mut data = vec![0u8; row_bytes * height as usize];

    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            if ch != ' ' {
                data[y * row_bytes + x / 8] |= 0x80 >> (x % 8);
            }
        }
    }

    Ok(Bitmap { width, height, data })
}

/// Re-pack a row-major bitmap into the VFD's column layout: for each column,
/// one byte per 8-pixel page from top to bottom, MSB at the top.
pub fn rotate_bitmap(bitmap: &Bitmap) -> Vec<u8> {
    let pages = bitmap.height / 8;
    let mut out = Vec::with_capacity(bitmap.width as usize * pages as usize);
    for x in 0..bitmap.width {
        for page in 0..pages {
            let mut byte = 0u8;
            for bit in 0..8 {
                if bitmap.pixel(x, page * 8 + bit) {
                    byte |= 0x80 >> bit;
                }
            }
            out.push(byte);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(rows: &[&str]) -> Vec<String> {
        rows.iter().map(|r| format!("{}\n", r)).collect()
    }

    #[test]
    fn test_convert_pads_height_to_page() {
        let bmp = convert_ascii_art(&art(&["#  #", " ## "])).unwrap();
        assert_eq!(bmp.width, 4);
        assert_eq!(bmp.height, 8);
        assert!(bmp.pixel(0, 0));
        assert!(!bmp.pixel(1, 0));
        assert!(bmp.pixel(3, 0));
        assert!(bmp.pixel(1, 1));
        assert!(!bmp.pixel(0, 5));
    }

    #[test]
    fn test_ragged_lines_use_widest() {
        let bmp = convert_ascii_art(&art(&["#", "##########"])).unwrap();
        assert_eq!(bmp.width, 10);
        assert_eq!(bmp.data.len(), 2 * 8);
        assert!(bmp.pixel(9, 1));
        assert!(!bmp.pixel(9, 0));
    }

    #[test]
    fn test_rotate_column_major() {
        // column 0 fully lit for 8 rows, column 1 only at the top
        let rows = ["##", "# ", "# ", "# ", "# ", "# ", "# ", "# "];
        let bmp = convert_ascii_art(&art(&rows)).unwrap();
        let rotated = rotate_bitmap(&bmp);
        assert_eq!(rotated, vec![0xFF, 0x80]);
    }

    #[test]
    fn test_empty_art() {
        let bmp = convert_ascii_art(&[]).unwrap();
        assert_eq!((bmp.width, bmp.height), (0, 0));
        assert!(rotate_bitmap(&bmp).is_empty());
    }

    #[test]
    fn test_oversized_art_is_rejected() {
        let wide = vec!["#".repeat(65_552)];
        assert!(matches!(convert_ascii_art(&wide), Err(DisplayError::InvalidBitmap(_))));

        let tall = vec!["#".to_string(); 65_530];
        assert!(matches!(convert_ascii_art(&tall), Err(DisplayError::InvalidBitmap(_))));

        let widest_ok = vec!["#".repeat(u16::MAX as usize)];
        assert_eq!(convert_ascii_art(&widest_ok).unwrap().width, u16::MAX);
    }
}
