//! Address window encoding
//!
//! The SSD1963 places streamed pixels into a rectangle set with two range
//! commands: column (0x2A) and page (0x2B). After `WRITE_MEMORY_START` the
//! controller walks the rectangle on its own, so one window covers any
//! number of pixel writes up to its area.
//!
//! In [`Orientation::Portrait`] the x range goes to the page register and
//! the y range to the column register.
//!
//! ## Example
//!
//! ```
//! use ssd1963::window::AddressWindow;
//! use ssd1963::Orientation;
//!
//! let window = AddressWindow::new(0, 0, 479, 271).unwrap();
//! assert_eq!(window.pixel_count(), 480 * 272);
//!
//! let words = window.register_writes(Orientation::Landscape);
//! assert_eq!(words[0], 0x2A);
//! assert_eq!(words[10], 0x2C);
//! ```

use crate::color::Rgb;
use crate::command::{SET_COLUMN_ADDRESS, SET_PAGE_ADDRESS, WRITE_MEMORY_START};
use crate::config::Orientation;
use crate::program::{command_word, data_word};

/// CommandWrite words of a window set: two ranges plus memory write start
pub const WINDOW_WORDS: usize = 11;

/// CommandWrite words of a single pixel: window plus one triple
pub const PIXEL_WORDS: usize = WINDOW_WORDS + 3;

/// A window with `x2 < x1` or `y2 < y1`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvertedWindow {
    /// Left column
    pub x1: u16,
    /// Top row
    pub y1: u16,
    /// Right column
    pub x2: u16,
    /// Bottom row
    pub y2: u16,
}

/// Inclusive rectangle of controller memory
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressWindow {
    x1: u16,
    y1: u16,
    x2: u16,
    y2: u16,
}

impl AddressWindow {
    /// Window from corner to corner, both inclusive
    ///
    /// # Errors
    ///
    /// Returns [`InvertedWindow`] if a range runs backwards. Ranges are
    /// never swapped silently.
    #[allow(clippy::many_single_char_names)]
    pub const fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Result<Self, InvertedWindow> {
        if x2 < x1 || y2 < y1 {
            return Err(InvertedWindow { x1, y1, x2, y2 });
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// Single-pixel window
    pub const fn point(x: u16, y: u16) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x,
            y2: y,
        }
    }

    /// Window from origin and size
    ///
    /// Returns `None` for an empty size or a rectangle past `u16` coordinates.
    pub fn from_size(x: u16, y: u16, width: u16, height: u16) -> Option<Self> {
        let x2 = x.checked_add(width.checked_sub(1)?)?;
        let y2 = y.checked_add(height.checked_sub(1)?)?;
        Some(Self {
            x1: x,
            y1: y,
            x2,
            y2,
        })
    }

    /// Left, top, right, bottom
    pub const fn corners(&self) -> (u16, u16, u16, u16) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// Width in pixels
    pub const fn width(&self) -> u32 {
        self.x2 as u32 - self.x1 as u32 + 1
    }

    /// Height in pixels
    pub const fn height(&self) -> u32 {
        self.y2 as u32 - self.y1 as u32 + 1
    }

    /// Pixels written before the controller wraps
    pub const fn pixel_count(&self) -> u32 {
        self.width() * self.height()
    }

    /// Command words that program this window and open memory writes
    pub fn register_writes(&self, orientation: Orientation) -> [u32; WINDOW_WORDS] {
        let (first, second) = match orientation {
            Orientation::Landscape => (SET_COLUMN_ADDRESS, SET_PAGE_ADDRESS),
            Orientation::Portrait => (SET_PAGE_ADDRESS, SET_COLUMN_ADDRESS),
        };
        let [x1_hi, x1_lo] = self.x1.to_be_bytes();
        let [x2_hi, x2_lo] = self.x2.to_be_bytes();
        let [y1_hi, y1_lo] = self.y1.to_be_bytes();
        let [y2_hi, y2_lo] = self.y2.to_be_bytes();
        [
            command_word(first),
            data_word(x1_hi),
            data_word(x1_lo),
            data_word(x2_hi),
            data_word(x2_lo),
            command_word(second),
            data_word(y1_hi),
            data_word(y1_lo),
            data_word(y2_hi),
            data_word(y2_lo),
            command_word(WRITE_MEMORY_START),
        ]
    }

    /// Command words that write one pixel of `color` at this window's origin
    pub fn pixel_writes(&self, orientation: Orientation, color: Rgb) -> [u32; PIXEL_WORDS] {
        let mut words = [0; PIXEL_WORDS];
        words[..WINDOW_WORDS].copy_from_slice(&self.register_writes(orientation));
        for (word, byte) in words[WINDOW_WORDS..].iter_mut().zip(color.bytes()) {
            *word = data_word(byte);
        }
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_ranges_rejected() {
        assert_eq!(
            AddressWindow::new(10, 0, 9, 0),
            Err(InvertedWindow {
                x1: 10,
                y1: 0,
                x2: 9,
                y2: 0
            })
        );
        assert!(AddressWindow::new(0, 5, 0, 4).is_err());
        assert!(AddressWindow::new(3, 3, 3, 3).is_ok());
    }

    #[test]
    fn test_pixel_count_covers_rectangle() {
        let window = AddressWindow::new(10, 20, 19, 24).unwrap();
        assert_eq!(window.width(), 10);
        assert_eq!(window.height(), 5);
        assert_eq!(window.pixel_count(), 50);
        assert_eq!(AddressWindow::point(7, 7).pixel_count(), 1);
    }

    #[test]
    fn test_from_size() {
        let window = AddressWindow::from_size(5, 6, 3, 2).unwrap();
        assert_eq!(window.corners(), (5, 6, 7, 7));
        assert!(AddressWindow::from_size(0, 0, 0, 1).is_none());
        assert!(AddressWindow::from_size(u16::MAX, 0, 2, 1).is_none());
    }

    #[test]
    fn test_landscape_register_writes() {
        let window = AddressWindow::new(0x0102, 0x0003, 0x01DF, 0x010F).unwrap();
        assert_eq!(
            window.register_writes(Orientation::Landscape),
            [0x2A, 0x101, 0x102, 0x101, 0x1DF, 0x2B, 0x100, 0x103, 0x101, 0x10F, 0x2C]
        );
    }

    #[test]
    fn test_portrait_swaps_registers() {
        let window = AddressWindow::new(1, 2, 3, 4).unwrap();
        let words = window.register_writes(Orientation::Portrait);
        assert_eq!(words[0], 0x2B);
        assert_eq!(words[2], 0x101);
        assert_eq!(words[5], 0x2A);
        assert_eq!(words[7], 0x102);
    }

    #[test]
    fn test_pixel_writes_append_color() {
        let words =
            AddressWindow::point(4, 5).pixel_writes(Orientation::Landscape, Rgb::new(1, 2, 3));
        assert_eq!(words.len(), 14);
        assert_eq!(words[2], 0x104);
        assert_eq!(words[4], 0x104);
        assert_eq!(words[11..], [0x101, 0x102, 0x103]);
    }
}
