//! Color types for the 24-bit bus format
//!
//! The SSD1963 is driven with one R,G,B byte triple per pixel on the 8-bit
//! bus. [`Rgb`] is that triple; [`Transparency`] selects how cleared bits
//! of a monochrome glyph treat the pixels underneath.
//!
//! ## Example
//!
//! ```
//! use ssd1963::Rgb;
//!
//! let orange = Rgb::new(255, 128, 0);
//! assert_eq!(orange.bytes(), [255, 128, 0]);
//! assert_eq!(orange.fill_word(), 0x0000_80FF);
//! ```

/// A 24-bit color in wire order (red, green, blue)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Black
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create a color from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The three bytes in the order they are strobed onto the bus
    pub const fn bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// The color packed into one 32-bit queue word for the triple engine
    ///
    /// The triple engine shifts out right, so red sits in the low byte and
    /// the top byte is never sent.
    ///
    /// ```
    /// use ssd1963::Rgb;
    ///
    /// assert_eq!(Rgb::new(0x11, 0x22, 0x33).fill_word(), 0x0033_2211);
    /// ```
    pub const fn fill_word(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, 0])
    }

    /// The same color with every channel halved
    pub const fn dimmed(self) -> Self {
        Self::new(self.r >> 1, self.g >> 1, self.b >> 1)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::Rgb888> for Rgb {
    fn from(color: embedded_graphics_core::pixelcolor::Rgb888) -> Self {
        use embedded_graphics_core::pixelcolor::RgbColor;
        Self::new(color.r(), color.g(), color.b())
    }
}

/// Treatment of the pixels behind the cleared bits of a glyph
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Transparency {
    /// Cleared bits are painted with the background color
    #[default]
    None,
    /// Cleared bits halve each channel of the pixel already there
    Dim,
    /// Cleared bits leave the pixel already there untouched
    Keep,
    /// Foreground and background swap roles, then behave like [`None`](Self::None)
    Invert,
}

impl Transparency {
    /// Whether expansion needs the destination to hold the previous pixels
    pub const fn needs_background(self) -> bool {
        matches!(self, Self::Dim | Self::Keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_word_places_red_in_low_byte() {
        let word = Rgb::new(1, 2, 3).fill_word();
        assert_eq!(word & 0xFF, 1);
        assert_eq!((word >> 8) & 0xFF, 2);
        assert_eq!((word >> 16) & 0xFF, 3);
        assert_eq!(word >> 24, 0);
    }

    #[test]
    fn test_dimmed_halves_channels() {
        assert_eq!(Rgb::new(200, 101, 1).dimmed(), Rgb::new(100, 50, 0));
    }

    #[test]
    fn test_needs_background() {
        assert!(!Transparency::None.needs_background());
        assert!(Transparency::Dim.needs_background());
        assert!(Transparency::Keep.needs_background());
        assert!(!Transparency::Invert.needs_background());
    }
}
