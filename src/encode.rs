//! Pixel encoding pipeline
//!
//! The controller takes one R,G,B byte triple per pixel. Every routine in
//! this module turns a source buffer in some [`PixelFormat`] into that wire
//! format. They are pure: no bus access, no allocation.
//!
//! Each routine takes an explicit pixel count and never reads past it, even
//! if the source slice is longer; padded BMP scanlines rely on this. The
//! destination must hold at least `pixels * 3` bytes.
//!
//! ## Example
//!
//! ```
//! use ssd1963::encode::{encode, PixelFormat};
//!
//! // Two RGB565 pixels, little-endian: pure red, pure blue
//! let source = [0x00, 0xF8, 0x1F, 0x00];
//! let mut wire = [0u8; 6];
//! let written = encode(&source, 2, &PixelFormat::Rgb565, &mut wire).unwrap();
//! assert_eq!(written, 6);
//! assert_eq!(wire, [0xF8, 0x00, 0x00, 0x00, 0x00, 0xF8]);
//! ```

use crate::color::{Rgb, Transparency};

/// Bytes per encoded pixel on the wire
pub const WIRE_BYTES_PER_PIXEL: usize = 3;

/// Bytes per palette entry (blue, green, red, reserved)
pub const PALETTE_ENTRY_BYTES: usize = 4;

/// Bit depth of an indexed image
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexDepth {
    /// 2 colors
    One,
    /// 4 colors
    Two,
    /// 16 colors
    Four,
    /// 256 colors
    Eight,
}

impl IndexDepth {
    /// Parse a bits-per-pixel value
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnsupportedPixelFormat`] for anything but 1, 2,
    /// 4 and 8.
    pub const fn from_bits(bits: u8) -> Result<Self, EncodeError> {
        match bits {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            _ => Err(EncodeError::UnsupportedPixelFormat { bits }),
        }
    }

    /// Bits per pixel
    pub const fn bits(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
        }
    }
}

/// Source pixel format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat<'a> {
    /// Three bytes per pixel, already in wire order
    Rgb888,
    /// Two bytes per pixel, little-endian 5/6/5
    Rgb565,
    /// Palette indices, packed most significant pixel first
    Indexed {
        /// Bits per index
        depth: IndexDepth,
        /// Table of 4-byte blue, green, red, reserved entries
        palette: &'a [u8],
    },
    /// One bit per pixel, most significant bit first
    MonoGlyph {
        /// Color of set bits
        foreground: Rgb,
        /// Color of cleared bits
        background: Rgb,
        /// Treatment of cleared bits
        transparency: Transparency,
    },
}

impl<'a> PixelFormat<'a> {
    /// Indexed format with a validated depth and palette
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnsupportedPixelFormat`] for depths other than
    /// 1, 2, 4 and 8, and [`EncodeError::MalformedPalette`] if the palette is
    /// empty or not a whole number of entries.
    pub const fn indexed(bits: u8, palette: &'a [u8]) -> Result<Self, EncodeError> {
        let depth = match IndexDepth::from_bits(bits) {
            Ok(depth) => depth,
            Err(err) => return Err(err),
        };
        if palette.is_empty() || palette.len() % PALETTE_ENTRY_BYTES != 0 {
            return Err(EncodeError::MalformedPalette {
                len: palette.len(),
            });
        }
        Ok(Self::Indexed { depth, palette })
    }

    /// Monochrome glyph format
    pub const fn glyph(foreground: Rgb, background: Rgb, transparency: Transparency) -> Self {
        Self::MonoGlyph {
            foreground,
            background,
            transparency,
        }
    }

    /// Bits each source pixel occupies
    pub const fn bits_per_pixel(&self) -> u8 {
        match self {
            Self::Rgb888 => 24,
            Self::Rgb565 => 16,
            Self::Indexed { depth, .. } => depth.bits(),
            Self::MonoGlyph { .. } => 1,
        }
    }

    /// Source bytes needed for `pixels` pixels
    pub const fn source_len(&self, pixels: usize) -> usize {
        (pixels * self.bits_per_pixel() as usize).div_ceil(8)
    }
}

/// Errors raised by the encoding pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Bits-per-pixel value with no encoder
    UnsupportedPixelFormat {
        /// The rejected depth
        bits: u8,
    },
    /// Source holds fewer bytes than the pixel count needs
    SourceTooShort {
        /// Bytes needed
        required: usize,
        /// Bytes provided
        provided: usize,
    },
    /// Destination holds fewer bytes than the pixel count needs
    DestinationTooShort {
        /// Bytes needed
        required: usize,
        /// Bytes provided
        provided: usize,
    },
    /// Palette is empty or not made of whole entries
    MalformedPalette {
        /// Palette length in bytes
        len: usize,
    },
    /// A pixel refers past the end of the palette
    PaletteIndex {
        /// The offending index
        index: u8,
    },
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedPixelFormat { bits } => {
                write!(f, "No encoder for {bits} bits per pixel")
            }
            Self::SourceTooShort { required, provided } => write!(
                f,
                "Source too short: required {required} bytes, provided {provided}"
            ),
            Self::DestinationTooShort { required, provided } => write!(
                f,
                "Destination too short: required {required} bytes, provided {provided}"
            ),
            Self::MalformedPalette { len } => write!(f, "Malformed palette of {len} bytes"),
            Self::PaletteIndex { index } => write!(f, "Palette index {index} out of range"),
        }
    }
}

impl core::error::Error for EncodeError {}

fn check(
    source: &[u8],
    source_required: usize,
    destination: &[u8],
    pixels: usize,
) -> Result<usize, EncodeError> {
    if source.len() < source_required {
        return Err(EncodeError::SourceTooShort {
            required: source_required,
            provided: source.len(),
        });
    }
    let required = pixels * WIRE_BYTES_PER_PIXEL;
    if destination.len() < required {
        return Err(EncodeError::DestinationTooShort {
            required,
            provided: destination.len(),
        });
    }
    Ok(required)
}

/// Expand little-endian RGB565 pixels to wire triples
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns [`EncodeError::SourceTooShort`] or
/// [`EncodeError::DestinationTooShort`] if a buffer cannot hold `pixels`.
pub fn expand_rgb565(
    source: &[u8],
    pixels: usize,
    destination: &mut [u8],
) -> Result<usize, EncodeError> {
    let written = check(source, pixels * 2, destination, pixels)?;
    for (pixel, out) in source
        .chunks_exact(2)
        .zip(destination.chunks_exact_mut(WIRE_BYTES_PER_PIXEL))
        .take(pixels)
    {
        let (lo, hi) = (pixel[0], pixel[1]);
        out[0] = hi & 0xF8;
        out[1] = ((hi & 0x07) << 5) | ((lo >> 3) & 0x1C);
        out[2] = lo << 3;
    }
    Ok(written)
}

/// Pack a color into little-endian RGB565
///
/// Inverse of [`expand_rgb565`] up to the 5/6/5 precision loss.
///
/// ```
/// use ssd1963::encode::{expand_rgb565, pack_rgb565};
/// use ssd1963::Rgb;
///
/// let packed = pack_rgb565(Rgb::new(0x87, 0x43, 0xFF));
/// let mut wire = [0u8; 3];
/// expand_rgb565(&packed, 1, &mut wire).unwrap();
/// assert_eq!(wire, [0x80, 0x40, 0xF8]);
/// ```
pub const fn pack_rgb565(color: Rgb) -> [u8; 2] {
    let hi = (color.r & 0xF8) | (color.g >> 5);
    let lo = ((color.g << 3) & 0xE0) | (color.b >> 3);
    [lo, hi]
}

/// Expand palette indices to wire triples
///
/// Indices are taken most significant first within each byte. Palette
/// entries are stored blue, green, red and come out red, green, blue.
///
/// # Errors
///
/// Returns a size error if a buffer cannot hold `pixels`, and
/// [`EncodeError::PaletteIndex`] if an index points past the palette.
pub fn expand_indexed(
    source: &[u8],
    pixels: usize,
    depth: IndexDepth,
    palette: &[u8],
    destination: &mut [u8],
) -> Result<usize, EncodeError> {
    let bits = depth.bits();
    let written = check(
        source,
        (pixels * usize::from(bits)).div_ceil(8),
        destination,
        pixels,
    )?;
    let mask = ((1u16 << bits) - 1) as u8;
    let per_byte = usize::from(8 / bits);

    for (pixel, out) in destination
        .chunks_exact_mut(WIRE_BYTES_PER_PIXEL)
        .take(pixels)
        .enumerate()
    {
        let byte = source[pixel / per_byte];
        let shift = 8 - bits * (pixel % per_byte + 1) as u8;
        let index = (byte >> shift) & mask;
        let offset = usize::from(index) * PALETTE_ENTRY_BYTES;
        let entry = palette
            .get(offset..offset + 3)
            .ok_or(EncodeError::PaletteIndex { index })?;
        out[0] = entry[2];
        out[1] = entry[1];
        out[2] = entry[0];
    }
    Ok(written)
}

/// Expand a 1-bit bitmap to wire triples
///
/// Bits are consumed most significant first with no row padding. Set bits
/// become `foreground`. Cleared bits depend on `transparency`:
///
/// - [`Transparency::None`]: `background`
/// - [`Transparency::Dim`]: the triple already in `destination`, halved
/// - [`Transparency::Keep`]: the triple already in `destination`, untouched
/// - [`Transparency::Invert`]: colors swap roles, then as `None`
///
/// For `Dim` and `Keep` the destination must already hold the pixels behind
/// the glyph.
///
/// # Errors
///
/// Returns a size error if a buffer cannot hold `pixels`.
pub fn expand_glyph(
    source: &[u8],
    pixels: usize,
    foreground: Rgb,
    background: Rgb,
    transparency: Transparency,
    destination: &mut [u8],
) -> Result<usize, EncodeError> {
    let written = check(source, pixels.div_ceil(8), destination, pixels)?;
    let (foreground, background) = match transparency {
        Transparency::Invert => (background, foreground),
        _ => (foreground, background),
    };

    for (pixel, out) in destination
        .chunks_exact_mut(WIRE_BYTES_PER_PIXEL)
        .take(pixels)
        .enumerate()
    {
        let set = source[pixel / 8] & (0x80 >> (pixel % 8)) != 0;
        if set {
            out.copy_from_slice(&foreground.bytes());
            continue;
        }
        match transparency {
            Transparency::Dim => out.iter_mut().for_each(|channel| *channel >>= 1),
            Transparency::Keep => {}
            Transparency::None | Transparency::Invert => {
                out.copy_from_slice(&background.bytes());
            }
        }
    }
    Ok(written)
}

/// Encode `pixels` pixels of `source` in `format` into wire triples
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Propagates the error of the format's encoder.
pub fn encode(
    source: &[u8],
    pixels: usize,
    format: &PixelFormat<'_>,
    destination: &mut [u8],
) -> Result<usize, EncodeError> {
    match *format {
        PixelFormat::Rgb888 => {
            let written = check(source, pixels * WIRE_BYTES_PER_PIXEL, destination, pixels)?;
            destination[..written].copy_from_slice(&source[..written]);
            Ok(written)
        }
        PixelFormat::Rgb565 => expand_rgb565(source, pixels, destination),
        PixelFormat::Indexed { depth, palette } => {
            expand_indexed(source, pixels, depth, palette, destination)
        }
        PixelFormat::MonoGlyph {
            foreground,
            background,
            transparency,
        } => expand_glyph(
            source,
            pixels,
            foreground,
            background,
            transparency,
            destination,
        ),
    }
}

/// Swap the bytes of every 16-bit pair in place
///
/// A trailing odd byte is left alone.
pub fn swap_bytes(buffer: &mut [u8]) {
    for pair in buffer.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

/// Swap red and blue of every triple in place
///
/// Trailing bytes that do not form a triple are left alone.
pub fn swap_colors(buffer: &mut [u8]) {
    for triple in buffer.chunks_exact_mut(WIRE_BYTES_PER_PIXEL) {
        triple.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_round_trip_within_precision() {
        for &(r, g, b) in &[(0u8, 0u8, 0u8), (255, 255, 255), (0x87, 0x43, 0x0F), (12, 200, 99)] {
            let packed = pack_rgb565(Rgb::new(r, g, b));
            let mut wire = [0u8; 3];
            expand_rgb565(&packed, 1, &mut wire).unwrap();
            assert_eq!(wire, [r & 0xF8, g & 0xFC, b & 0xF8]);
        }
    }

    #[test]
    fn test_rgb565_ignores_trailing_source() {
        let source = [0xFF, 0xFF, 0xAA, 0xAA];
        let mut wire = [0x11u8; 6];
        let written = expand_rgb565(&source, 1, &mut wire).unwrap();
        assert_eq!(written, 3);
        assert_eq!(wire[3..], [0x11, 0x11, 0x11]);
    }

    #[test]
    fn test_indexed_8bpp_swaps_palette_order() {
        let palette = [10, 20, 30, 0];
        let mut wire = [0u8; 3];
        expand_indexed(&[0x00], 1, IndexDepth::Eight, &palette, &mut wire).unwrap();
        assert_eq!(wire, [30, 20, 10]);
    }

    #[test]
    fn test_indexed_4bpp_high_nibble_first() {
        let palette = [1, 1, 1, 0, 2, 2, 2, 0];
        let mut wire = [0u8; 9];
        // Third pixel sits in the padding byte and must not be decoded
        expand_indexed(&[0x10, 0xFF], 2, IndexDepth::Four, &palette, &mut wire).unwrap();
        assert_eq!(wire[..6], [2, 2, 2, 1, 1, 1]);
        assert_eq!(wire[6..], [0, 0, 0]);
    }

    #[test]
    fn test_indexed_1bpp() {
        let palette = [0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0];
        let mut wire = [0u8; 24];
        expand_indexed(&[0b1000_0001], 8, IndexDepth::One, &palette, &mut wire).unwrap();
        assert_eq!(wire[..3], [0xFF; 3]);
        assert_eq!(wire[3..21], [0; 18]);
        assert_eq!(wire[21..], [0xFF; 3]);
    }

    #[test]
    fn test_indexed_rejects_out_of_palette() {
        let palette = [0, 0, 0, 0];
        let mut wire = [0u8; 3];
        let err = expand_indexed(&[0x05], 1, IndexDepth::Eight, &palette, &mut wire).unwrap_err();
        assert_eq!(err, EncodeError::PaletteIndex { index: 5 });
    }

    #[test]
    fn test_indexed_depth_validation() {
        let palette = [0u8; 8];
        assert_eq!(
            PixelFormat::indexed(3, &palette),
            Err(EncodeError::UnsupportedPixelFormat { bits: 3 })
        );
        assert_eq!(
            PixelFormat::indexed(8, &palette[..5]),
            Err(EncodeError::MalformedPalette { len: 5 })
        );
        assert!(PixelFormat::indexed(2, &palette).is_ok());
    }

    #[test]
    fn test_glyph_none_paints_both_colors() {
        let fg = Rgb::new(1, 2, 3);
        let bg = Rgb::new(7, 8, 9);
        let mut wire = [0u8; 6];
        expand_glyph(&[0b1000_0000], 2, fg, bg, Transparency::None, &mut wire).unwrap();
        assert_eq!(wire, [1, 2, 3, 7, 8, 9]);
    }

    #[test]
    fn test_glyph_keep_leaves_cleared_pixels() {
        let fg = Rgb::WHITE;
        let mut wire = [10, 20, 30, 40, 50, 60, 70, 80, 90];
        let before = wire;
        expand_glyph(&[0b0100_0000], 3, fg, Rgb::BLACK, Transparency::Keep, &mut wire).unwrap();
        assert_eq!(wire[..3], before[..3]);
        assert_eq!(wire[3..6], [255, 255, 255]);
        assert_eq!(wire[6..], before[6..]);
    }

    #[test]
    fn test_glyph_dim_halves_cleared_pixels() {
        let mut wire = [100, 50, 8, 0, 0, 0];
        expand_glyph(&[0b0100_0000], 2, Rgb::WHITE, Rgb::BLACK, Transparency::Dim, &mut wire)
            .unwrap();
        assert_eq!(wire, [50, 25, 4, 255, 255, 255]);
    }

    #[test]
    fn test_glyph_invert_swaps_roles() {
        let fg = Rgb::new(1, 1, 1);
        let bg = Rgb::new(2, 2, 2);
        let mut wire = [0u8; 6];
        expand_glyph(&[0b1000_0000], 2, fg, bg, Transparency::Invert, &mut wire).unwrap();
        assert_eq!(wire, [2, 2, 2, 1, 1, 1]);
    }

    #[test]
    fn test_glyph_bits_run_across_bytes() {
        let mut wire = [0u8; 30];
        expand_glyph(&[0x00, 0b0100_0000], 10, Rgb::WHITE, Rgb::BLACK, Transparency::None, &mut wire)
            .unwrap();
        assert_eq!(wire[27..], [255, 255, 255]);
        assert_eq!(wire[..27], [0; 27]);
    }

    #[test]
    fn test_short_buffers_rejected() {
        let mut wire = [0u8; 5];
        assert_eq!(
            encode(&[0; 4], 2, &PixelFormat::Rgb565, &mut wire),
            Err(EncodeError::DestinationTooShort {
                required: 6,
                provided: 5
            })
        );
        let mut wire = [0u8; 6];
        assert_eq!(
            encode(&[0; 3], 2, &PixelFormat::Rgb565, &mut wire),
            Err(EncodeError::SourceTooShort {
                required: 4,
                provided: 3
            })
        );
    }

    #[test]
    fn test_rgb888_is_copied() {
        let mut wire = [0u8; 3];
        encode(&[9, 8, 7, 6], 1, &PixelFormat::Rgb888, &mut wire).unwrap();
        assert_eq!(wire, [9, 8, 7]);
    }

    #[test]
    fn test_source_len() {
        assert_eq!(PixelFormat::Rgb565.source_len(3), 6);
        let glyph = PixelFormat::glyph(Rgb::WHITE, Rgb::BLACK, Transparency::None);
        assert_eq!(glyph.source_len(9), 2);
    }

    #[test]
    fn test_swaps() {
        let mut pairs = [1, 2, 3, 4, 5];
        swap_bytes(&mut pairs);
        assert_eq!(pairs, [2, 1, 4, 3, 5]);
        let mut triples = [1, 2, 3, 4, 5, 6, 7];
        swap_colors(&mut triples);
        assert_eq!(triples, [3, 2, 1, 6, 5, 4, 7]);
    }
}
