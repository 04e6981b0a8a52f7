//! Font tables and asset conversion helpers
//!
//! [`PackedFont`] reads the fixed-cell font layout the text path draws
//! from: a 4-byte header followed by one glyph after another, each glyph
//! `height` rows of `(width + 7) / 8` bytes, most significant bit leftmost.
//!
//! Font editors usually emit glyphs column by column, least significant bit
//! on top. [`reverse_bits`], [`pack_columns`] and [`transpose`] turn such
//! tables into the row-major 1-bit layout that
//! [`expand_glyph`](crate::encode::expand_glyph) consumes; they run at asset
//! conversion time, not when drawing.
//!
//! ## Example
//!
//! ```
//! use ssd1963::font::PackedFont;
//!
//! // 5x2 cells, two characters starting at ' '
//! let data = [5, 2, b' ', 2, 0x00, 0x00, 0xF8, 0x88];
//! let font = PackedFont::new(&data).unwrap();
//! assert_eq!(font.glyph('!'), &[0xF8, 0x88]);
//! // Characters outside the table fall back to the first glyph
//! assert_eq!(font.glyph('~'), &[0x00, 0x00]);
//! ```

/// Bytes in the [`PackedFont`] header
pub const HEADER_LEN: usize = 4;

/// Errors raised by font helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontError {
    /// Width, height or character count of zero
    EmptyFont,
    /// Font data shorter than its header promises
    Truncated {
        /// Bytes needed
        required: usize,
        /// Bytes provided
        provided: usize,
    },
    /// Conversion buffer too small
    BufferTooSmall {
        /// Bytes needed
        required: usize,
        /// Bytes provided
        provided: usize,
    },
}

impl core::fmt::Display for FontError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyFont => write!(f, "Font has no cells"),
            Self::Truncated { required, provided } => write!(
                f,
                "Font truncated: header needs {required} bytes, data has {provided}"
            ),
            Self::BufferTooSmall { required, provided } => write!(
                f,
                "Buffer too small: required {required} bytes, provided {provided}"
            ),
        }
    }
}

impl core::error::Error for FontError {}

/// Reverse the bit order of a byte
///
/// ```
/// assert_eq!(ssd1963::font::reverse_bits(0x23), 0xC4);
/// ```
pub const fn reverse_bits(byte: u8) -> u8 {
    byte.reverse_bits()
}

/// Bytes holding `bits` bits
const fn packed_len(bits: usize) -> usize {
    bits.div_ceil(8)
}

const fn bit(buffer: &[u8], index: usize) -> bool {
    buffer[index / 8] & (0x80 >> (index % 8)) != 0
}

fn set_bit(buffer: &mut [u8], index: usize) {
    buffer[index / 8] |= 0x80 >> (index % 8);
}

fn check_len(required: usize, provided: usize) -> Result<(), FontError> {
    if provided < required {
        Err(FontError::BufferTooSmall { required, provided })
    } else {
        Ok(())
    }
}

/// Pack columns of `vert` bits into one continuous bit stream
///
/// Every column in `source` starts on a fresh byte and takes
/// `(vert + 7) / 8` bytes; its unused low bits are skipped. The output runs
/// MSB first without gaps and is zero-padded to a whole byte. Returns the
/// number of bytes written.
///
/// # Errors
///
/// Returns [`FontError::BufferTooSmall`] if either buffer is too short.
pub fn pack_columns(
    source: &[u8],
    vert: usize,
    hor: usize,
    destination: &mut [u8],
) -> Result<usize, FontError> {
    let column_bytes = packed_len(vert);
    let written = packed_len(vert * hor);
    check_len(column_bytes * hor, source.len())?;
    check_len(written, destination.len())?;

    destination[..written].fill(0);
    for column in 0..hor {
        for row in 0..vert {
            if bit(source, column * column_bytes * 8 + row) {
                set_bit(destination, column * vert + row);
            }
        }
    }
    Ok(written)
}

/// Transpose a packed `vert` x `hor` bitmap between column- and row-major
///
/// Bit `i * hor + j` of the output is bit `vert * j + i` of the input, for
/// row `i < vert` and column `j < hor`. Padding bits come out zero. Returns
/// the number of bytes written.
///
/// ```
/// use ssd1963::font::transpose;
///
/// // Columns [1,0] [0,1] [1,1] become rows [1,0,1] [0,1,1]
/// let mut rows = [0u8; 1];
/// transpose(&[0b1001_1100], 2, 3, &mut rows).unwrap();
/// assert_eq!(rows, [0b1010_1100]);
/// ```
///
/// # Errors
///
/// Returns [`FontError::BufferTooSmall`] if either buffer is too short.
pub fn transpose(
    source: &[u8],
    vert: usize,
    hor: usize,
    destination: &mut [u8],
) -> Result<usize, FontError> {
    let written = packed_len(vert * hor);
    check_len(written, source.len())?;
    check_len(written, destination.len())?;

    destination[..written].fill(0);
    for i in 0..vert {
        for j in 0..hor {
            if bit(source, vert * j + i) {
                set_bit(destination, i * hor + j);
            }
        }
    }
    Ok(written)
}

/// Convert an editor glyph (columns, LSB on top) to row-major bits
///
/// Same result as reversing every source byte, then [`pack_columns`], then
/// [`transpose`], without the intermediate buffers.
///
/// # Errors
///
/// Returns [`FontError::BufferTooSmall`] if either buffer is too short.
pub fn glyph_from_columns(
    source: &[u8],
    vert: usize,
    hor: usize,
    destination: &mut [u8],
) -> Result<usize, FontError> {
    let column_bytes = packed_len(vert);
    let written = packed_len(vert * hor);
    check_len(column_bytes * hor, source.len())?;
    check_len(written, destination.len())?;

    destination[..written].fill(0);
    for j in 0..hor {
        for i in 0..vert {
            let byte = source[j * column_bytes + i / 8];
            if byte & (1 << (i % 8)) != 0 {
                set_bit(destination, i * hor + j);
            }
        }
    }
    Ok(written)
}

/// Fixed-cell bitmap font
#[derive(Clone, Copy, Debug)]
pub struct PackedFont<'a> {
    data: &'a [u8],
    width: u8,
    height: u8,
    first: u8,
    count: u8,
}

impl<'a> PackedFont<'a> {
    /// Validate `data` and wrap it
    ///
    /// Header: cell width, cell height, code of the first character, number
    /// of characters.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::EmptyFont`] for a zero dimension or count and
    /// [`FontError::Truncated`] if the glyph table is shorter than the
    /// header promises.
    pub fn new(data: &'a [u8]) -> Result<Self, FontError> {
        let header = data.get(..HEADER_LEN).ok_or(FontError::Truncated {
            required: HEADER_LEN,
            provided: data.len(),
        })?;
        let (width, height, first, count) = (header[0], header[1], header[2], header[3]);
        if width == 0 || height == 0 || count == 0 {
            return Err(FontError::EmptyFont);
        }
        let font = Self {
            data,
            width,
            height,
            first,
            count,
        };
        let required = HEADER_LEN + usize::from(count) * font.glyph_len();
        if data.len() < required {
            return Err(FontError::Truncated {
                required,
                provided: data.len(),
            });
        }
        Ok(font)
    }

    /// Cell width in pixels
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Cell height in pixels
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Bytes per glyph row
    pub const fn bytes_per_row(&self) -> usize {
        packed_len(self.width as usize)
    }

    /// Bytes per glyph
    pub const fn glyph_len(&self) -> usize {
        self.bytes_per_row() * self.height as usize
    }

    /// Table index of `c`; characters outside the table map to 0
    pub fn index(&self, c: char) -> usize {
        let code = (u32::from(c) & 0x7F) as u8;
        match code.checked_sub(self.first) {
            Some(index) if index < self.count => usize::from(index),
            _ => 0,
        }
    }

    /// Bitmap of `c`, `height` rows of [`bytes_per_row`](Self::bytes_per_row)
    pub fn glyph(&self, c: char) -> &'a [u8] {
        let start = HEADER_LEN + self.index(c) * self.glyph_len();
        &self.data[start..start + self.glyph_len()]
    }

    /// One row of the bitmap of `c`
    pub fn glyph_row(&self, c: char, row: u8) -> &'a [u8] {
        let bytes = self.bytes_per_row();
        let start = usize::from(row.min(self.height - 1)) * bytes;
        &self.glyph(c)[start..start + bytes]
    }

    /// Width in pixels of `text` drawn in this font
    pub fn text_width(&self, text: &str) -> usize {
        text.chars().count() * usize::from(self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn test_reverse_bits() {
        assert_eq!(reverse_bits(0x23), 0xC4);
        assert_eq!(reverse_bits(0x01), 0x80);
        assert_eq!(reverse_bits(0x00), 0x00);
    }

    #[test]
    fn test_transpose_rows_and_columns() {
        let mut rows = [0u8; 1];
        assert_eq!(transpose(&[0b1001_1100], 2, 3, &mut rows), Ok(1));
        assert_eq!(rows, [0b1010_1100]);
    }

    #[test]
    fn test_transpose_spans_bytes() {
        // 3 rows x 4 columns, one bit set at row 2, column 3
        let mut source = [0u8; 2];
        set_bit(&mut source, 3 * 3 + 2);
        let mut rows = [0xFFu8; 2];
        transpose(&source, 3, 4, &mut rows).unwrap();
        assert_eq!(rows, [0x00, 0b0001_0000]);
    }

    #[test]
    fn test_pack_columns_skips_column_padding() {
        let mut packed = [0u8; 1];
        assert_eq!(pack_columns(&[0xA0, 0x7F], 3, 2, &mut packed), Ok(1));
        assert_eq!(packed, [0b1010_1100]);
    }

    #[test]
    fn test_pack_columns_multi_byte_column() {
        // 10-bit columns take two source bytes each
        let source = [0xFF, 0xC0, 0x00, 0x40];
        let mut packed = [0u8; 3];
        pack_columns(&source, 10, 2, &mut packed).unwrap();
        assert_eq!(packed, [0xFF, 0xC0, 0x10]);
    }

    #[test]
    fn test_glyph_from_columns_matches_pipeline() {
        let columns = [0x05, 0x03, 0x06, 0x01];
        let (vert, hor) = (3, 4);

        let reversed: Vec<u8> = columns.iter().map(|&b| reverse_bits(b)).collect();
        let mut packed = vec![0u8; 2];
        pack_columns(&reversed, vert, hor, &mut packed).unwrap();
        let mut expected = vec![0u8; 2];
        transpose(&packed, vert, hor, &mut expected).unwrap();

        let mut direct = vec![0u8; 2];
        glyph_from_columns(&columns, vert, hor, &mut direct).unwrap();
        assert_eq!(direct, expected);
    }

    #[test]
    fn test_buffers_checked() {
        let mut small = [0u8; 1];
        assert_eq!(
            transpose(&[0; 2], 3, 4, &mut small),
            Err(FontError::BufferTooSmall {
                required: 2,
                provided: 1
            })
        );
    }

    #[test]
    fn test_packed_font_header() {
        let data = [5, 2, b' ', 2, 0x00, 0x00, 0xF8, 0x88];
        let font = PackedFont::new(&data).unwrap();
        assert_eq!(font.bytes_per_row(), 1);
        assert_eq!(font.glyph_row('!', 1), &[0x88]);
        assert_eq!(font.index('\u{1F}'), 0);
        assert_eq!(font.text_width("ab!"), 15);
    }

    #[test]
    fn test_packed_font_wide_rows() {
        // 12 pixel wide cells use two bytes per row
        let mut data = vec![12, 1, b'A', 1];
        data.extend_from_slice(&[0xAB, 0xC0]);
        let font = PackedFont::new(&data).unwrap();
        assert_eq!(font.glyph('A'), &[0xAB, 0xC0]);
    }

    #[test]
    fn test_packed_font_rejects_truncated() {
        assert_eq!(
            PackedFont::new(&[8, 2, b' ', 2, 0, 0, 0]).unwrap_err(),
            FontError::Truncated {
                required: 8,
                provided: 7
            }
        );
        assert_eq!(
            PackedFont::new(&[0, 2, b' ', 1]).unwrap_err(),
            FontError::EmptyFont
        );
        assert!(PackedFont::new(&[8, 2]).is_err());
    }
}
