//! Small shared tables and helpers: zigzag order, colour space tag, and
//! big-endian read helpers used throughout the parser.
#![allow(dead_code)]

/// Natural (row-major) position of the `i`-th coefficient in zigzag order.
/// `table[zigzag[i]] = file_byte[i]` is how a wire-order quantization table
/// or coefficient run is un-scrambled back to row-major order.
#[rustfmt::skip]
pub const ZIGZAG: [usize; 64] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// The colour space the decoded raster is expressed in. `decode_jpeg`
/// always returns `Rgb`; `Grayscale` exists for single-component frames
/// that a caller asked to keep unexpanded via `DecoderOptions`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorSpace {
    Rgb,
    Grayscale,
}

impl ColorSpace {
    #[must_use]
    pub const fn num_components(self) -> usize {
        match self {
            ColorSpace::Rgb => 3,
            ColorSpace::Grayscale => 1,
        }
    }
}

/// Encoding process a frame was written with.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EncodingProcess {
    Baseline,
    Progressive,
}

#[inline]
pub(crate) fn read_u8(buf: &[u8], pos: &mut usize) -> Option<u8> {
    let b = *buf.get(*pos)?;
    *pos += 1;
    Some(b)
}

#[inline]
pub(crate) fn read_u16_be(buf: &[u8], pos: &mut usize) -> Option<u16> {
    let hi = read_u8(buf, pos)?;
    let lo = read_u8(buf, pos)?;
    Some((u16::from(hi) << 8) | u16::from(lo))
}

#[inline]
pub(crate) fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
