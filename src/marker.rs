//! JPEG marker byte values and the `Marker` enum used by the parser's
//! dispatch table (spec §4.E).

/// A marker found in the JPEG stream. The variant carries enough
/// information to distinguish restart markers from each other since the
/// decoder needs to know *which* RSTn it saw to validate ordering.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Marker {
    /// Start of image, `0xFFD8`.
    SOI,
    /// Start of frame, baseline DCT, `0xFFC0`.
    SOF0,
    /// Start of frame, progressive DCT, `0xFFC2`.
    SOF2,
    /// Start of frame, a variant this decoder does not support (extended
    /// sequential, lossless, arithmetic-coded, ...).
    SOFUnsupported(u8),
    /// Define Huffman Table, `0xFFC4`.
    DHT,
    /// Define Quantization Table, `0xFFDB`.
    DQT,
    /// Define Restart Interval, `0xFFDD`.
    DRI,
    /// Define Number of Lines, `0xFFDC`.
    DNL,
    /// Start of Scan, `0xFFDA`.
    SOS,
    /// Restart marker `0xFFD0..=0xFFD7`, payload is `n` in `RSTn`.
    RST(u8),
    /// End of Image, `0xFFD9`.
    EOI,
    /// Application segment `APPn`, `0xFFE0..=0xFFEF`.
    APP(u8),
    /// Comment segment, `0xFFFE`.
    COM,
    /// Any other marker byte; carried so the parser can skip a segment it
    /// does not need to understand rather than failing outright.
    Other(u8),
}

impl Marker {
    /// Map the raw marker byte that follows a `0xFF` to a `Marker`.
    /// Returns `None` for `0x00` and `0xFF` which are not markers (the
    /// former is scan-data byte-stuffing, the latter is a fill byte).
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<Marker> {
        match byte {
            0x00 | 0xFF => None,
            0xD8 => Some(Marker::SOI),
            0xC0 => Some(Marker::SOF0),
            0xC2 => Some(Marker::SOF2),
            0xC1 | 0xC3 | 0xC5..=0xC7 | 0xC9..=0xCF => Some(Marker::SOFUnsupported(byte)),
            0xC4 => Some(Marker::DHT),
            0xDB => Some(Marker::DQT),
            0xDD => Some(Marker::DRI),
            0xDC => Some(Marker::DNL),
            0xDA => Some(Marker::SOS),
            0xD0..=0xD7 => Some(Marker::RST(byte - 0xD0)),
            0xD9 => Some(Marker::EOI),
            0xE0..=0xEF => Some(Marker::APP(byte - 0xE0)),
            0xFE => Some(Marker::COM),
            other => Some(Marker::Other(other)),
        }
    }
}
