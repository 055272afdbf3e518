//! Error types shared by the decoder, encoder and BMP interchange.
use std::fmt::{Debug, Display, Formatter};
use std::io;

/// Errors that can occur while decoding a JPEG or BMP file.
#[allow(clippy::module_name_repetitions)]
pub enum DecodeErrors {
    /// Reading from the underlying file or buffer failed.
    Io(String),
    /// The stream is not a JPEG/BMP file, or uses a feature this decoder
    /// does not implement (arithmetic coding, 12-bit samples, CMYK, ...).
    Format(String),
    /// A segment's declared length does not match its actual contents.
    LengthMismatch(String),
    /// The entropy-coded stream itself is corrupt (bad Huffman code, bad
    /// spectral range, EOBRUN overshoot, illegal byte-stuffing, ...).
    Corrupt(String),
    /// An internal invariant was violated. Reaching this is a bug in this
    /// crate, not a malformed file.
    Internal(String),
}

impl From<io::Error> for DecodeErrors {
    fn from(e: io::Error) -> Self {
        DecodeErrors::Io(e.to_string())
    }
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(reason) => write!(f, "I/O error: {}", reason),
            Self::Format(reason) => write!(f, "format error: {}", reason),
            Self::LengthMismatch(reason) => write!(f, "length mismatch: {}", reason),
            Self::Corrupt(reason) => write!(f, "corrupt stream: {}", reason),
            Self::Internal(reason) => write!(f, "internal error (this is a bug): {}", reason),
        }
    }
}

impl Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for DecodeErrors {}

/// Errors that can occur while encoding a raster as JPEG or BMP.
pub enum EncodeErrors {
    /// Writing to the sink failed.
    Io(String),
    /// The caller passed an image or option outside what the encoder
    /// supports (e.g. a quality outside `[1,100]`, a raster whose `data`
    /// length does not match `3*width*height`).
    Format(String),
    /// The Huffman optimizer could not length-limit a table to 16 bits.
    /// Only reachable with a pathological frequency distribution.
    BudgetExceeded(String),
    /// An internal invariant was violated.
    Internal(String),
}

impl From<io::Error> for EncodeErrors {
    fn from(e: io::Error) -> Self {
        EncodeErrors::Io(e.to_string())
    }
}

impl Debug for EncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(reason) => write!(f, "I/O error: {}", reason),
            Self::Format(reason) => write!(f, "format error: {}", reason),
            Self::BudgetExceeded(reason) => write!(f, "budget exceeded: {}", reason),
            Self::Internal(reason) => write!(f, "internal error (this is a bug): {}", reason),
        }
    }
}

impl Display for EncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for EncodeErrors {}

/// Prefix an error with parser context, the way the parser layer composes
/// errors as they bubble up ("parsing SOF: precision must be 8").
pub(crate) fn context(stage: &str, e: DecodeErrors) -> DecodeErrors {
    match e {
        DecodeErrors::Format(r) => DecodeErrors::Format(format!("{stage}: {r}")),
        DecodeErrors::LengthMismatch(r) => DecodeErrors::LengthMismatch(format!("{stage}: {r}")),
        DecodeErrors::Corrupt(r) => DecodeErrors::Corrupt(format!("{stage}: {r}")),
        other => other,
    }
}
