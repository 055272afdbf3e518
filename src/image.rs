//! The public raster type and the decode/encode option builders (spec §3,
//! §6). Grounded on `zune-jpeg`'s `Decoder` default-option struct and on
//! spec.md §6's literal `Image` shape; `EncoderOptions` is new (the
//! teacher has no encoder) but follows the same builder style.

use std::fs;
use std::path::Path;

use crate::bmp;
use crate::decoder::decode_jpeg_bytes;
use crate::encoder::encode_jpeg_bytes;
use crate::errors::{DecodeErrors, EncodeErrors};
use crate::misc::ColorSpace;

/// A decoded raster: row-major RGB bytes, `data.len() == 3 * width * height`
/// unless `ColorSpaceOutput::Grayscale` was requested for a single-component
/// JPEG, in which case every pixel is still written as three equal bytes
/// (callers that want a packed 1-byte-per-pixel buffer can strip it
/// themselves; this crate never hands back a variable-stride raster).
#[derive(Clone, Debug)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Image {
    pub fn color_space(&self) -> ColorSpace {
        ColorSpace::Rgb
    }
}

/// Whether a single-component JPEG's output pixels should stay grayscale
/// (each pixel written as `(y,y,y)`) or be treated as if it were RGB.
/// Multi-component frames always decode to `Rgb` regardless of this
/// setting.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ColorSpaceOutput {
    #[default]
    Rgb,
    Grayscale,
}

/// Decoder configuration, mirroring `zune-jpeg::DecoderOptions`' defaults.
#[derive(Debug, Clone)]
pub struct DecoderOptions {
    /// Upper bound on the number of SOS segments a single frame may
    /// contain, guarding against a pathological/corrupt progressive file
    /// spinning up an unbounded number of scan threads.
    pub max_scans: usize,
    /// Retain APPn/COM payload bytes instead of discarding them.
    pub keep_metadata: bool,
    pub output_color_space: ColorSpaceOutput,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_scans: 64,
            keep_metadata: false,
            output_color_space: ColorSpaceOutput::Rgb,
        }
    }
}

impl DecoderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_scans(mut self, max_scans: usize) -> Self {
        self.max_scans = max_scans;
        self
    }

    #[must_use]
    pub fn with_keep_metadata(mut self, keep: bool) -> Self {
        self.keep_metadata = keep;
        self
    }

    #[must_use]
    pub fn with_output_color_space(mut self, space: ColorSpaceOutput) -> Self {
        self.output_color_space = space;
        self
    }
}

/// Encoder configuration (spec §6's `encode_jpeg` option bag, plus the
/// restart-interval knob `original_source/include/FileParser/Jpeg/
/// JpegEncoder.h` exposes that the distilled spec dropped).
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    pub luminance_quality: u8,
    pub chrominance_quality: u8,
    pub optimize_huffman_tables: bool,
    pub restart_interval: u16,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        EncoderOptions {
            luminance_quality: 90,
            chrominance_quality: 90,
            optimize_huffman_tables: false,
            restart_interval: 0,
        }
    }
}

impl EncoderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.luminance_quality = quality;
        self.chrominance_quality = quality;
        self
    }

    #[must_use]
    pub fn with_optimize_huffman_tables(mut self, optimize: bool) -> Self {
        self.optimize_huffman_tables = optimize;
        self
    }

    #[must_use]
    pub fn with_restart_interval(mut self, interval: u16) -> Self {
        self.restart_interval = interval;
        self
    }
}

/// Decode a JPEG file from disk using default options.
pub fn decode_jpeg<P: AsRef<Path>>(path: P) -> Result<Image, DecodeErrors> {
    decode_jpeg_with_options(path, &DecoderOptions::default())
}

pub fn decode_jpeg_with_options<P: AsRef<Path>>(path: P, options: &DecoderOptions) -> Result<Image, DecodeErrors> {
    let buf = fs::read(path)?;
    decode_jpeg_bytes(&buf, options)
}

/// Decode a BMP file from disk.
pub fn decode_bmp<P: AsRef<Path>>(path: P) -> Result<Image, DecodeErrors> {
    let buf = fs::read(path)?;
    bmp::decode_bmp_bytes(&buf)
}

/// Encode `image` as baseline JPEG and write it to `path`.
pub fn encode_jpeg<P: AsRef<Path>>(image: &Image, path: P, options: &EncoderOptions) -> Result<(), EncodeErrors> {
    let bytes = encode_jpeg_bytes(image, options)?;
    write_atomically(path, &bytes)
}

/// Encode `image` as a 24-bit BMP and write it to `path`.
pub fn encode_bmp<P: AsRef<Path>>(image: &Image, path: P) -> Result<(), EncodeErrors> {
    let bytes = bmp::encode_bmp_bytes(image)?;
    write_atomically(path, &bytes)
}

/// Write the full buffer or leave nothing behind (spec §7: "no partial
/// file is written by the encoder").
fn write_atomically<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), EncodeErrors> {
    let path = path.as_ref();
    if let Err(e) = fs::write(path, bytes) {
        let _ = fs::remove_file(path);
        return Err(EncodeErrors::from(e));
    }
    Ok(())
}
