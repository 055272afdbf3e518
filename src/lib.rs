//! A baseline and progressive JPEG decoder plus a baseline encoder, and a
//! minimal BMP reader/writer, built around an explicit bitstream/Huffman/
//! DCT layering and a producer-consumer decode pipeline.
#![allow(clippy::needless_return, clippy::similar_names)]

pub use crate::errors::{DecodeErrors, EncodeErrors};
pub use crate::image::{decode_bmp, decode_jpeg, decode_jpeg_with_options, encode_bmp, encode_jpeg, ColorSpaceOutput, DecoderOptions, EncoderOptions, Image};
pub use crate::misc::ColorSpace;

mod bitstream;
mod bitwriter;
mod bmp;
mod color_convert;
mod components;
mod decoder;
mod dct;
mod encoder;
mod entropy;
pub mod errors;
mod headers;
mod huffman;
pub mod image;
mod marker;
mod misc;
mod optimize;
mod pipeline;
mod quant;
