//! Baseline JPEG encoder (spec §4.H): 4:4:4 sampling, a single interleaved
//! scan, one DQT per component class, and either the Annex K standard
//! Huffman tables or an optimized table built per image.
//!
//! Grounded on the segment-writing order in
//! `rad-medica-jpegexp-rs/src/jpeg1/encoder.rs::Jpeg1Encoder::encode`
//! (SOI -> DQT -> DHT -> DRI -> SOF -> SOS -> entropy -> EOI) and the
//! bit-buffer shape in
//! `other_examples/22f184f2_vstroebel-jpeg-encoder__src-writer.rs.rs`.
//! The Annex K example tables below are the standard tables named in
//! spec.md §4.H step 5, not copied from any one pack file.

use crate::bitwriter::BitWriter;
use crate::color_convert::rgb_to_ycbcr;
use crate::dct::forward_dct;
use crate::errors::EncodeErrors;
use crate::huffman::HuffmanTable;
use crate::image::{EncoderOptions, Image};
use crate::misc::ZIGZAG;
use crate::optimize::optimize_huffman;
use crate::quant::{QuantizationTable, STD_CHROMINANCE_BASE, STD_LUMINANCE_BASE};

const STD_LUM_DC_COUNTS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
const STD_LUM_DC_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

#[rustfmt::skip]
const STD_LUM_AC_COUNTS: [u8; 16] = [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 125];

#[rustfmt::skip]
const STD_LUM_AC_VALUES: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
    0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xa1, 0x08, 0x23, 0x42, 0xb1, 0xc1, 0x15, 0x52, 0xd1, 0xf0,
    0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0a, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2a, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
    0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
    0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
    0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7,
    0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5,
    0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2,
    0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
    0xf9, 0xfa,
];

const STD_CHROM_DC_COUNTS: [u8; 16] = [0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0];
const STD_CHROM_DC_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

#[rustfmt::skip]
const STD_CHROM_AC_COUNTS: [u8; 16] = [0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 119];

#[rustfmt::skip]
const STD_CHROM_AC_VALUES: [u8; 162] = [
    0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21, 0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
    0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91, 0xa1, 0xb1, 0xc1, 0x09, 0x23, 0x33, 0x52, 0xf0,
    0x15, 0x62, 0x72, 0xd1, 0x0a, 0x16, 0x24, 0x34, 0xe1, 0x25, 0xf1, 0x17, 0x18, 0x19, 0x1a, 0x26,
    0x27, 0x28, 0x29, 0x2a, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
    0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
    0x69, 0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
    0x88, 0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5,
    0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3,
    0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda,
    0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
    0xf9, 0xfa,
];

/// One coded block's DC/AC symbol stream, kept separate from the bits the
/// Huffman tables aren't known for yet (when optimizing tables requires a
/// full pass over every block before any bits can be written).
struct EncodedBlock {
    dc_symbol: u8,
    dc_value: i32,
    ac_symbols: Vec<(u8, i32)>,
}

#[inline]
fn magnitude_category(value: i32) -> u8 {
    if value == 0 {
        0
    } else {
        32 - value.unsigned_abs().leading_zeros() as u8
    }
}

#[inline]
fn magnitude_bits(ssss: u8, value: i32) -> u32 {
    if value >= 0 {
        value as u32
    } else {
        (value + ((1i32 << ssss) - 1)) as u32
    }
}

fn quantize_block(block: &[f32; 64], table: &QuantizationTable) -> [i32; 64] {
    let mut out = [0i32; 64];
    for i in 0..64 {
        out[i] = (block[i] / table.values[i] as f32).round() as i32;
    }
    out
}

fn encode_block(block: &[i32; 64], prev_dc: &mut i32) -> EncodedBlock {
    let diff = block[0] - *prev_dc;
    *prev_dc = block[0];
    let dc_symbol = magnitude_category(diff);

    let mut ac_symbols = Vec::new();
    let mut run = 0u8;
    let mut last_nonzero = 0usize;
    for i in 1..64 {
        if block[ZIGZAG[i]] != 0 {
            last_nonzero = i;
        }
    }
    let mut i = 1usize;
    while i <= last_nonzero {
        let value = block[ZIGZAG[i]];
        if value == 0 {
            run += 1;
            if run == 16 {
                ac_symbols.push((0xF0u8, 0));
                run = 0;
            }
        } else {
            let size = magnitude_category(value);
            ac_symbols.push(((run << 4) | size, value));
            run = 0;
        }
        i += 1;
    }
    if last_nonzero < 63 {
        ac_symbols.push((0x00u8, 0));
    }

    EncodedBlock {
        dc_symbol,
        dc_value: diff,
        ac_symbols,
    }
}

fn build_table(counts: &[u8; 16], values: &[u8], symbols: &[u8], optimize: bool) -> Result<HuffmanTable, EncodeErrors> {
    if optimize && !symbols.is_empty() {
        let (counts, symbols) = optimize_huffman(symbols)?;
        Ok(HuffmanTable::from_counts_and_symbols(&counts, &symbols)?)
    } else {
        Ok(HuffmanTable::from_counts_and_symbols(counts, values)?)
    }
}

impl From<crate::errors::DecodeErrors> for EncodeErrors {
    fn from(e: crate::errors::DecodeErrors) -> Self {
        EncodeErrors::Internal(format!("table construction failed: {e}"))
    }
}

pub(crate) fn encode_jpeg_bytes(image: &Image, options: &EncoderOptions) -> Result<Vec<u8>, EncodeErrors> {
    let width = image.width as usize;
    let height = image.height as usize;
    if image.data.len() != 3 * width * height {
        return Err(EncodeErrors::Format(format!(
            "image data length {} does not match 3*{width}*{height}",
            image.data.len()
        )));
    }
    if width == 0 || height == 0 {
        return Err(EncodeErrors::Format("cannot encode a zero-sized image".to_string()));
    }

    let blocks_w = (width + 7) / 8;
    let blocks_h = (height + 7) / 8;

    let lum_table = QuantizationTable::scale_from_base(&STD_LUMINANCE_BASE, options.luminance_quality, false);
    let chrom_table = QuantizationTable::scale_from_base(&STD_CHROMINANCE_BASE, options.chrominance_quality, false);

    let mut y_blocks = Vec::with_capacity(blocks_w * blocks_h);
    let mut cb_blocks = Vec::with_capacity(blocks_w * blocks_h);
    let mut cr_blocks = Vec::with_capacity(blocks_w * blocks_h);

    for by in 0..blocks_h {
        for bx in 0..blocks_w {
            let mut yb = [0f32; 64];
            let mut cbb = [0f32; 64];
            let mut crb = [0f32; 64];
            for row in 0..8 {
                let y = (by * 8 + row).min(height - 1);
                for col in 0..8 {
                    let x = (bx * 8 + col).min(width - 1);
                    let offset = 3 * (y * width + x);
                    let (r, g, b) = (
                        f32::from(image.data[offset]),
                        f32::from(image.data[offset + 1]),
                        f32::from(image.data[offset + 2]),
                    );
                    let (yy, cb, cr) = rgb_to_ycbcr(r, g, b);
                    let idx = row * 8 + col;
                    yb[idx] = yy - 128.0;
                    cbb[idx] = cb - 128.0;
                    crb[idx] = cr - 128.0;
                }
            }
            forward_dct(&mut yb);
            forward_dct(&mut cbb);
            forward_dct(&mut crb);
            y_blocks.push(quantize_block(&yb, &lum_table));
            cb_blocks.push(quantize_block(&cbb, &chrom_table));
            cr_blocks.push(quantize_block(&crb, &chrom_table));
        }
    }

    let mut prev_dc_y = 0i32;
    let mut prev_dc_cb = 0i32;
    let mut prev_dc_cr = 0i32;
    let mut encoded_y = Vec::with_capacity(y_blocks.len());
    let mut encoded_cb = Vec::with_capacity(cb_blocks.len());
    let mut encoded_cr = Vec::with_capacity(cr_blocks.len());
    // Mirrors the restart cadence of the bit-writing loop below: the decoder
    // zeroes its DC predictors at every restart marker, so the diffs we
    // compute here must be taken against zero at the same points.
    let mut dc_units_since_restart = 0u32;
    for i in 0..y_blocks.len() {
        if options.restart_interval > 0 && dc_units_since_restart == u32::from(options.restart_interval) {
            prev_dc_y = 0;
            prev_dc_cb = 0;
            prev_dc_cr = 0;
            dc_units_since_restart = 0;
        }
        encoded_y.push(encode_block(&y_blocks[i], &mut prev_dc_y));
        encoded_cb.push(encode_block(&cb_blocks[i], &mut prev_dc_cb));
        encoded_cr.push(encode_block(&cr_blocks[i], &mut prev_dc_cr));
        dc_units_since_restart += 1;
    }

    let mut lum_dc_symbols = Vec::new();
    let mut lum_ac_symbols = Vec::new();
    for b in &encoded_y {
        lum_dc_symbols.push(b.dc_symbol);
        lum_ac_symbols.extend(b.ac_symbols.iter().map(|(s, _)| *s));
    }
    let mut chrom_dc_symbols = Vec::new();
    let mut chrom_ac_symbols = Vec::new();
    for b in encoded_cb.iter().chain(encoded_cr.iter()) {
        chrom_dc_symbols.push(b.dc_symbol);
        chrom_ac_symbols.extend(b.ac_symbols.iter().map(|(s, _)| *s));
    }

    let dc_lum_table = build_table(&STD_LUM_DC_COUNTS, &STD_LUM_DC_VALUES, &lum_dc_symbols, options.optimize_huffman_tables)?;
    let ac_lum_table = build_table(&STD_LUM_AC_COUNTS, &STD_LUM_AC_VALUES, &lum_ac_symbols, options.optimize_huffman_tables)?;
    let dc_chrom_table = build_table(&STD_CHROM_DC_COUNTS, &STD_CHROM_DC_VALUES, &chrom_dc_symbols, options.optimize_huffman_tables)?;
    let ac_chrom_table = build_table(&STD_CHROM_AC_COUNTS, &STD_CHROM_AC_VALUES, &chrom_ac_symbols, options.optimize_huffman_tables)?;

    let mut out = Vec::new();
    out.extend_from_slice(&[0xFF, 0xD8]); // SOI

    write_dqt(&mut out, 0, &lum_table);
    write_dqt(&mut out, 1, &chrom_table);

    write_dht(&mut out, 0, 0, &dc_lum_table);
    write_dht(&mut out, 1, 0, &ac_lum_table);
    write_dht(&mut out, 0, 1, &dc_chrom_table);
    write_dht(&mut out, 1, 1, &ac_chrom_table);

    if options.restart_interval > 0 {
        write_dri(&mut out, options.restart_interval);
    }

    write_sof0(&mut out, width as u16, height as u16);
    write_sos(&mut out);

    let mut writer = BitWriter::new();
    writer.set_byte_stuffing(true);
    let mut units_since_restart = 0u32;
    let mut restart_marker = 0u8;

    for i in 0..y_blocks.len() {
        if options.restart_interval > 0 && units_since_restart == u32::from(options.restart_interval) {
            writer.flush_byte(true);
            writer.flush_buffer(&mut out);
            out.extend_from_slice(&[0xFF, 0xD0 + (restart_marker % 8)]);
            restart_marker = restart_marker.wrapping_add(1);
            units_since_restart = 0;
        }

        write_block(&mut writer, &encoded_y[i], &dc_lum_table, &ac_lum_table);
        write_block(&mut writer, &encoded_cb[i], &dc_chrom_table, &ac_chrom_table);
        write_block(&mut writer, &encoded_cr[i], &dc_chrom_table, &ac_chrom_table);
        writer.flush_buffer(&mut out);

        units_since_restart += 1;
    }

    writer.flush_byte(true);
    writer.set_byte_stuffing(false);
    writer.flush_buffer(&mut out);

    out.extend_from_slice(&[0xFF, 0xD9]); // EOI
    Ok(out)
}

fn write_block(writer: &mut BitWriter, block: &EncodedBlock, dc_table: &HuffmanTable, ac_table: &HuffmanTable) {
    let (code, length) = dc_table.encode(block.dc_symbol).expect("every category 0..=11 is present in a DC table");
    writer.write_value(code, length);
    if block.dc_symbol > 0 {
        writer.write_bits(magnitude_bits(block.dc_symbol, block.dc_value), u32::from(block.dc_symbol));
    }

    for &(symbol, value) in &block.ac_symbols {
        let (code, length) = ac_table.encode(symbol).expect("RLE symbol must be representable in the AC table");
        writer.write_value(code, length);
        let size = symbol & 0x0F;
        if size != 0 {
            writer.write_bits(magnitude_bits(size, value), u32::from(size));
        }
    }
}

fn write_dqt(out: &mut Vec<u8>, dest: u8, table: &QuantizationTable) {
    out.extend_from_slice(&[0xFF, 0xDB]);
    out.extend_from_slice(&(67u16).to_be_bytes());
    out.push(dest);
    for v in table.to_zigzag() {
        out.push(v as u8);
    }
}

fn write_dht(out: &mut Vec<u8>, class: u8, dest: u8, table: &HuffmanTable) {
    let (counts, symbols) = table.to_counts_and_symbols();
    out.extend_from_slice(&[0xFF, 0xC4]);
    let length = 2 + 1 + 16 + symbols.len();
    out.extend_from_slice(&(length as u16).to_be_bytes());
    out.push((class << 4) | dest);
    out.extend_from_slice(&counts);
    out.extend_from_slice(&symbols);
}

fn write_dri(out: &mut Vec<u8>, interval: u16) {
    out.extend_from_slice(&[0xFF, 0xDD]);
    out.extend_from_slice(&(4u16).to_be_bytes());
    out.extend_from_slice(&interval.to_be_bytes());
}

fn write_sof0(out: &mut Vec<u8>, width: u16, height: u16) {
    out.extend_from_slice(&[0xFF, 0xC0]);
    out.extend_from_slice(&(17u16).to_be_bytes());
    out.push(8); // precision
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&width.to_be_bytes());
    out.push(3); // components
    out.extend_from_slice(&[1, 0x11, 0]); // Y, H=V=1, qtable 0
    out.extend_from_slice(&[2, 0x11, 1]); // Cb, qtable 1
    out.extend_from_slice(&[3, 0x11, 1]); // Cr, qtable 1
}

fn write_sos(out: &mut Vec<u8>) {
    out.extend_from_slice(&[0xFF, 0xDA]);
    out.extend_from_slice(&(12u16).to_be_bytes());
    out.push(3);
    out.extend_from_slice(&[1, 0x00]); // Y: dc 0, ac 0
    out.extend_from_slice(&[2, 0x11]); // Cb: dc 1, ac 1
    out.extend_from_slice(&[3, 0x11]); // Cr: dc 1, ac 1
    out.extend_from_slice(&[0, 63, 0]); // Ss=0, Se=63, Ah=Al=0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_jpeg_bytes;
    use crate::image::DecoderOptions;

    fn flat_image(width: u32, height: u32, rgb: (u8, u8, u8)) -> Image {
        let mut data = Vec::with_capacity(3 * width as usize * height as usize);
        for _ in 0..(width as usize * height as usize) {
            data.push(rgb.0);
            data.push(rgb.1);
            data.push(rgb.2);
        }
        Image { width, height, data }
    }

    #[test]
    fn flat_grey_round_trips_within_tolerance() {
        let image = flat_image(8, 8, (128, 128, 128));
        let options = EncoderOptions::new().with_quality(100);
        let bytes = encode_jpeg_bytes(&image, &options).unwrap();
        let decoded = decode_jpeg_bytes(&bytes, &DecoderOptions::default()).unwrap();
        for &p in &decoded.data {
            assert!((i32::from(p) - 128).abs() <= 2);
        }
    }

    #[test]
    fn rejects_mismatched_buffer_length() {
        let image = Image {
            width: 4,
            height: 4,
            data: vec![0u8; 10],
        };
        let options = EncoderOptions::new();
        assert!(encode_jpeg_bytes(&image, &options).is_err());
    }

    #[test]
    fn restart_interval_produces_restart_markers() {
        let image = flat_image(32, 8, (40, 90, 160));
        let options = EncoderOptions::new().with_quality(90).with_restart_interval(1);
        let bytes = encode_jpeg_bytes(&image, &options).unwrap();
        assert!(bytes.windows(2).any(|w| w == [0xFF, 0xD0]));
        let decoded = decode_jpeg_bytes(&bytes, &DecoderOptions::default()).unwrap();
        assert_eq!(decoded.width, 32);
        assert_eq!(decoded.height, 8);
    }
}
