//! Minimal BMP interchange (spec §4.I): 1/4/8/24-bit readers with palette
//! support, and a 24-bit BITMAPCOREHEADER writer. No pack file implements
//! BMP, so this follows spec.md §6's wire-format description directly,
//! written in the teacher's terse `read_u8`/`read_u16_be`-style parsing
//! (`zune-jpeg/src/misc.rs`).

use crate::errors::{DecodeErrors, EncodeErrors};
use crate::image::Image;

fn read_u16_le(buf: &[u8], pos: usize) -> Option<u16> {
    let b = buf.get(pos..pos + 2)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32_le(buf: &[u8], pos: usize) -> Option<u32> {
    let b = buf.get(pos..pos + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn read_i32_le(buf: &[u8], pos: usize) -> Option<i32> {
    read_u32_le(buf, pos).map(|v| v as i32)
}

/// Decode a BMP buffer into a top-down RGB `Image`.
pub(crate) fn decode_bmp_bytes(buf: &[u8]) -> Result<Image, DecodeErrors> {
    if buf.len() < 14 || &buf[0..2] != b"BM" {
        return Err(DecodeErrors::Format("not a BMP file (missing 'BM' signature)".to_string()));
    }
    let data_offset = read_u32_le(buf, 10).ok_or_else(|| DecodeErrors::Io("truncated BMP file header".to_string()))? as usize;

    let header_size = read_u32_le(buf, 14).ok_or_else(|| DecodeErrors::Io("truncated BMP info header".to_string()))? as usize;
    if header_size != 12 && header_size != 40 {
        return Err(DecodeErrors::Format(format!("unsupported BMP info header size {header_size}")));
    }

    let (width, height, bit_depth): (i32, i32, u16) = if header_size == 12 {
        let w = read_u16_le(buf, 18).ok_or_else(|| DecodeErrors::Io("truncated BMP core header".to_string()))? as i32;
        let h = read_u16_le(buf, 20).ok_or_else(|| DecodeErrors::Io("truncated BMP core header".to_string()))? as i32;
        let bpp = read_u16_le(buf, 24).ok_or_else(|| DecodeErrors::Io("truncated BMP core header".to_string()))?;
        (w, h, bpp)
    } else {
        let w = read_i32_le(buf, 18).ok_or_else(|| DecodeErrors::Io("truncated BMP info header".to_string()))?;
        let h = read_i32_le(buf, 22).ok_or_else(|| DecodeErrors::Io("truncated BMP info header".to_string()))?;
        let bpp = read_u16_le(buf, 28).ok_or_else(|| DecodeErrors::Io("truncated BMP info header".to_string()))?;
        (w, h, bpp)
    };

    if !matches!(bit_depth, 1 | 4 | 8 | 24) {
        return Err(DecodeErrors::Format(format!("unsupported BMP bit depth {bit_depth}")));
    }
    let width = width.unsigned_abs() as usize;
    let bottom_up = height > 0;
    let height = height.unsigned_abs() as usize;
    if width == 0 || height == 0 {
        return Err(DecodeErrors::Format("BMP declares a zero-sized image".to_string()));
    }

    let palette_entries = if bit_depth <= 8 { 1usize << bit_depth } else { 0 };
    let palette_start = 14 + header_size;
    let mut palette = Vec::with_capacity(palette_entries);
    for i in 0..palette_entries {
        let entry = palette_start + i * 4;
        let b = *buf.get(entry).ok_or_else(|| DecodeErrors::Io("truncated BMP palette".to_string()))?;
        let g = *buf.get(entry + 1).ok_or_else(|| DecodeErrors::Io("truncated BMP palette".to_string()))?;
        let r = *buf.get(entry + 2).ok_or_else(|| DecodeErrors::Io("truncated BMP palette".to_string()))?;
        palette.push((r, g, b));
    }

    let row_stride = ((u32::from(bit_depth) * width as u32 + 31) / 32 * 4) as usize;
    let mut data = vec![0u8; 3 * width * height];

    for row in 0..height {
        let file_row = if bottom_up { height - 1 - row } else { row };
        let row_start = data_offset + file_row * row_stride;
        let row_bytes = buf
            .get(row_start..row_start + row_stride)
            .ok_or_else(|| DecodeErrors::Io("truncated BMP pixel data".to_string()))?;

        for col in 0..width {
            let (r, g, b) = match bit_depth {
                24 => {
                    let o = col * 3;
                    (row_bytes[o + 2], row_bytes[o + 1], row_bytes[o])
                }
                8 => palette[row_bytes[col] as usize],
                4 => {
                    let byte = row_bytes[col / 2];
                    let index = if col % 2 == 0 { byte >> 4 } else { byte & 0x0F };
                    palette[index as usize]
                }
                1 => {
                    let byte = row_bytes[col / 8];
                    let index = (byte >> (7 - (col % 8))) & 1;
                    palette[index as usize]
                }
                _ => unreachable!("bit depth already validated"),
            };
            let out = 3 * (row * width + col);
            data[out] = r;
            data[out + 1] = g;
            data[out + 2] = b;
        }
    }

    Ok(Image {
        width: width as u32,
        height: height as u32,
        data,
    })
}

/// Encode an RGB `Image` as a 24-bit BMP with a 12-byte BITMAPCOREHEADER,
/// bottom-up rows, BGR pixel order.
pub(crate) fn encode_bmp_bytes(image: &Image) -> Result<Vec<u8>, EncodeErrors> {
    let width = image.width as usize;
    let height = image.height as usize;
    if image.data.len() != 3 * width * height {
        return Err(EncodeErrors::Format(format!(
            "image data length {} does not match 3*{width}*{height}",
            image.data.len()
        )));
    }
    if width == 0 || height == 0 || width > u16::MAX as usize || height > u16::MAX as usize {
        return Err(EncodeErrors::Format("image dimensions out of BITMAPCOREHEADER range".to_string()));
    }

    let row_stride = ((24 * width as u32 + 31) / 32 * 4) as usize;
    let pixel_data_len = row_stride * height;
    let data_offset = 14 + 12;
    let file_size = data_offset + pixel_data_len;

    let mut out = Vec::with_capacity(file_size);
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    out.extend_from_slice(&(data_offset as u32).to_le_bytes());

    out.extend_from_slice(&12u32.to_le_bytes()); // BITMAPCOREHEADER size
    out.extend_from_slice(&(width as u16).to_le_bytes());
    out.extend_from_slice(&(height as u16).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&24u16.to_le_bytes()); // bit depth

    for row in (0..height).rev() {
        let row_start = out.len();
        for col in 0..width {
            let offset = 3 * (row * width + col);
            out.push(image.data[offset + 2]); // B
            out.push(image.data[offset + 1]); // G
            out.push(image.data[offset]); // R
        }
        let written = out.len() - row_start;
        out.resize(row_start + row_stride, 0);
        debug_assert!(written <= row_stride);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_small_image() {
        let image = Image {
            width: 2,
            height: 2,
            data: vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
        };
        let bytes = encode_bmp_bytes(&image).unwrap();
        let decoded = decode_bmp_bytes(&bytes).unwrap();
        assert_eq!(decoded.width, 2);
        assert_eq!(decoded.height, 2);
        assert_eq!(decoded.data, image.data);
    }

    #[test]
    fn rejects_bad_signature() {
        assert!(decode_bmp_bytes(&[0u8; 20]).is_err());
    }

    #[test]
    fn row_stride_padding_is_applied() {
        // width=3 -> 9 bytes/row unpadded -> stride rounds up to 12.
        let image = Image {
            width: 3,
            height: 1,
            data: vec![10, 20, 30, 40, 50, 60, 70, 80, 90],
        };
        let bytes = encode_bmp_bytes(&image).unwrap();
        let data_offset = read_u32_le(&bytes, 10).unwrap() as usize;
        assert_eq!(bytes.len() - data_offset, 12);
    }
}
