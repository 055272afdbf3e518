//! Quantization tables: de-zigzag, and quality-based scaling of a base
//! table (spec §4.C). Grounded on `zune-jpeg/src/markers.rs::parse_dqt`'s
//! de-zigzag loop, generalized with the encoder-side quality scaling the
//! teacher has no use for (it has no encoder).
use crate::misc::ZIGZAG;

/// A 64-entry table in natural (row-major) order, plus the wire precision
/// it should round-trip at.
#[derive(Clone)]
pub(crate) struct QuantizationTable {
    pub values: [u16; 64],
    /// `false` = 8-bit precision on the wire, `true` = 16-bit.
    pub is_16_bit: bool,
}

impl QuantizationTable {
    /// Build from a zigzag-ordered run of wire bytes/words.
    pub(crate) fn from_zigzag(zigzag_values: &[u16; 64], is_16_bit: bool) -> QuantizationTable {
        let mut values = [0u16; 64];
        for i in 0..64 {
            values[ZIGZAG[i]] = zigzag_values[i];
        }
        QuantizationTable { values, is_16_bit }
    }

    /// Emit this table in zigzag (wire) order.
    pub(crate) fn to_zigzag(&self) -> [u16; 64] {
        let mut out = [0u16; 64];
        for i in 0..64 {
            out[i] = self.values[ZIGZAG[i]];
        }
        out
    }

    /// Scale a base table (already in natural order) by a JPEG quality
    /// factor in `[1, 100]` (spec §4.C).
    pub(crate) fn scale_from_base(base: &[u16; 64], quality: u8, is_16_bit: bool) -> QuantizationTable {
        let quality = quality.clamp(1, 100) as i32;
        let scale = if quality < 50 {
            5000 / quality
        } else {
            200 - 2 * quality
        };
        let max_value = if is_16_bit { 65535 } else { 255 };

        let mut values = [0u16; 64];
        for (i, &b) in base.iter().enumerate() {
            let scaled = (i32::from(b) * scale + 50) / 100;
            values[i] = scaled.clamp(1, max_value) as u16;
        }
        QuantizationTable { values, is_16_bit }
    }
}

/// Standard JPEG Annex K luminance base table, natural (row-major) order.
#[rustfmt::skip]
pub(crate) const STD_LUMINANCE_BASE: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61,
    12, 12, 14, 19, 26, 58, 60, 55,
    14, 13, 16, 24, 40, 57, 69, 56,
    14, 17, 22, 29, 51, 87, 80, 62,
    18, 22, 37, 56, 68, 109, 103, 77,
    24, 35, 55, 64, 81, 104, 113, 92,
    49, 64, 78, 87, 103, 121, 120, 101,
    72, 92, 95, 98, 112, 100, 103, 99,
];

/// Standard JPEG Annex K chrominance base table, natural (row-major) order.
#[rustfmt::skip]
pub(crate) const STD_CHROMINANCE_BASE: [u16; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99,
    18, 21, 26, 66, 99, 99, 99, 99,
    24, 26, 56, 99, 99, 99, 99, 99,
    47, 66, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dezigzag_is_invertible() {
        let mut zigzag_values = [0u16; 64];
        for (i, v) in zigzag_values.iter_mut().enumerate() {
            *v = i as u16;
        }
        let table = QuantizationTable::from_zigzag(&zigzag_values, false);
        assert_eq!(table.to_zigzag(), zigzag_values);
    }

    #[test]
    fn quality_100_is_near_identity_scale() {
        let table = QuantizationTable::scale_from_base(&STD_LUMINANCE_BASE, 100, false);
        // quality=100 -> scale = 0, so every entry clamps to the minimum, 1.
        assert!(table.values.iter().all(|&v| v == 1));
    }

    #[test]
    fn quality_scaling_clamps_to_max() {
        let table = QuantizationTable::scale_from_base(&STD_CHROMINANCE_BASE, 1, false);
        assert!(table.values.iter().all(|&v| v <= 255));
    }
}
