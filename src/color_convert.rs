//! YCbCr -> RGB colour conversion (spec §4.C "level shift" boundary).
//! Grounded on the BT.601 coefficients in
//! `zune-jpeg/src/color_convert.rs::ycbcr_to_rgb_inner`, kept scalar only
//! (the teacher's `sse`/`avx` variants are a SIMD acceleration scheme this
//! crate does not carry forward).

use crate::misc::clamp_u8;

/// Convert one level-shifted YCbCr sample (`Y,Cb,Cr` each already
/// `+128`'d back into `[0,255]`) to RGB.
#[inline]
pub(crate) fn ycbcr_to_rgb(y: f32, cb: f32, cr: f32) -> (u8, u8, u8) {
    let cb = cb - 128.0;
    let cr = cr - 128.0;
    let r = y + 1.402 * cr;
    let g = y - 0.344_136 * cb - 0.714_136 * cr;
    let b = y + 1.772 * cb;
    (clamp_u8(r), clamp_u8(g), clamp_u8(b))
}

/// Convert RGB to YCbCr, inverse of `ycbcr_to_rgb`, used by the encoder.
#[inline]
pub(crate) fn rgb_to_ycbcr(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = 128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b;
    let cr = 128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b;
    (y, cb, cr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_round_trips_through_ycbcr() {
        let (y, cb, cr) = rgb_to_ycbcr(128.0, 128.0, 128.0);
        assert!((y - 128.0).abs() < 1e-3);
        let (r, g, b) = ycbcr_to_rgb(y, cb, cr);
        assert_eq!((r, g, b), (128, 128, 128));
    }

    #[test]
    fn pure_colours_round_trip_within_rounding() {
        for (r, g, b) in [(255.0, 0.0, 0.0), (0.0, 255.0, 0.0), (0.0, 0.0, 255.0)] {
            let (y, cb, cr) = rgb_to_ycbcr(r, g, b);
            let (or, og, ob) = ycbcr_to_rgb(y, cb, cr);
            assert!((f32::from(or) - r).abs() <= 2.0);
            assert!((f32::from(og) - g).abs() <= 2.0);
            assert!((f32::from(ob) - b).abs() <= 2.0);
        }
    }
}
