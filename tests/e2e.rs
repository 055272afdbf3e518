//! End-to-end scenarios driven entirely through the public file-based API
//! (spec.md §8's "concrete end-to-end scenarios" 1 and 2, plus the restart
//! independence property).

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use jpegtoy::{decode_bmp, decode_jpeg, encode_bmp, encode_jpeg, EncoderOptions, Image};

static COUNTER: AtomicU32 = AtomicU32::new(0);

fn scratch_path(extension: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut path = std::env::temp_dir();
    path.push(format!("jpegtoy-e2e-{}-{id}.{extension}", std::process::id()));
    path
}

struct TempFile(PathBuf);

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

#[test]
fn two_by_two_bmp_round_trips_through_jpeg() {
    let image = Image {
        width: 2,
        height: 2,
        data: vec![
            255, 0, 0, // red
            0, 255, 0, // green
            0, 0, 255, // blue
            255, 255, 255, // white
        ],
    };

    let bmp_path = TempFile(scratch_path("bmp"));
    let jpeg_path = TempFile(scratch_path("jpg"));

    encode_bmp(&image, &bmp_path.0).unwrap();
    let reloaded = decode_bmp(&bmp_path.0).unwrap();
    assert_eq!(reloaded.data, image.data);

    let options = EncoderOptions::new().with_quality(100);
    encode_jpeg(&reloaded, &jpeg_path.0, &options).unwrap();
    let roundtripped = decode_jpeg(&jpeg_path.0).unwrap();

    assert_eq!(roundtripped.width, 2);
    assert_eq!(roundtripped.height, 2);
    for (out, reference) in roundtripped.data.iter().zip(image.data.iter()) {
        let diff = (i32::from(*out) - i32::from(*reference)).abs();
        assert!(diff <= 3, "pixel channel differs by {diff}, expected <= 3");
    }
}

#[test]
fn eight_by_eight_flat_grey_is_lossless_at_quality_100() {
    let mut data = Vec::with_capacity(3 * 8 * 8);
    for _ in 0..(8 * 8) {
        data.extend_from_slice(&[128, 128, 128]);
    }
    let image = Image { width: 8, height: 8, data };

    let jpeg_path = TempFile(scratch_path("jpg"));
    let options = EncoderOptions::new().with_quality(100);
    encode_jpeg(&image, &jpeg_path.0, &options).unwrap();
    let decoded = decode_jpeg(&jpeg_path.0).unwrap();

    assert_eq!(decoded.data, vec![128u8; 3 * 8 * 8]);
}

#[test]
fn restart_markers_do_not_change_decoded_output() {
    let width = 32u32;
    let height = 16u32;
    let mut data = Vec::with_capacity(3 * width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            data.push(((x * 7 + y * 3) % 256) as u8);
            data.push(((x * 5 + y * 11) % 256) as u8);
            data.push(((x * 13 + y) % 256) as u8);
        }
    }
    let image = Image { width, height, data };

    let no_restarts = TempFile(scratch_path("jpg"));
    let with_restarts = TempFile(scratch_path("jpg"));

    encode_jpeg(&image, &no_restarts.0, &EncoderOptions::new().with_quality(90)).unwrap();
    encode_jpeg(
        &image,
        &with_restarts.0,
        &EncoderOptions::new().with_quality(90).with_restart_interval(2),
    )
    .unwrap();

    let a = decode_jpeg(&no_restarts.0).unwrap();
    let b = decode_jpeg(&with_restarts.0).unwrap();
    assert_eq!(a.width, b.width);
    assert_eq!(a.height, b.height);
    assert_eq!(a.data, b.data);
}

#[test]
fn encoder_leaves_no_partial_file_on_a_bad_path() {
    let image = Image {
        width: 2,
        height: 2,
        data: vec![0u8; 12],
    };
    // A directory that does not exist cannot be written into; the helper
    // must not leave a truncated file behind (there is nothing to leave,
    // but the call must still fail cleanly rather than panic).
    let bogus = PathBuf::from("/nonexistent-jpegtoy-directory/out.bmp");
    assert!(encode_bmp(&image, &bogus).is_err());
}
