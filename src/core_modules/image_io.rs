// THEORY:
// The `image_io` module is the persistence boundary of the capture engine.
// Everything upstream of it is pure; this is the single place that touches
// the filesystem. A capture is written once and never mutated, and a failed
// write is surfaced to the caller rather than retried or swallowed — the
// streaming session itself must survive a full disk.

use crate::error::CaptureError;
use chrono::NaiveDateTime;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Derives the capture filename from a wall-clock timestamp, e.g.
/// `mano_20240102_030405.jpg`.
pub fn capture_filename(timestamp: NaiveDateTime) -> String {
    format!("mano_{}.jpg", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Encodes the raster as a grayscale JPEG and writes it into `output_dir`,
/// creating the directory if it does not exist yet. Returns the written path.
pub fn save_capture(
    output_dir: &Path,
    image: &GrayImage,
    timestamp: NaiveDateTime,
) -> Result<PathBuf, CaptureError> {
    std::fs::create_dir_all(output_dir)?;

    let path = output_dir.join(capture_filename(timestamp));
    let output = File::create(&path)?;
    let encoder = JpegEncoder::new(output);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::L8,
    )?;

    Ok(path)
}
