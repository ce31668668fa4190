// THEORY:
// The `Stylizer` is the deterministic half of the capture engine. Given one
// raw RGB frame it produces one small grayscale "photographic" raster, ready
// to be encoded and written. It holds no state between calls: the same frame
// in always means the same raster out.
//
// The pipeline is a fixed sequence, each stage's output feeding the next:
// 1.  **Centered square crop** covering 80% of the frame's shorter side, which
//     discards the periphery where the hand rarely sits.
// 2.  **Downscale** to a fixed 28x28 raster with a triangle filter. The
//     `image` crate scales the filter support with the shrink ratio, so on a
//     large reduction this behaves as an area average and avoids aliasing.
// 3.  **Grayscale** via the standard luminance weights.
// 4.  **CLAHE** for local contrast, so a washed-out hand still reads clearly.
// 5.  **Bilateral smoothing** to knock down pixel noise without losing the
//     hand outline.
// 6.  **Min-max normalization** stretching the result to the full [0, 255]
//     range. A zero-variance image passes through untouched.

use crate::core_modules::bilateral::bilateral_filter;
use crate::core_modules::clahe::clahe;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};

/// Configuration for the stylization pipeline, allowing for tunable behavior.
#[derive(Debug, Clone)]
pub struct StylizerConfig {
    /// Fraction of the frame's shorter side covered by the square crop.
    pub crop_factor: f64,
    /// Side length of the output raster in pixels.
    pub target_size: u32,
    /// CLAHE clip limit relative to the uniform histogram level.
    pub clahe_clip_limit: f64,
    /// CLAHE tile grid dimension (8 means an 8x8 grid).
    pub clahe_grid_size: u32,
    /// Bilateral neighborhood diameter in pixels.
    pub bilateral_diameter: u32,
    /// Bilateral intensity-difference falloff.
    pub bilateral_sigma_color: f64,
    /// Bilateral spatial-distance falloff.
    pub bilateral_sigma_space: f64,
}

impl Default for StylizerConfig {
    fn default() -> Self {
        Self {
            crop_factor: 0.8,
            target_size: 28,
            clahe_clip_limit: 2.0,
            clahe_grid_size: 8,
            bilateral_diameter: 7,
            bilateral_sigma_color: 50.0,
            bilateral_sigma_space: 50.0,
        }
    }
}

/// The deterministic crop/downscale/stylize pipeline.
pub struct Stylizer {
    config: StylizerConfig,
}

impl Stylizer {
    pub fn new(config: StylizerConfig) -> Self {
        Self { config }
    }

    /// Runs the full pipeline on one frame. Pure: no hidden state, no I/O.
    pub fn stylize(&self, frame: &RgbImage) -> GrayImage {
        // --- 1. Centered square crop ---
        let cropped = centered_crop(frame, self.config.crop_factor);

        // --- 2. Downscale to the target raster ---
        let size = self.config.target_size;
        let resized = imageops::resize(&cropped, size, size, FilterType::Triangle);

        // --- 3. Grayscale conversion ---
        let gray = imageops::grayscale(&resized);

        // --- 4. Local contrast enhancement ---
        let enhanced = clahe(&gray, self.config.clahe_clip_limit, self.config.clahe_grid_size);

        // --- 5. Edge-preserving smoothing ---
        let smoothed = bilateral_filter(
            &enhanced,
            self.config.bilateral_diameter,
            self.config.bilateral_sigma_color,
            self.config.bilateral_sigma_space,
        );

        // --- 6. Min-max normalization ---
        normalize_minmax(smoothed)
    }
}

impl Default for Stylizer {
    fn default() -> Self {
        Self::new(StylizerConfig::default())
    }
}

/// Crops a centered square of `floor(min(w, h) * factor)` pixels.
fn centered_crop(frame: &RgbImage, factor: f64) -> RgbImage {
    let (width, height) = frame.dimensions();
    let side = (width.min(height) as f64 * factor) as u32;
    let x = (width - side) / 2;
    let y = (height - side) / 2;
    imageops::crop_imm(frame, x, y, side, side).to_image()
}

/// Linearly rescales intensities to span the full [0, 255] range. An image
/// with zero variance is returned unchanged rather than dividing by zero.
fn normalize_minmax(image: GrayImage) -> GrayImage {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for pixel in image.pixels() {
        min = min.min(pixel[0]);
        max = max.max(pixel[0]);
    }
    if max <= min {
        return image;
    }

    let span = (max - min) as f64;
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let value = image.get_pixel(x, y)[0];
        Luma([((value - min) as f64 * 255.0 / span).round() as u8])
    })
}
