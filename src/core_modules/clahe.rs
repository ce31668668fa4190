// THEORY:
// Contrast-limited adaptive histogram equalization (CLAHE) is the local
// contrast stage of the stylizer. Plain histogram equalization computes one
// global remapping and washes out local detail; CLAHE instead divides the
// image into a grid of tiles, equalizes each tile independently, and blends
// the per-tile remappings so no tile boundary is visible in the output.
//
// Algorithm steps:
// 1.  **Tiling**: The image is split into `grid x grid` tiles with
//     proportional integer boundaries, so every tile is non-empty even when
//     the dimensions do not divide evenly.
// 2.  **Clipped Histograms**: Each tile's histogram is clipped at
//     `clip_limit` times the uniform bin level and the excess is
//     redistributed evenly across all bins. This bounds how much any single
//     intensity can be amplified, which keeps noise in flat regions from
//     exploding into contrast.
// 3.  **Per-Tile Lookup Tables**: The clipped histogram's CDF becomes a
//     256-entry remapping table for the tile.
// 4.  **Bilinear Blending**: Each output pixel applies the tables of the four
//     tiles whose centers surround it, weighted bilinearly by distance.
//     Pixels outside the outermost tile centers clamp to the edge tiles.

use image::{GrayImage, Luma};

const HISTOGRAM_BINS: usize = 256;

/// Applies contrast-limited adaptive histogram equalization over a
/// `grid x grid` tile layout. `clip_limit` is expressed relative to the
/// uniform histogram level, as in the common formulation (2.0 means "no bin
/// may exceed twice the average bin count").
pub fn clahe(image: &GrayImage, clip_limit: f64, grid: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    // A tile must be at least one pixel in each dimension.
    let grid = grid.clamp(1, width.min(height)) as usize;

    // --- 1. Tiling ---
    // Proportional boundaries: tile t spans [bounds[t], bounds[t+1]).
    let x_bounds: Vec<u32> = (0..=grid).map(|t| (t as u64 * width as u64 / grid as u64) as u32).collect();
    let y_bounds: Vec<u32> = (0..=grid).map(|t| (t as u64 * height as u64 / grid as u64) as u32).collect();

    // --- 2 & 3. Clipped histogram and lookup table per tile ---
    let mut luts: Vec<[u8; HISTOGRAM_BINS]> = Vec::with_capacity(grid * grid);
    let mut x_centers = vec![0.0f64; grid];
    let mut y_centers = vec![0.0f64; grid];

    for ty in 0..grid {
        for tx in 0..grid {
            let (x0, x1) = (x_bounds[tx], x_bounds[tx + 1]);
            let (y0, y1) = (y_bounds[ty], y_bounds[ty + 1]);
            x_centers[tx] = (x0 + x1) as f64 / 2.0;
            y_centers[ty] = (y0 + y1) as f64 / 2.0;

            let mut histogram = [0.0f64; HISTOGRAM_BINS];
            for y in y0..y1 {
                for x in x0..x1 {
                    histogram[image.get_pixel(x, y)[0] as usize] += 1.0;
                }
            }
            let area = ((x1 - x0) * (y1 - y0)) as f64;

            // Clip relative to the uniform level and spread the excess evenly.
            // Working in floats keeps the mapping independent of tile area, so
            // unevenly sized edge tiles agree on flat regions.
            let clip = clip_limit * area / HISTOGRAM_BINS as f64;
            let mut excess = 0.0;
            for bin in histogram.iter_mut() {
                if *bin > clip {
                    excess += *bin - clip;
                    *bin = clip;
                }
            }
            let redistribution = excess / HISTOGRAM_BINS as f64;

            let mut lut = [0u8; HISTOGRAM_BINS];
            let mut cdf = 0.0;
            for (value, bin) in histogram.iter().enumerate() {
                cdf += bin + redistribution;
                lut[value] = (cdf * 255.0 / area).round().clamp(0.0, 255.0) as u8;
            }
            luts.push(lut);
        }
    }

    // --- 4. Bilinear blending between tile mappings ---
    let mut output = GrayImage::new(width, height);
    for y in 0..height {
        let (ty0, ty1, wy) = interpolation_span(y as f64 + 0.5, &y_centers);
        for x in 0..width {
            let (tx0, tx1, wx) = interpolation_span(x as f64 + 0.5, &x_centers);
            let value = image.get_pixel(x, y)[0] as usize;

            let top = (1.0 - wx) * luts[ty0 * grid + tx0][value] as f64
                + wx * luts[ty0 * grid + tx1][value] as f64;
            let bottom = (1.0 - wx) * luts[ty1 * grid + tx0][value] as f64
                + wx * luts[ty1 * grid + tx1][value] as f64;
            let blended = (1.0 - wy) * top + wy * bottom;

            output.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
    }

    output
}

/// Finds the pair of neighboring tile centers bracketing `position` and the
/// interpolation weight toward the second one. Positions outside the
/// outermost centers clamp to the edge tile.
fn interpolation_span(position: f64, centers: &[f64]) -> (usize, usize, f64) {
    let last = centers.len() - 1;
    if position <= centers[0] {
        return (0, 0, 0.0);
    }
    if position >= centers[last] {
        return (last, last, 0.0);
    }
    let upper = centers.partition_point(|&c| c < position).min(last);
    let lower = upper - 1;
    let span = centers[upper] - centers[lower];
    let weight = if span > 0.0 { (position - centers[lower]) / span } else { 0.0 };
    (lower, upper, weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_dimensions() {
        let input = GrayImage::from_pixel(28, 28, Luma([90]));
        let output = clahe(&input, 2.0, 8);
        assert_eq!(output.dimensions(), (28, 28));
    }

    #[test]
    fn uniform_input_stays_uniform_and_does_not_panic() {
        let input = GrayImage::from_pixel(28, 28, Luma([200]));
        let output = clahe(&input, 2.0, 8);

        let first = output.get_pixel(0, 0)[0];
        assert!(output.pixels().all(|p| p[0] == first));
        // Clipping keeps the single-bin histogram close to an identity map.
        assert!((first as i32 - 200).unsigned_abs() < 10);
    }

    #[test]
    fn spreads_a_narrow_intensity_range() {
        // A faint gradient occupying [100, 120) should come out with far more
        // spread than it went in with.
        let input = GrayImage::from_fn(64, 64, |x, _| Luma([100 + (x % 20) as u8]));
        let output = clahe(&input, 2.0, 8);

        let min = output.pixels().map(|p| p[0]).min().unwrap();
        let max = output.pixels().map(|p| p[0]).max().unwrap();
        // The clip limit caps the gain, but the 20-level input range must
        // still come out meaningfully wider than it went in.
        assert!(max - min > 25, "expected contrast expansion, got {min}..{max}");
    }

    #[test]
    fn handles_images_smaller_than_the_grid() {
        let input = GrayImage::from_pixel(5, 5, Luma([10]));
        let output = clahe(&input, 2.0, 8);
        assert_eq!(output.dimensions(), (5, 5));
    }
}
