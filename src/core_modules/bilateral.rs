// THEORY:
// The bilateral filter is the edge-preserving smoothing stage of the stylizer.
// A plain Gaussian blur would soften the hand outline along with the sensor
// noise; the bilateral filter weights each neighbor by *two* Gaussians — one
// over spatial distance and one over intensity difference — so pixels across
// a hard edge contribute almost nothing and the edge survives while flat
// regions are averaged clean.
//
// The spatial kernel depends only on the window geometry, so it is computed
// once up front. The range weights depend on the 256 possible intensity
// differences and are also precomputed as a table.

use image::{GrayImage, Luma};

/// Applies an edge-preserving bilateral filter. `diameter` is the full
/// neighborhood width in pixels (7 means a 3-pixel radius); `sigma_color`
/// controls how quickly influence falls off with intensity difference and
/// `sigma_space` with distance. Borders are handled by clamping coordinates.
pub fn bilateral_filter(
    image: &GrayImage,
    diameter: u32,
    sigma_color: f64,
    sigma_space: f64,
) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let radius = (diameter / 2) as i64;
    let side = (2 * radius + 1) as usize;

    // Precompute the spatial Gaussian over the window.
    let space_denominator = 2.0 * sigma_space * sigma_space;
    let mut spatial = vec![0.0f64; side * side];
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let index = ((dy + radius) as usize) * side + (dx + radius) as usize;
            spatial[index] = (-((dx * dx + dy * dy) as f64) / space_denominator).exp();
        }
    }

    // Precompute the range Gaussian for every possible intensity difference.
    let color_denominator = 2.0 * sigma_color * sigma_color;
    let mut range = [0.0f64; 256];
    for (difference, weight) in range.iter_mut().enumerate() {
        *weight = (-((difference * difference) as f64) / color_denominator).exp();
    }

    let mut output = GrayImage::new(width, height);
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let center = image.get_pixel(x as u32, y as u32)[0];

            let mut weighted_sum = 0.0;
            let mut weight_total = 0.0;
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let nx = (x + dx).clamp(0, width as i64 - 1) as u32;
                    let ny = (y + dy).clamp(0, height as i64 - 1) as u32;
                    let neighbor = image.get_pixel(nx, ny)[0];

                    let spatial_index = ((dy + radius) as usize) * side + (dx + radius) as usize;
                    let difference = center.abs_diff(neighbor) as usize;
                    let weight = spatial[spatial_index] * range[difference];

                    weighted_sum += weight * neighbor as f64;
                    weight_total += weight;
                }
            }

            let value = (weighted_sum / weight_total).round().clamp(0.0, 255.0) as u8;
            output.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }

    output
}
