// SPDX-License-Identifier: MIT
//
// Contrast-limited adaptive histogram equalization for single-channel images.
//
// The image is divided into a grid of tiles. Each tile gets its own clipped,
// redistributed histogram and the mapping it implies; output pixels blend the
// mappings of the four nearest tiles bilinearly, which hides the tile seams.

use image::{GrayImage, Luma};
use pupilkit_core::error::{PupilkitError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const HIST_BINS: usize = 256;

/// CLAHE configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClaheOptions {
    /// Contrast limit: per-tile histogram bins are clipped at
    /// `clip_limit * tile_area / 256` and the excess is redistributed evenly.
    /// Values of zero or below disable clipping (plain adaptive equalization).
    pub clip_limit: f64,
    /// Number of tiles along the horizontal and vertical axes.
    pub tile_grid_size: (u32, u32),
}

impl Default for ClaheOptions {
    fn default() -> Self {
        Self {
            clip_limit: 40.0,
            tile_grid_size: (8, 8),
        }
    }
}

/// Equalize a grayscale image with the contrast-limited adaptive method.
pub fn clahe(gray: &GrayImage, options: &ClaheOptions) -> Result<GrayImage> {
    let (grid_x, grid_y) = options.tile_grid_size;
    if grid_x == 0 || grid_y == 0 {
        return Err(PupilkitError::InvalidParameter(
            "CLAHE tile grid must have at least one tile per axis".to_string(),
        ));
    }
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Err(PupilkitError::InvalidParameter(
            "cannot equalize a zero-sized image".to_string(),
        ));
    }

    // Never use more tiles than there are pixel rows or columns.
    let grid_x = grid_x.min(width);
    let grid_y = grid_y.min(height);
    debug!(grid_x, grid_y, width, height, "Computing tile mappings");

    let luts = tile_mappings(gray, grid_x, grid_y, options.clip_limit);

    // Blend the four surrounding tile mappings per pixel. Coordinates are
    // expressed in tile-index space with the origin at the first tile center.
    let mut output = GrayImage::new(width, height);
    for y in 0..height {
        let fy = ((y as f64 + 0.5) * grid_y as f64 / height as f64 - 0.5)
            .clamp(0.0, (grid_y - 1) as f64);
        let ty0 = fy.floor() as u32;
        let ty1 = (ty0 + 1).min(grid_y - 1);
        let wy = fy - ty0 as f64;

        for x in 0..width {
            let fx = ((x as f64 + 0.5) * grid_x as f64 / width as f64 - 0.5)
                .clamp(0.0, (grid_x - 1) as f64);
            let tx0 = fx.floor() as u32;
            let tx1 = (tx0 + 1).min(grid_x - 1);
            let wx = fx - tx0 as f64;

            let level = gray.get_pixel(x, y).0[0] as usize;
            let top = lerp(
                luts[(ty0 * grid_x + tx0) as usize][level] as f64,
                luts[(ty0 * grid_x + tx1) as usize][level] as f64,
                wx,
            );
            let bottom = lerp(
                luts[(ty1 * grid_x + tx0) as usize][level] as f64,
                luts[(ty1 * grid_x + tx1) as usize][level] as f64,
                wx,
            );
            let blended = lerp(top, bottom, wy).round().clamp(0.0, 255.0) as u8;
            output.put_pixel(x, y, Luma([blended]));
        }
    }

    Ok(output)
}

/// Build the per-tile level mappings. Tile bounds are distributed evenly so
/// every tile is non-empty; each mapping is the scaled cumulative histogram
/// of its tile after clipping.
fn tile_mappings(gray: &GrayImage, grid_x: u32, grid_y: u32, clip_limit: f64) -> Vec<[u8; HIST_BINS]> {
    let (width, height) = gray.dimensions();
    let mut luts = vec![[0u8; HIST_BINS]; (grid_x * grid_y) as usize];

    for ty in 0..grid_y {
        let y0 = ty * height / grid_y;
        let y1 = (ty + 1) * height / grid_y;
        for tx in 0..grid_x {
            let x0 = tx * width / grid_x;
            let x1 = (tx + 1) * width / grid_x;

            let mut histogram = [0u32; HIST_BINS];
            for y in y0..y1 {
                for x in x0..x1 {
                    histogram[gray.get_pixel(x, y).0[0] as usize] += 1;
                }
            }

            let area = ((x1 - x0) * (y1 - y0)) as f64;
            if clip_limit > 0.0 {
                let limit = ((clip_limit * area / HIST_BINS as f64) as u32).max(1);
                clip_histogram(&mut histogram, limit);
            }

            let scale = 255.0 / area;
            let lut = &mut luts[(ty * grid_x + tx) as usize];
            let mut cumulative = 0u64;
            for (level, &count) in histogram.iter().enumerate() {
                cumulative += count as u64;
                lut[level] = (cumulative as f64 * scale).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    luts
}

/// Clip histogram bins at `limit` and spread the excess evenly over all bins,
/// putting any remainder in the lowest bins.
fn clip_histogram(histogram: &mut [u32; HIST_BINS], limit: u32) {
    let mut excess = 0u64;
    for bin in histogram.iter_mut() {
        if *bin > limit {
            excess += (*bin - limit) as u64;
            *bin = limit;
        }
    }

    let per_bin = (excess / HIST_BINS as u64) as u32;
    let remainder = (excess % HIST_BINS as u64) as usize;
    for bin in histogram.iter_mut() {
        *bin += per_bin;
    }
    for bin in histogram.iter_mut().take(remainder) {
        *bin += 1;
    }
}

fn lerp(a: f64, b: f64, w: f64) -> f64 {
    a * (1.0 - w) + b * w
}
