//! Bar-chart rendering of a histogram onto a small fixed-size overlay.
//!
//! Each bin gets three overlapping bars (red, green, blue) at 75 % opacity
//! on a black background. Bar height is the bin count relative to the
//! histogram's peak. Bins are `200 / 256` px wide, so bars straddle pixel
//! columns; partial coverage scales the bar's alpha like an anti-aliased
//! canvas fill.

use crate::image::{ImageBuffer, Pixel};
use crate::scopes::histogram::{BINS, HistogramData};

/// Overlay width in pixels.
pub const OVERLAY_WIDTH: u32 = 200;
/// Overlay height in pixels.
pub const OVERLAY_HEIGHT: u32 = 100;
/// Opacity of each channel's bar.
pub const BAR_OPACITY: f32 = 0.75;

const BAR_COLORS: [[f32; 3]; 3] = [[255.0, 0.0, 0.0], [0.0, 255.0, 0.0], [0.0, 0.0, 255.0]];

/// Render `histogram` as a 200×100 RGBA overlay.
pub fn render(histogram: &HistogramData) -> ImageBuffer {
    let width = OVERLAY_WIDTH as usize;
    let height = OVERLAY_HEIGHT as usize;
    let mut canvas = vec![[0.0_f32; 3]; width * height];

    if histogram.peak > 0 {
        let bar_width = OVERLAY_WIDTH as f32 / BINS as f32;
        let peak = histogram.peak as f32;

        for bin in 0..BINS {
            let x0 = bin as f32 * bar_width;
            let x1 = x0 + bar_width;

            for (channel, color) in BAR_COLORS.iter().enumerate() {
                let count = histogram.bins[channel][bin];
                if count == 0 {
                    continue;
                }
                let top = OVERLAY_HEIGHT as f32 * (1.0 - count as f32 / peak);
                fill_rect(&mut canvas, width, height, [x0, top, x1, OVERLAY_HEIGHT as f32], *color);
            }
        }
    }

    let pixels = canvas
        .into_iter()
        .map(|[r, g, b]| Pixel::from_channels(r, g, b, 255.0))
        .collect();

    // Dimensions are constants that match the canvas length.
    ImageBuffer::new(OVERLAY_WIDTH, OVERLAY_HEIGHT, pixels).unwrap_or_default()
}

/// Source-over composite of a solid rectangle `[x0, y0, x1, y1)` with
/// fractional edges.
fn fill_rect(canvas: &mut [[f32; 3]], width: usize, height: usize, rect: [f32; 4], color: [f32; 3]) {
    let [x0, y0, x1, y1] = rect;
    let col_start = x0.floor().max(0.0) as usize;
    let col_end = (x1.ceil() as usize).min(width);
    let row_start = y0.floor().max(0.0) as usize;
    let row_end = (y1.ceil() as usize).min(height);

    for col in col_start..col_end {
        let cover_x = x1.min(col as f32 + 1.0) - x0.max(col as f32);
        if cover_x <= 0.0 {
            continue;
        }
        for row in row_start..row_end {
            let cover_y = y1.min(row as f32 + 1.0) - y0.max(row as f32);
            if cover_y <= 0.0 {
                continue;
            }
            let alpha = BAR_OPACITY * cover_x * cover_y;
            let dst = &mut canvas[row * width + col];
            for c in 0..3 {
                dst[c] = dst[c] * (1.0 - alpha) + color[c] * alpha;
            }
        }
    }
}
