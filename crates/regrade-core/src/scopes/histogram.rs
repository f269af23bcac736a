//! RGB + luminance histogram computation.

use serde::{Deserialize, Serialize};

use crate::image::ImageBuffer;

/// Bins per channel. Equal to the 8-bit value range, so a channel value is
/// its own bin index.
pub const BINS: usize = 256;

/// Channel selector for [`HistogramData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
    /// `(max + min) / 2` of the RGB channels. Computed but not drawn.
    Luma = 3,
}

/// Histogram data for R, G, B, and luminance channels (256 bins each).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramData {
    /// Bin counts for `[R, G, B, Luma]` channels. Each `Vec` has 256 entries.
    pub bins: [Vec<u32>; 4],
    /// Largest single bin across R, G and B (for normalization).
    pub peak: u32,
}

impl HistogramData {
    /// Count every pixel of `image` into per-channel bins.
    ///
    /// Sequential single pass. Returns `None` for a zero-sized image.
    pub fn compute(image: &ImageBuffer) -> Option<Self> {
        if image.is_empty() {
            return None;
        }

        let mut bins: [Vec<u32>; 4] = std::array::from_fn(|_| vec![0u32; BINS]);

        for px in image.pixels() {
            bins[0][px.r as usize] += 1;
            bins[1][px.g as usize] += 1;
            bins[2][px.b as usize] += 1;

            let max = px.r.max(px.g).max(px.b) as usize;
            let min = px.r.min(px.g).min(px.b) as usize;
            bins[3][(max + min) / 2] += 1;
        }

        let peak = bins[..3]
            .iter()
            .flat_map(|channel| channel.iter().copied())
            .max()
            .unwrap_or(0);

        Some(Self { bins, peak })
    }

    pub fn channel(&self, channel: Channel) -> &[u32] {
        &self.bins[channel as usize]
    }

    /// Sum of one channel's bins. Equals the pixel count of the source.
    pub fn total(&self, channel: Channel) -> u64 {
        self.channel(channel).iter().map(|&n| u64::from(n)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Pixel;

    fn primaries() -> ImageBuffer {
        ImageBuffer::new(
            2,
            2,
            vec![
                Pixel::new(255, 0, 0, 255),
                Pixel::new(0, 255, 0, 255),
                Pixel::new(0, 0, 255, 255),
                Pixel::new(255, 255, 255, 255),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_histogram_empty_image() {
        assert!(HistogramData::compute(&ImageBuffer::empty()).is_none());
    }

    #[test]
    fn test_histogram_primaries() {
        let hist = HistogramData::compute(&primaries()).unwrap();
        for channel in [Channel::Red, Channel::Green, Channel::Blue] {
            let bins = hist.channel(channel);
            assert_eq!(bins[255], 2, "{channel:?}");
            assert_eq!(bins[0], 2, "{channel:?}");
            assert_eq!(hist.total(channel), 4);
        }
        assert_eq!(hist.peak, 2);
    }

    #[test]
    fn test_histogram_luma_bins() {
        let hist = HistogramData::compute(&primaries()).unwrap();
        let luma = hist.channel(Channel::Luma);
        // Saturated primaries sit at (255 + 0) / 2, white at 255.
        assert_eq!(luma[127], 3);
        assert_eq!(luma[255], 1);
        assert_eq!(hist.total(Channel::Luma), 4);
    }

    #[test]
    fn test_histogram_totals_match_pixel_count() {
        let pixels = (0..(37 * 11))
            .map(|i| Pixel::new((i * 7 % 256) as u8, (i * 13 % 256) as u8, (i % 256) as u8, 255))
            .collect();
        let image = ImageBuffer::new(37, 11, pixels).unwrap();
        let hist = HistogramData::compute(&image).unwrap();
        for channel in [Channel::Red, Channel::Green, Channel::Blue, Channel::Luma] {
            assert_eq!(hist.total(channel), 37 * 11);
        }
    }

    #[test]
    fn test_peak_ignores_luma() {
        // Three pixels share luma 127 but no RGB bin holds more than two.
        let image = ImageBuffer::new(
            3,
            1,
            vec![
                Pixel::new(254, 0, 0, 255),
                Pixel::new(0, 254, 0, 255),
                Pixel::new(0, 0, 254, 255),
            ],
        )
        .unwrap();
        let hist = HistogramData::compute(&image).unwrap();
        assert_eq!(hist.channel(Channel::Luma)[127], 3);
        assert_eq!(hist.peak, 2);
    }
}
