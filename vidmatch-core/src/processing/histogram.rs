//! Color-histogram fingerprints and the Bhattacharyya distance between them.
//!
//! A fingerprint is a joint 3-D histogram over the three color channels of a
//! keyframe, flattened into one vector with channel 0 varying slowest. Counts
//! are kept un-normalized; the distance normalizes by the histogram totals.

use image::RgbImage;
use serde::Serialize;

use crate::config::{DEFAULT_CHANNEL_HIGH, DEFAULT_CHANNEL_LOW, DEFAULT_HISTOGRAM_BINS};

/// Half-open value range `[low, high)` of one color channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelRange {
    pub low: f32,
    pub high: f32,
}

impl ChannelRange {
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    /// Maps a channel value to its bucket, or `None` when it falls outside
    /// the range.
    #[inline]
    fn bucket(&self, value: u8, bins: usize) -> Option<usize> {
        let value = f32::from(value);
        if value < self.low || value >= self.high {
            return None;
        }
        let scaled = (value - self.low) * bins as f32 / (self.high - self.low);
        Some((scaled as usize).min(bins - 1))
    }
}

impl Default for ChannelRange {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_LOW, DEFAULT_CHANNEL_HIGH)
    }
}

/// Quantization layout shared by every fingerprint of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSpec {
    pub bins: [usize; 3],
    pub ranges: [ChannelRange; 3],
}

impl Default for HistogramSpec {
    fn default() -> Self {
        Self {
            bins: [DEFAULT_HISTOGRAM_BINS; 3],
            ranges: [ChannelRange::default(); 3],
        }
    }
}

impl HistogramSpec {
    /// Length of a fingerprint vector: the product of the per-channel bins.
    pub fn len(&self) -> usize {
        self.bins.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Histogram fingerprint of a single keyframe. Immutable once computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    bins: Vec<f32>,
}

impl Fingerprint {
    /// Computes the joint color histogram of `frame`.
    pub fn from_frame(frame: &RgbImage, spec: &HistogramSpec) -> Self {
        let [b0, b1, b2] = spec.bins;
        let mut bins = vec![0.0f32; spec.len()];

        for pixel in frame.pixels() {
            let [c0, c1, c2] = pixel.0;
            let (Some(i0), Some(i1), Some(i2)) = (
                spec.ranges[0].bucket(c0, b0),
                spec.ranges[1].bucket(c1, b1),
                spec.ranges[2].bucket(c2, b2),
            ) else {
                continue;
            };
            bins[(i0 * b1 + i1) * b2 + i2] += 1.0;
        }

        Self { bins }
    }

    /// Wraps precomputed bin counts.
    pub fn from_bins(bins: Vec<f32>) -> Self {
        Self { bins }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Sum of all bin counts.
    pub fn total(&self) -> f64 {
        self.bins.iter().map(|&v| f64::from(v)).sum()
    }

    /// Bhattacharyya distance to `other`, in `[0, 1]`.
    ///
    /// `sqrt(1 - Σ sqrt(h1·h2) / sqrt(Σh1 · Σh2))`, clamped at zero. When the
    /// product of the totals is ~0 the normalizer is taken as 1, so two empty
    /// histograms are at distance 1.
    pub fn bhattacharyya(&self, other: &Fingerprint) -> f64 {
        debug_assert_eq!(self.len(), other.len(), "fingerprint lengths differ");

        let mut overlap = 0.0f64;
        let mut total_a = 0.0f64;
        let mut total_b = 0.0f64;
        for (&a, &b) in self.bins.iter().zip(other.bins.iter()) {
            let a = f64::from(a);
            let b = f64::from(b);
            overlap += (a * b).sqrt();
            total_a += a;
            total_b += b;
        }

        let product = total_a * total_b;
        let scale = if product.abs() > f64::from(f32::EPSILON) {
            1.0 / product.sqrt()
        } else {
            1.0
        };

        (1.0 - overlap * scale).max(0.0).sqrt()
    }
}
