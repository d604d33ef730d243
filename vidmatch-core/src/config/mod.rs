//! Configuration structures and constants for the vidmatch-core library.
//!
//! This module provides the knobs of a comparison run: how sensitive keyframe
//! selection is, how fingerprints are quantized, and which score counts as a
//! duplicate candidate for the presentation layer.

mod builder;

use crate::error::{CoreError, CoreResult};
use crate::processing::histogram::{ChannelRange, HistogramSpec};

pub use builder::CompareConfigBuilder;

// Default constants

/// Default keyframe selection threshold.
/// Mean absolute grayscale difference (0-255 scale) a frame must exceed,
/// relative to the last selected frame, to be selected as a keyframe.
pub const DEFAULT_DIFF_THRESHOLD: f64 = 20.0;

/// Default number of histogram bins per color channel (8x8x8 = 512 bins).
pub const DEFAULT_HISTOGRAM_BINS: usize = 8;

/// Upper bound for bins per channel. A u8 channel cannot populate more.
pub const MAX_HISTOGRAM_BINS: usize = 256;

/// Default lower bound (inclusive) of each channel range.
pub const DEFAULT_CHANNEL_LOW: f32 = 0.0;

/// Default upper bound (exclusive) of each channel range.
pub const DEFAULT_CHANNEL_HIGH: f32 = 256.0;

/// Default similarity threshold. Pair scores at or below this value are
/// reported as duplicate candidates. Lower scores mean more similar videos.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;

/// Main configuration structure for a comparison run.
///
/// All fields have sensible defaults, so `CompareConfig::default()` matches
/// the reference behaviour (diff threshold 20, 8x8x8 bins over `[0, 256)`,
/// similarity threshold 0.3).
///
/// # Examples
///
/// ```rust
/// use vidmatch_core::config::CompareConfigBuilder;
///
/// let config = CompareConfigBuilder::new()
///     .diff_threshold(15.0)
///     .uniform_bins(16)
///     .similarity_threshold(0.25)
///     .build();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.histogram.len(), 16 * 16 * 16);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompareConfig {
    /// Mean absolute grayscale difference needed to select a new keyframe
    pub diff_threshold: f64,

    /// Histogram quantization used for every keyframe fingerprint
    pub histogram: HistogramSpec,

    /// Scores at or below this value are duplicate candidates
    pub similarity_threshold: f64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            diff_threshold: DEFAULT_DIFF_THRESHOLD,
            histogram: HistogramSpec::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl CompareConfig {
    /// Checks the configuration for programmer errors.
    ///
    /// Invalid values are rejected up front so a run never starts with a
    /// configuration that would make scores meaningless.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.diff_threshold.is_finite() || self.diff_threshold < 0.0 {
            return Err(CoreError::Config(format!(
                "diff threshold must be a non-negative number, got {}",
                self.diff_threshold
            )));
        }

        if !self.similarity_threshold.is_finite() || self.similarity_threshold < 0.0 {
            return Err(CoreError::Config(format!(
                "similarity threshold must be a non-negative number, got {}",
                self.similarity_threshold
            )));
        }

        for (channel, &bins) in self.histogram.bins.iter().enumerate() {
            if bins == 0 || bins > MAX_HISTOGRAM_BINS {
                return Err(CoreError::Config(format!(
                    "channel {channel}: bins must be between 1 and {MAX_HISTOGRAM_BINS}, got {bins}"
                )));
            }
        }

        for (channel, range) in self.histogram.ranges.iter().enumerate() {
            validate_range(channel, range)?;
        }

        Ok(())
    }
}

fn validate_range(channel: usize, range: &ChannelRange) -> CoreResult<()> {
    if !range.low.is_finite() || !range.high.is_finite() || range.low >= range.high {
        return Err(CoreError::Config(format!(
            "channel {channel}: range must satisfy low < high, got [{}, {})",
            range.low, range.high
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompareConfig::default();
        assert_eq!(config.diff_threshold, 20.0);
        assert_eq!(config.similarity_threshold, 0.3);
        assert_eq!(config.histogram.bins, [8, 8, 8]);
        assert_eq!(config.histogram.len(), 512);
        for range in config.histogram.ranges {
            assert_eq!(range.low, 0.0);
            assert_eq!(range.high, 256.0);
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_thresholds() {
        let mut config = CompareConfig::default();
        config.diff_threshold = -1.0;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        config.diff_threshold = f64::NAN;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        config.diff_threshold = 0.0;
        assert!(config.validate().is_ok());

        config.similarity_threshold = f64::INFINITY;
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_validate_histogram() {
        let mut config = CompareConfig::default();
        config.histogram.bins = [8, 0, 8];
        assert!(config.validate().is_err());

        config.histogram.bins = [8, 8, 257];
        assert!(config.validate().is_err());

        config.histogram.bins = [8, 8, 8];
        config.histogram.ranges[1] = ChannelRange::new(128.0, 128.0);
        assert!(config.validate().is_err());

        config.histogram.ranges[1] = ChannelRange::new(200.0, 100.0);
        assert!(config.validate().is_err());

        config.histogram.ranges[1] = ChannelRange::new(16.0, 236.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_HISTOGRAM_BINS.pow(3), 512);
        assert!(DEFAULT_CHANNEL_LOW < DEFAULT_CHANNEL_HIGH);
    }
}
