// ============================================================================
// vidmatch-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CompareConfig
//
// Fluent construction of CompareConfig. Values are not checked here; call
// CompareConfig::validate (or start a run, which validates) to reject
// invalid combinations.

use super::CompareConfig;
use crate::processing::histogram::{ChannelRange, HistogramSpec};

/// Builder for creating CompareConfig instances.
///
/// # Examples
///
/// ```rust
/// use vidmatch_core::config::CompareConfigBuilder;
/// use vidmatch_core::processing::histogram::ChannelRange;
///
/// let config = CompareConfigBuilder::new()
///     .bins([4, 8, 8])
///     .channel_range(0, ChannelRange::new(0.0, 128.0))
///     .build();
/// assert_eq!(config.histogram.len(), 256);
/// ```
#[derive(Debug, Clone)]
pub struct CompareConfigBuilder {
    diff_threshold: f64,
    bins: [usize; 3],
    ranges: [ChannelRange; 3],
    similarity_threshold: f64,
}

impl Default for CompareConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompareConfigBuilder {
    /// Creates a new builder seeded with the default configuration.
    pub fn new() -> Self {
        let defaults = CompareConfig::default();
        Self {
            diff_threshold: defaults.diff_threshold,
            bins: defaults.histogram.bins,
            ranges: defaults.histogram.ranges,
            similarity_threshold: defaults.similarity_threshold,
        }
    }

    /// Sets the keyframe selection threshold (0-255 grayscale scale).
    pub fn diff_threshold(mut self, threshold: f64) -> Self {
        self.diff_threshold = threshold;
        self
    }

    /// Sets the number of bins for each channel individually.
    pub fn bins(mut self, bins: [usize; 3]) -> Self {
        self.bins = bins;
        self
    }

    /// Uses the same number of bins for all three channels.
    pub fn uniform_bins(mut self, bins: usize) -> Self {
        self.bins = [bins; 3];
        self
    }

    /// Sets the value range of one channel (0, 1 or 2).
    ///
    /// Out-of-range channel indices are ignored.
    pub fn channel_range(mut self, channel: usize, range: ChannelRange) -> Self {
        if let Some(slot) = self.ranges.get_mut(channel) {
            *slot = range;
        }
        self
    }

    /// Sets the score at or below which a pair counts as a candidate.
    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Builds the CompareConfig.
    pub fn build(self) -> CompareConfig {
        CompareConfig {
            diff_threshold: self.diff_threshold,
            histogram: HistogramSpec {
                bins: self.bins,
                ranges: self.ranges,
            },
            similarity_threshold: self.similarity_threshold,
        }
    }
}
