//! Digest tuning parameters

use crate::traits::SketchError;

/// Configuration for a [`Digest`](super::Digest)
///
/// Every tuning constant of the digest lives here rather than in a global, so
/// digests with different settings can coexist.
///
/// # Example
///
/// ```
/// use flowdigest::quantiles::{Digest, DigestConfig};
///
/// let config = DigestConfig::new(200.0).with_seed(7).with_size_slack(40.0);
/// let digest = Digest::with_config(config).unwrap();
/// assert_eq!(digest.compression(), 200.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DigestConfig {
    /// Size/accuracy tradeoff. Higher keeps more centroids.
    pub compression: f32,
    /// Divisor in the merge scale statistic `z = w * compression / (scale_factor * total)`
    pub scale_factor: f32,
    /// Centroids allowed beyond `compression` before recompression kicks in
    pub size_slack: f32,
    /// Multiplier applied to the scale factor on every recompression round
    pub recompression_growth: f32,
    /// Recompression rounds run at `recompression_growth` before the digest
    /// warns and escalates faster until the budget holds
    pub max_recompression_rounds: u32,
    /// Seed for the default shuffling generator
    pub seed: u64,
}

impl DigestConfig {
    pub const DEFAULT_COMPRESSION: f32 = 100.0;
    pub const DEFAULT_SCALE_FACTOR: f32 = core::f32::consts::PI;
    pub const DEFAULT_SIZE_SLACK: f32 = 20.0;
    pub const DEFAULT_RECOMPRESSION_GROWTH: f32 = 2.0;
    pub const DEFAULT_MAX_RECOMPRESSION_ROUNDS: u32 = 64;
    pub const DEFAULT_SEED: u64 = 0x5eed_d16e_57c0_ffee;

    /// Default configuration with the given compression
    pub fn new(compression: f32) -> Self {
        Self {
            compression,
            ..Self::default()
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_size_slack(mut self, size_slack: f32) -> Self {
        self.size_slack = size_slack;
        self
    }

    pub fn with_recompression_growth(mut self, growth: f32) -> Self {
        self.recompression_growth = growth;
        self
    }

    pub fn with_max_recompression_rounds(mut self, rounds: u32) -> Self {
        self.max_recompression_rounds = rounds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Largest centroid count tolerated once an insertion returns
    pub fn size_budget(&self) -> usize {
        (self.compression + self.size_slack) as usize
    }

    /// Check that every field is usable
    pub fn validate(&self) -> Result<(), SketchError> {
        if !(self.compression.is_finite() && self.compression > 0.0) {
            return Err(SketchError::InvalidConfig(
                "compression must be finite and positive",
            ));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(SketchError::InvalidConfig(
                "scale factor must be finite and positive",
            ));
        }
        if !(self.size_slack.is_finite() && self.size_slack >= 0.0) {
            return Err(SketchError::InvalidConfig(
                "size slack must be finite and non-negative",
            ));
        }
        // head and tail never merge, so fewer than three centroids is unreachable
        if self.size_budget() < 3 {
            return Err(SketchError::InvalidConfig(
                "compression plus size slack must allow at least three centroids",
            ));
        }
        if !(self.recompression_growth.is_finite() && self.recompression_growth > 1.0) {
            return Err(SketchError::InvalidConfig(
                "recompression growth must be finite and greater than 1",
            ));
        }
        if self.max_recompression_rounds == 0 {
            return Err(SketchError::InvalidConfig(
                "at least one recompression round is required",
            ));
        }
        Ok(())
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            compression: Self::DEFAULT_COMPRESSION,
            scale_factor: Self::DEFAULT_SCALE_FACTOR,
            size_slack: Self::DEFAULT_SIZE_SLACK,
            recompression_growth: Self::DEFAULT_RECOMPRESSION_GROWTH,
            max_recompression_rounds: Self::DEFAULT_MAX_RECOMPRESSION_ROUNDS,
            seed: Self::DEFAULT_SEED,
        }
    }
}
