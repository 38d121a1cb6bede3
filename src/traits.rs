//! Core traits for streaming sketches
//!
//! The digest implements the base [`Sketch`] trait plus the specialized
//! [`QuantileSketch`] trait for weighted percentile estimation.

use core::fmt::Debug;

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Error returned by sketch operations
///
/// Every variant describes a local, recoverable condition. Growing past the
/// size budget is not an error: the digest recompresses instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SketchError {
    /// Value is NaN or infinite
    NonFiniteValue(f32),
    /// Weight is zero, negative, or not finite
    InvalidWeight(f32),
    /// Requested quantile is outside `[0, 1]` (or NaN)
    QuantileOutOfRange(f32),
    /// Query against a sketch that has not ingested anything
    Empty,
    /// Configuration rejected at construction time
    InvalidConfig(&'static str),
}

impl core::fmt::Display for SketchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SketchError::NonFiniteValue(v) => write!(f, "value must be finite, got {}", v),
            SketchError::InvalidWeight(w) => {
                write!(f, "weight must be finite and positive, got {}", w)
            }
            SketchError::QuantileOutOfRange(q) => {
                write!(f, "quantile must be within [0, 1], got {}", q)
            }
            SketchError::Empty => write!(f, "sketch is empty"),
            SketchError::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SketchError {}

/// Core trait for all streaming sketches
pub trait Sketch: Clone + Debug {
    /// The type of item this sketch processes
    type Item: ?Sized;

    /// Add an item to the sketch with unit weight
    fn update(&mut self, item: &Self::Item) -> Result<(), SketchError>;

    /// Reset sketch to empty state
    fn clear(&mut self);

    /// Memory usage in bytes
    fn size_bytes(&self) -> usize;

    /// Number of items processed
    fn count(&self) -> u64;

    /// Check if sketch is empty
    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Weighted quantile estimation sketches
pub trait QuantileSketch: Sketch {
    /// The value type being tracked
    type Value: PartialOrd + Copy;

    /// Add a value carrying the given weight
    ///
    /// The weight must be finite and strictly positive.
    fn add(&mut self, value: Self::Value, weight: f32) -> Result<(), SketchError>;

    /// Get the approximate value at quantile `q` (0.0 to 1.0)
    ///
    /// q=0.5 returns the median. Fails with [`SketchError::Empty`] before the
    /// first insertion.
    #[doc(alias = "percentile")]
    fn quantile(&self, q: f32) -> Result<Self::Value, SketchError>;

    /// Get maximum value seen
    fn max(&self) -> Option<Self::Value>;

    /// Get median (50th percentile)
    fn median(&self) -> Result<Self::Value, SketchError> {
        self.quantile(0.5)
    }

    /// Get multiple quantiles at once, failing on the first invalid request
    fn quantiles(&self, qs: &[f32]) -> Result<Vec<Self::Value>, SketchError> {
        qs.iter().map(|&q| self.quantile(q)).collect()
    }
}
