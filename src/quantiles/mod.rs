//! Quantile estimation
//!
//! This module provides a streaming quantile sketch built on a linked,
//! mean-ordered sequence of weighted centroids.
//!
//! # Algorithms
//!
//! - [`Digest`]: t-digest style sketch with online neighbour merging and
//!   randomized recompression; accurate at the extremes
//!
//! # Example
//!
//! ```
//! use flowdigest::quantiles::Digest;
//! use flowdigest::traits::QuantileSketch;
//!
//! let mut digest = Digest::new(100.0);
//!
//! for value in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0] {
//!     digest.add(value, 1.0).unwrap();
//! }
//!
//! let median = digest.median().unwrap();
//! println!("Median: {}", median);
//!
//! // Inspect the centroids from either end
//! for centroid in digest.iter().rev() {
//!     println!("{}", centroid);
//! }
//! ```

mod centroid;
mod config;
mod digest;

pub use centroid::{Centroid, Iter};
pub use config::DigestConfig;
pub use digest::Digest;
