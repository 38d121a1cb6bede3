//! # Flowdigest
//!
//! Streaming quantile estimation for Rust.
//!
//! Flowdigest ingests a stream of weighted samples and answers approximate
//! percentile queries without keeping the samples around. Samples are folded
//! into a small, mean-ordered sequence of weighted centroids that is kept fine
//! grained near the tails of the distribution and coarse around the median.
//!
//! ## Features
//!
//! - **Weighted Insertion**: every sample carries a positive weight
//! - **Tail Accuracy**: centroid size follows a `q(1 - q)` scale bound
//! - **Bounded Memory**: at most `compression + size_slack` centroids after
//!   every insertion, enforced by randomized recompression
//! - **Reproducible**: recompression shuffles with a seedable generator
//!
//! ## Quick Start
//!
//! ```rust
//! use flowdigest::prelude::*;
//!
//! let mut digest = Digest::new(100.0);
//! for latency_ms in [12.0, 15.0, 11.0, 240.0, 13.0] {
//!     digest.add(latency_ms, 1.0).unwrap();
//! }
//! println!("p99 latency: ~{}", digest.quantile(0.99).unwrap());
//! ```
//!
//! ## Errors
//!
//! Invalid input (non-finite values, non-positive weights, quantiles outside
//! `[0, 1]`) and queries against an empty digest return a
//! [`SketchError`](traits::SketchError). Nothing in the insert or query path
//! panics.
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support
//! - `serde`: Serialize and deserialize [`DigestConfig`](quantiles::DigestConfig)

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod traits;

pub mod quantiles;

pub mod prelude {
    pub use crate::quantiles::{Digest, DigestConfig};
    pub use crate::traits::*;
}

pub use quantiles::{Digest, DigestConfig};
pub use traits::SketchError;
