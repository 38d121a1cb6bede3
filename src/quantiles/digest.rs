//! Linked centroid digest
//!
//! A streaming quantile estimator in the t-digest family. Samples are folded
//! into a mean-ordered sequence of weighted centroids as they arrive. Each
//! insertion runs one left-to-right sweep that merges adjacent centroids while
//! their combined weight stays under a `q(1 - q)` scale bound, so centroids
//! stay small near the tails and grow near the median.
//!
//! When the sequence outgrows `compression + size_slack` centroids, the digest
//! recompresses: it replays a shuffled snapshot of its own centroids under an
//! inflated scale factor, escalating the factor until the budget holds.
//!
//! # Thread Safety
//!
//! `Digest` has no interior mutability. Insertions take `&mut self` and
//! transiently break the ordering invariant while splicing, so concurrent use
//! needs external locking, e.g. `Arc<Mutex<Digest>>`.

use super::centroid::{Centroid, CentroidList, Iter};
use super::config::DigestConfig;
use crate::traits::{QuantileSketch, Sketch, SketchError};
use core::fmt::Debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

/// Scale factor growth once the configured recompression rounds are spent.
/// Doubling from any finite factor overflows to infinity within a few hundred
/// rounds.
const ESCALATED_GROWTH: f32 = 2.0;

/// Linked centroid quantile digest
///
/// # Compression Parameter
///
/// The compression parameter controls the tradeoff between accuracy and memory:
/// - Higher compression = more centroids = better accuracy = more memory
/// - The digest never holds more than `compression + size_slack` centroids
///   once an insertion returns
/// - Default: 100
///
/// # Randomness
///
/// Recompression shuffles the replay order with the generator `R`. The default
/// `SmallRng` is seeded from [`DigestConfig::seed`], so identical inputs build
/// identical digests.
///
/// # Example
///
/// ```
/// use flowdigest::quantiles::Digest;
/// use flowdigest::traits::QuantileSketch;
///
/// let mut digest = Digest::new(100.0);
///
/// for i in 1..=1000 {
///     digest.add(i as f32, 1.0).unwrap();
/// }
///
/// let p50 = digest.quantile(0.5).unwrap();
/// let p99 = digest.quantile(0.99).unwrap();
/// assert!(p50 > 450.0 && p50 < 550.0);
/// assert!(p99 > 950.0);
/// ```
#[derive(Clone, Debug)]
pub struct Digest<R = SmallRng> {
    config: DigestConfig,
    centroids: CentroidList,
    /// Sum of every accepted weight
    total_weight: f32,
    /// Largest value seen, NEG_INFINITY while empty
    max: f32,
    /// Number of accepted insertions
    count: u64,
    rng: R,
}

impl Digest<SmallRng> {
    /// Create a new digest with the given compression parameter
    ///
    /// # Panics
    ///
    /// Panics if `compression` is not finite or not positive.
    pub fn new(compression: f32) -> Self {
        assert!(
            compression.is_finite() && compression > 0.0,
            "compression must be finite and positive, got {}",
            compression
        );

        let config = DigestConfig::new(compression);
        Self::from_parts(config, SmallRng::seed_from_u64(config.seed))
    }

    /// Create a digest from a full configuration
    pub fn with_config(config: DigestConfig) -> Result<Self, SketchError> {
        Self::with_rng(config, SmallRng::seed_from_u64(config.seed))
    }
}

impl<R> Digest<R> {
    fn from_parts(config: DigestConfig, rng: R) -> Self {
        Self {
            config,
            centroids: CentroidList::with_capacity(config.size_budget() + 1),
            total_weight: 0.0,
            max: f32::NEG_INFINITY,
            count: 0,
            rng,
        }
    }

    /// Get the compression parameter
    pub fn compression(&self) -> f32 {
        self.config.compression
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Sum of the weights of every accepted insertion
    pub fn total_weight(&self) -> f32 {
        self.total_weight
    }

    /// Number of live centroids
    pub fn size(&self) -> usize {
        self.centroids.len()
    }

    /// Centroids in ascending mean order.
    ///
    /// Use `.rev()` to walk from the tail.
    pub fn iter(&self) -> Iter<'_> {
        self.centroids.iter()
    }
}

impl<R: Rng> Digest<R> {
    /// Create a digest that shuffles recompression replays with `rng`
    pub fn with_rng(config: DigestConfig, rng: R) -> Result<Self, SketchError> {
        config.validate()?;
        Ok(Self::from_parts(config, rng))
    }

    /// Insert a sample, then estimate quantile `q` on the settled digest.
    ///
    /// The estimate is taken after any recompression triggered by the
    /// insertion. An out-of-range `q` is rejected before anything is inserted.
    pub fn add_and_quantile(
        &mut self,
        value: f32,
        weight: f32,
        q: f32,
    ) -> Result<f32, SketchError> {
        check_quantile(q)?;
        self.push(value, weight)?;
        self.percentile(q)
    }

    fn push(&mut self, value: f32, weight: f32) -> Result<(), SketchError> {
        if !value.is_finite() {
            return Err(SketchError::NonFiniteValue(value));
        }
        if !(weight.is_finite() && weight > 0.0) {
            return Err(SketchError::InvalidWeight(weight));
        }

        self.insert(Centroid::new(value, weight), self.config.scale_factor);
        self.count += 1;
        self.enforce_size_budget();
        Ok(())
    }

    /// Place `incoming` and run one merge sweep under `scale_factor`.
    ///
    /// Never triggers recompression, so the replay can call it.
    fn insert(&mut self, incoming: Centroid, scale_factor: f32) {
        let value = incoming.mean;
        self.total_weight += incoming.weight;

        let head_mean = self.centroids.head_centroid().map(|c| c.mean);
        let tail_mean = self.centroids.tail_centroid().map(|c| c.mean);
        let pending = match (head_mean, tail_mean) {
            (None, _) => {
                self.centroids.push_back(incoming);
                None
            }
            (Some(head), _) if value < head => {
                self.centroids.push_front(incoming);
                None
            }
            (_, Some(tail)) if value > tail => {
                self.centroids.push_back(incoming);
                None
            }
            _ => Some(incoming),
        };

        // Not spliced during the sweep: no centroid has a larger mean.
        if let Some(centroid) = self.sweep(pending, scale_factor) {
            self.centroids.push_back(centroid);
        }

        self.max = self.max.max(value);
    }

    /// Walk adjacent pairs from the head, splicing `pending` at its ordered
    /// position and merging pairs that satisfy the scale bound. Returns the
    /// centroid if it was never spliced.
    fn sweep(&mut self, mut pending: Option<Centroid>, scale_factor: f32) -> Option<Centroid> {
        let total = self.total_weight;
        let denominator = scale_factor * total;
        if !(denominator > 0.0) {
            return pending;
        }
        let normalizer = self.config.compression / denominator;

        let mut weight_so_far = 0.0_f32;
        let mut cursor = self.centroids.head();
        while let Some(node) = cursor {
            let Some(mut next) = self.centroids.next(node) else {
                break;
            };

            if let Some(centroid) = pending {
                if self.centroids.get(next).mean > centroid.mean {
                    next = self.centroids.insert_after(node, centroid);
                    pending = None;
                }
            }

            let node_weight = self.centroids.get(node).weight;
            let proposed = node_weight + self.centroids.get(next).weight;

            if within_scale_bound(weight_so_far, proposed, total, normalizer) {
                // stay on `node`: the merge may cascade into the new neighbour
                self.centroids.merge_next(node);
            } else {
                weight_so_far += node_weight;
                cursor = Some(next);
            }
        }

        pending
    }

    fn enforce_size_budget(&mut self) {
        let budget = self.config.size_budget();
        if self.centroids.len() <= budget {
            return;
        }

        debug!(
            centroids = self.centroids.len(),
            budget, "Centroid budget exceeded, recompressing."
        );

        let rounds = self.config.max_recompression_rounds;
        let mut growth = self.config.recompression_growth;
        let mut scale_factor = self.config.scale_factor;
        let mut round = 0u32;
        loop {
            round = round.saturating_add(1);
            if round == rounds.saturating_add(1) {
                warn!(
                    centroids = self.centroids.len(),
                    budget, rounds, "Recompression round limit reached, escalating faster."
                );
                growth = growth.max(ESCALATED_GROWTH);
            }

            scale_factor *= growth;
            self.recompress(scale_factor);

            trace!(
                round,
                scale_factor,
                centroids = self.centroids.len(),
                "Recompression round finished."
            );

            // An infinite scale factor zeroes the scale statistic, so every
            // pair merges and the replay ends with a single centroid.
            if self.centroids.len() <= budget {
                return;
            }
        }
    }

    /// Rebuild the sequence by replaying a shuffled snapshot of it.
    ///
    /// A larger `scale_factor` shrinks the scale statistic, so more pairs pass
    /// the merge bound than during regular insertion.
    fn recompress(&mut self, scale_factor: f32) {
        let mut snapshot = self.centroids.snapshot();
        snapshot.shuffle(&mut self.rng);

        let total_weight = self.total_weight;
        let max = self.max;

        self.centroids.clear();
        self.total_weight = 0.0;
        self.max = f32::NEG_INFINITY;

        for centroid in snapshot {
            self.insert(centroid, scale_factor);
        }

        // the replay sums weights in shuffled order; keep the exact running total
        self.total_weight = total_weight;
        self.max = max;
    }
}

impl<R> Digest<R> {
    /// Percentile interpolation over half-weight centred centroids.
    ///
    /// Centroid `i` sits at rank `w_0 + .. + w_{i-1} + w_i / 2`. Between two
    /// midpoints the value is interpolated linearly. Before the head midpoint
    /// the first segment is extended downwards; after the tail midpoint the
    /// tail mean is interpolated toward `max`, reached at `total_weight`.
    fn percentile(&self, q: f32) -> Result<f32, SketchError> {
        check_quantile(q)?;
        let Some(head) = self.centroids.head() else {
            return Err(SketchError::Empty);
        };

        let index = q * self.total_weight;
        let mut node = head;
        let mut weight_so_far = self.centroids.get(head).weight / 2.0;

        while let Some(next) = self.centroids.next(node) {
            let left = self.centroids.get(node);
            let right = self.centroids.get(next);
            let gap = (left.weight + right.weight) / 2.0;

            if weight_so_far + gap > index {
                return Ok(interpolate(left.mean, right.mean, index - weight_so_far, gap));
            }

            weight_so_far += gap;
            node = next;
        }

        let last = self.centroids.get(node);
        let offset = (index - weight_so_far).max(0.0);
        Ok(interpolate(last.mean, self.max, offset, last.weight / 2.0))
    }
}

/// Merge eligibility: `z^2 <= q(1 - q)` at both ends of the merged span.
#[inline]
fn within_scale_bound(weight_so_far: f32, proposed: f32, total: f32, normalizer: f32) -> bool {
    let z = proposed * normalizer;
    let z2 = z * z;
    let q0 = weight_so_far / total;
    let q2 = (weight_so_far + proposed) / total;
    z2 <= q0 * (1.0 - q0) && z2 <= q2 * (1.0 - q2)
}

/// Linear interpolation from `from` to `to` over `span` rank units.
///
/// Capped at `to` so rounding never overshoots the next anchor, and at
/// `f32::MIN` when the downward extension leaves the float range.
#[inline]
fn interpolate(from: f32, to: f32, offset: f32, span: f32) -> f32 {
    if !(span > 0.0) || from == to {
        return from;
    }
    let t = offset / span;
    let delta = to - from;
    let value = if delta.is_finite() {
        from + delta * t
    } else {
        from * (1.0 - t) + to * t
    };
    value.clamp(f32::MIN, to)
}

#[inline]
fn check_quantile(q: f32) -> Result<(), SketchError> {
    if (0.0..=1.0).contains(&q) {
        Ok(())
    } else {
        Err(SketchError::QuantileOutOfRange(q))
    }
}

impl Default for Digest {
    fn default() -> Self {
        Self::new(DigestConfig::DEFAULT_COMPRESSION)
    }
}

impl<R: Rng + Clone + Debug> Sketch for Digest<R> {
    type Item = f32;

    fn update(&mut self, item: &f32) -> Result<(), SketchError> {
        self.push(*item, 1.0)
    }

    fn clear(&mut self) {
        self.centroids.clear();
        self.total_weight = 0.0;
        self.max = f32::NEG_INFINITY;
        self.count = 0;
    }

    fn size_bytes(&self) -> usize {
        core::mem::size_of::<Self>() + self.centroids.heap_bytes()
    }

    fn count(&self) -> u64 {
        self.count
    }
}

impl<R: Rng + Clone + Debug> QuantileSketch for Digest<R> {
    type Value = f32;

    fn add(&mut self, value: f32, weight: f32) -> Result<(), SketchError> {
        self.push(value, weight)
    }

    fn quantile(&self, q: f32) -> Result<f32, SketchError> {
        self.percentile(q)
    }

    fn max(&self) -> Option<f32> {
        if self.count == 0 {
            None
        } else {
            Some(self.max)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
