//! Where the trend series gets an enrollment figure for a course whose
//! snapshot carries no count.
//!
//! There is no historical enrollment data, so any value produced here is a
//! placeholder. The source is always chosen explicitly by the caller; the
//! default [`ZeroFallback`] keeps the statistics fully deterministic.

use core::fmt;
use core::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

/// Range the random placeholder is drawn from (lower inclusive).
pub const RANDOM_FALLBACK_RANGE: Range<u32> = 10..40;

/// Supplies a placeholder enrollment figure for a course by its position
/// in the course list.
pub trait TrendFallback: fmt::Debug + Send + Sync {
    /// Placeholder enrollment figure for the course at `course_index`.
    fn enrollments_for(&self, course_index: usize) -> u32;
}

/// Always reports zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroFallback;

impl TrendFallback for ZeroFallback {
    fn enrollments_for(&self, _course_index: usize) -> u32 {
        0
    }
}

/// Reports the same value for every course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFallback(pub u32);

impl TrendFallback for FixedFallback {
    fn enrollments_for(&self, _course_index: usize) -> u32 {
        self.0
    }
}

/// Pseudo-random placeholder in [`RANDOM_FALLBACK_RANGE`].
///
/// The value for a given index depends only on the seed and the index, so
/// one instance gives a stable chart across repeated renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomFallback {
    seed: u64,
}

impl RandomFallback {
    /// Create a source with a seed drawn from the thread RNG.
    pub fn new() -> Self {
        Self {
            seed: rand::rng().random(),
        }
    }

    /// Create a reproducible source.
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for RandomFallback {
    fn default() -> Self {
        Self::new()
    }
}

impl TrendFallback for RandomFallback {
    fn enrollments_for(&self, course_index: usize) -> u32 {
        let index = u64::try_from(course_index).unwrap_or(u64::MAX);
        let mut rng = StdRng::seed_from_u64(self.seed ^ index.rotate_left(32));
        rng.random_range(RANDOM_FALLBACK_RANGE)
    }
}

/// Which enrollment count the engine uses for each course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountPolicy {
    /// Use `Course::enrollment_count` from the snapshot as given.
    #[default]
    Stored,
    /// Recount every course from the enrollment collection. The trend
    /// fallback is never consulted under this policy.
    Derived,
}
