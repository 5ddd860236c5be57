//! K-Means clustering with batched Lloyd iterations.
//!
//! [`BatchedLloyd`] partitions the objects into random blocks once, then repeatedly assigns one block at a time to the nearest means and updates the means
//! incrementally from the changes in that block. With [`Blocking::FullPass`] every pass is a single block in relation order, which is classic Lloyd.
//!
//! ```
//! use dmine::{Relation, distance::SquaredEuclidean, kmeans::{BatchedLloyd, FirstK}};
//!
//! let relation = Relation::from_vectors(vec![[0.0, 0.0], [0.0, 1.0], [10.0, 0.0], [10.0, 1.0]])?;
//! let clustering = BatchedLloyd::new(2, SquaredEuclidean, FirstK)
//!     .with_blocks(2)
//!     .with_seed(42)
//!     .run(&relation)?;
//! assert_eq!(clustering.len(), 2);
//! assert_eq!(clustering.clusters().iter().map(|c| c.len()).sum::<usize>(), 4);
//! # Ok::<(), dmine::Error>(())
//! ```

mod batched_lloyd;
mod clustering;
mod initialization;
mod progress;

pub use batched_lloyd::{BatchedLloyd, BatchedLloydRun, UNASSIGNED, par_sweep};
pub use clustering::{Cluster, Clustering, KMeansModel, Termination};
pub use initialization::{FirstK, KMeansInitialization, KMeansPlusPlus, PredefinedMeans, RandomlyChosen};
pub use progress::{CancelToken, KMeansObserver, LogObserver};

use crate::{Error, Result};

/// The number of blocks used when none is configured.
pub const DEFAULT_BLOCKS: usize = 10;

/// How the objects are grouped into the blocks processed between two mean updates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Blocking {
    /// A seeded random partition into this many blocks of near-equal size. At least two.
    Random(usize),
    /// A single block of all objects in relation order.
    FullPass,
}

impl Default for Blocking {
    fn default() -> Self {
        Self::Random(DEFAULT_BLOCKS)
    }
}

impl Blocking {
    /// Returns the number of blocks this strategy produces.
    #[must_use]
    pub const fn num_blocks(self) -> usize {
        match self {
            Self::Random(blocks) => blocks,
            Self::FullPass => 1,
        }
    }
}

/// The plain-data parameters of a k-means run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KMeansSettings {
    /// The number of clusters.
    pub k: usize,
    /// The maximum number of full passes. `0` means no limit.
    pub max_iterations: usize,
    /// How objects are grouped into blocks.
    pub blocking: Blocking,
    /// The seed of the block partition. `None` draws one from the system entropy source, which is logged.
    pub seed: Option<u64>,
}

impl KMeansSettings {
    /// Creates settings for `k` clusters with no iteration limit, the default blocking and no fixed seed.
    #[must_use]
    pub const fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: 0,
            blocking: Blocking::Random(DEFAULT_BLOCKS),
            seed: None,
        }
    }

    /// Checks the settings against a relation of `n` objects.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `k` is zero, larger than `n` or too large to store, or if the blocking asks for fewer than two or more than `n` blocks.
    pub fn validate(&self, n: usize) -> Result<()> {
        let k = self.k;
        if k == 0 {
            return Err(Error::InvalidConfiguration("k must be at least 1".to_string()));
        }
        if i32::try_from(k).is_err() {
            return Err(Error::InvalidConfiguration(format!("k = {k} is too large")));
        }
        if n == 0 {
            return Err(Error::InvalidConfiguration("cannot cluster an empty relation".to_string()));
        }
        if k > n {
            return Err(Error::InvalidConfiguration(format!("k = {k} exceeds the number of objects ({n})")));
        }
        if let Blocking::Random(blocks) = self.blocking {
            if blocks < 2 {
                return Err(Error::InvalidConfiguration(format!(
                    "random blocking needs at least 2 blocks, got {blocks}"
                )));
            }
            if blocks > n {
                return Err(Error::InvalidConfiguration(format!(
                    "cannot split {n} objects into {blocks} non-empty blocks"
                )));
            }
        }
        Ok(())
    }
}
