//! Strategies for choosing the starting means of a k-means run.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    InitializerError, Relation,
    distance::{DistanceFunction, PrimitiveDoubleDistance},
};

/// Chooses the `k` starting means of a k-means run.
///
/// Implementations must not modify the relation. The returned means must have the dimensionality of the relation; the engine verifies this before it
/// allocates anything.
pub trait KMeansInitialization {
    /// Returns a name for the initializer, for diagnostics.
    fn name(&self) -> String;

    /// Chooses `k` starting means for `relation`.
    ///
    /// # Errors
    ///
    /// Implementation specific, e.g. when the relation holds fewer than `k` objects or when the initializer needs a capability `distance` lacks.
    fn choose_initial_means<V: AsRef<[f64]>, D: DistanceFunction>(
        &self,
        relation: &Relation<V>,
        k: usize,
        distance: &D,
    ) -> Result<Vec<Vec<f64>>, InitializerError>;
}

impl<I: KMeansInitialization + ?Sized> KMeansInitialization for &I {
    fn name(&self) -> String {
        (**self).name()
    }

    fn choose_initial_means<V: AsRef<[f64]>, D: DistanceFunction>(
        &self,
        relation: &Relation<V>,
        k: usize,
        distance: &D,
    ) -> Result<Vec<Vec<f64>>, InitializerError> {
        (**self).choose_initial_means(relation, k, distance)
    }
}

/// Checks that `relation` holds at least `k` objects.
const fn check_enough(n: usize, k: usize) -> Result<(), InitializerError> {
    if k > n { Err(InitializerError::TooFewObjects { k, n }) } else { Ok(()) }
}

/// Uses means fixed in advance, regardless of the data.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PredefinedMeans(pub Vec<Vec<f64>>);

impl KMeansInitialization for PredefinedMeans {
    fn name(&self) -> String {
        format!("Predefined({})", self.0.len())
    }

    fn choose_initial_means<V: AsRef<[f64]>, D: DistanceFunction>(
        &self,
        _: &Relation<V>,
        _: usize,
        _: &D,
    ) -> Result<Vec<Vec<f64>>, InitializerError> {
        Ok(self.0.clone())
    }
}

/// Uses the first `k` objects of the relation, in relation order.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FirstK;

impl KMeansInitialization for FirstK {
    fn name(&self) -> String {
        "FirstK".to_string()
    }

    fn choose_initial_means<V: AsRef<[f64]>, D: DistanceFunction>(
        &self,
        relation: &Relation<V>,
        k: usize,
        _: &D,
    ) -> Result<Vec<Vec<f64>>, InitializerError> {
        check_enough(relation.len(), k)?;
        Ok(relation.vectors().iter().take(k).map(|v| v.as_ref().to_vec()).collect())
    }
}

/// Uses `k` distinct objects sampled uniformly at random.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomlyChosen {
    /// The seed of the sampler.
    pub seed: u64,
}

impl KMeansInitialization for RandomlyChosen {
    fn name(&self) -> String {
        format!("RandomlyChosen(seed={})", self.seed)
    }

    fn choose_initial_means<V: AsRef<[f64]>, D: DistanceFunction>(
        &self,
        relation: &Relation<V>,
        k: usize,
        _: &D,
    ) -> Result<Vec<Vec<f64>>, InitializerError> {
        let vectors = relation.vectors();
        check_enough(vectors.len(), k)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        Ok(rand::seq::index::sample(&mut rng, vectors.len(), k)
            .into_iter()
            .map(|i| vectors[i].as_ref().to_vec())
            .collect())
    }
}

/// k-means++ seeding: the first mean is a uniformly random object, and each further mean is an object sampled with probability proportional to its squared
/// distance to the nearest mean chosen so far.
///
/// Distances that are already squared, like [`SquaredEuclidean`](crate::distance::SquaredEuclidean), are used as the weights directly.
///
/// Needs the primitive `f64` path of the distance function and fails with [`InitializerError::Unsupported`] without one.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KMeansPlusPlus {
    /// The seed of the sampler.
    pub seed: u64,
}

impl KMeansInitialization for KMeansPlusPlus {
    fn name(&self) -> String {
        format!("KMeans++(seed={})", self.seed)
    }

    fn choose_initial_means<V: AsRef<[f64]>, D: DistanceFunction>(
        &self,
        relation: &Relation<V>,
        k: usize,
        distance: &D,
    ) -> Result<Vec<Vec<f64>>, InitializerError> {
        let df = distance.as_primitive().ok_or_else(|| {
            InitializerError::Unsupported(format!("k-means++ needs a primitive f64 distance, but {} has none", distance.name()))
        })?;
        let vectors = relation.vectors();
        let n = vectors.len();
        check_enough(n, k)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let first = vectors[rng.random_range(0..n)].as_ref().to_vec();
        let mut weights = vectors
            .iter()
            .map(|v| seeding_weight(df, v.as_ref(), &first))
            .collect::<Vec<_>>();
        let mut means = Vec::with_capacity(k);
        means.push(first);

        while means.len() < k {
            // All weights vanish when every remaining object duplicates a mean.
            let i = weighted_choice(&weights, &mut rng).unwrap_or_else(|| rng.random_range(0..n));
            let mean = vectors[i].as_ref().to_vec();
            for (w, v) in weights.iter_mut().zip(vectors) {
                *w = w.min(seeding_weight(df, v.as_ref(), &mean));
            }
            means.push(mean);
        }

        ftlog::debug!("Chose {k} k-means++ seeds from {n} objects");
        Ok(means)
    }
}

/// The squared distance between `x` and `y`.
fn seeding_weight(df: &dyn PrimitiveDoubleDistance, x: &[f64], y: &[f64]) -> f64 {
    let d = df.double_distance(x, y);
    if df.is_squared() { d } else { d * d }
}

/// Samples an index with probability proportional to its weight, or returns `None` if the weights do not sum to a positive finite total.
fn weighted_choice<R: Rng>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total = weights.iter().sum::<f64>();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let target = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last = None;
    for (i, &w) in weights.iter().enumerate().filter(|&(_, &w)| w > 0.0) {
        cumulative += w;
        last = Some(i);
        if target < cumulative {
            return Some(i);
        }
    }
    // Rounding can leave `target` just past the final sum.
    last
}
