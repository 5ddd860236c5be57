//! The batched Lloyd engine.

use rayon::prelude::*;

use crate::{
    Error, MeanVector, Relation, Result,
    distance::{DistanceFunction, NearestStrategy},
    ids::{ArrayDbIds, DbId, DbIds, HashSetDbIds, ModifiableDbIds, random_split},
    store::{IntegerStorage, IntegerStore},
};

use super::{
    Blocking, CancelToken, Cluster, Clustering, KMeansInitialization, KMeansModel, KMeansObserver, KMeansSettings, Termination,
};

/// The assignment of an object that is not yet in any cluster.
pub const UNASSIGNED: i32 = -1;

/// K-Means clustering by batched Lloyd iterations.
///
/// The objects are split into blocks once, up front. Each pass assigns the objects of one block at a time to their nearest means and then updates every
/// mean incrementally from the changes in that block, so the means move several times per pass. The run stops after a pass that changed no assignment, or
/// when the iteration cap is reached, or when it is cancelled.
///
/// Means of clusters that become empty are left where they were.
///
/// # Type Parameters
///
/// - `D`: The distance function.
/// - `Init`: The initializer for the starting means.
/// - `O`: The progress observer.
#[derive(Clone, Debug)]
#[must_use]
pub struct BatchedLloyd<D, Init, O = ()> {
    /// The plain-data parameters.
    settings: KMeansSettings,
    /// The distance function.
    distance: D,
    /// The initializer for the starting means.
    initializer: Init,
    /// Receives progress events.
    observer: O,
    /// Checked between blocks.
    cancel: Option<CancelToken>,
}

impl<D, Init> BatchedLloyd<D, Init> {
    /// Creates a configuration for `k` clusters with the default settings.
    pub const fn new(k: usize, distance: D, initializer: Init) -> Self {
        Self::from_settings(KMeansSettings::new(k), distance, initializer)
    }

    /// Creates a configuration from existing settings.
    pub const fn from_settings(settings: KMeansSettings, distance: D, initializer: Init) -> Self {
        Self {
            settings,
            distance,
            initializer,
            observer: (),
            cancel: None,
        }
    }
}

impl<D, Init, O> BatchedLloyd<D, Init, O> {
    /// Sets the maximum number of full passes. `0` means no limit.
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.settings.max_iterations = max_iterations;
        self
    }

    /// Uses a random partition into `blocks` blocks.
    pub const fn with_blocks(mut self, blocks: usize) -> Self {
        self.settings.blocking = Blocking::Random(blocks);
        self
    }

    /// Sets the blocking strategy.
    pub const fn with_blocking(mut self, blocking: Blocking) -> Self {
        self.settings.blocking = blocking;
        self
    }

    /// Fixes the seed of the block partition.
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self
    }

    /// Makes the run stop at the next block boundary once `token` is cancelled.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Replaces the progress observer.
    pub fn with_observer<O2: KMeansObserver>(self, observer: O2) -> BatchedLloyd<D, Init, O2> {
        BatchedLloyd {
            settings: self.settings,
            distance: self.distance,
            initializer: self.initializer,
            observer,
            cancel: self.cancel,
        }
    }

    /// Returns the plain-data parameters.
    #[must_use]
    pub const fn settings(&self) -> &KMeansSettings {
        &self.settings
    }

    /// Returns the distance function.
    #[must_use]
    pub const fn distance(&self) -> &D {
        &self.distance
    }

    /// Whether cancellation was requested.
    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

impl<D: DistanceFunction, Init: KMeansInitialization, O: KMeansObserver> BatchedLloyd<D, Init, O> {
    /// Validates the configuration, chooses the starting means and partitions `relation` into blocks.
    ///
    /// The returned run can be driven block by block with [`BatchedLloydRun::process_block`] or pass by pass with
    /// [`BatchedLloydRun::run_iteration`].
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if the settings are inconsistent with `relation`, or if the initializer returns the wrong number of means or means of the
    ///   wrong dimensionality.
    /// - `ArithmeticAnomaly` if a starting mean has a non-finite coordinate.
    /// - `InitializerFailure` if the initializer fails.
    pub fn start<'a, V: AsRef<[f64]>>(&'a self, relation: &'a Relation<V>) -> Result<BatchedLloydRun<'a, V, D>> {
        let KMeansSettings { k, blocking, .. } = self.settings;
        let (n, dim) = (relation.len(), relation.dimensionality());
        self.settings.validate(n)?;

        let initial = self.initializer.choose_initial_means(relation, k, &self.distance)?;
        if initial.len() != k {
            return Err(Error::InvalidConfiguration(format!(
                "{} returned {} means but k = {k}",
                self.initializer.name(),
                initial.len()
            )));
        }
        let means = initial
            .into_iter()
            .enumerate()
            .map(|(i, mean)| {
                if mean.len() != dim {
                    Err(Error::InvalidConfiguration(format!(
                        "starting mean {i} has dimensionality {} but the relation has {dim}",
                        mean.len()
                    )))
                } else if mean.iter().any(|x| !x.is_finite()) {
                    Err(Error::ArithmeticAnomaly(format!("starting mean {i} is not finite")))
                } else {
                    Ok(MeanVector::from(mean))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let strategy = NearestStrategy::select(&self.distance);
        let blocks = match blocking {
            Blocking::Random(blocks) => {
                let seed = self.settings.seed.unwrap_or_else(rand::random);
                ftlog::info!("Partitioning {n} objects into {blocks} blocks with seed {seed}");
                random_split(relation.ids(), blocks, seed)?
            }
            Blocking::FullPass => vec![ArrayDbIds::from_ids(relation.ids())],
        };

        ftlog::info!(
            "Starting batched Lloyd with k = {k} on {n} objects of dimensionality {dim}, {} distance via the {} path, {} initializer",
            self.distance.name(),
            if strategy.is_primitive() { "primitive" } else { "general" },
            self.initializer.name()
        );

        Ok(BatchedLloydRun {
            relation,
            strategy,
            means,
            membership: Membership::new(relation, k),
            scratch: BlockScratch::new(k, dim),
            blocks,
            iteration: 0,
        })
    }

    /// Runs k-means on `relation`.
    ///
    /// # Errors
    ///
    /// See [`Self::start`]. Also `ArithmeticAnomaly` if a distance is NaN or a mean stops being finite.
    pub fn run<V: AsRef<[f64]>>(&self, relation: &Relation<V>) -> Result<Clustering> {
        let run = self.start(relation)?;
        self.drive(run, BatchedLloydRun::process_block)
    }

    /// Repeats passes over the blocks until convergence, the iteration cap or cancellation.
    fn drive<'a, V, F>(&self, mut run: BatchedLloydRun<'a, V, D>, mut step: F) -> Result<Clustering>
    where
        V: AsRef<[f64]>,
        F: FnMut(&mut BatchedLloydRun<'a, V, D>, usize) -> Result<bool>,
    {
        let max_iterations = self.settings.max_iterations;
        let n_blocks = run.blocks.len();

        let termination = 'passes: loop {
            let iteration = run.iteration;
            if max_iterations > 0 && iteration >= max_iterations {
                break Termination::IterationCapReached;
            }

            self.observer.on_iteration_start(iteration);
            let mut changed = false;
            for p in 0..n_blocks {
                if self.is_cancelled() {
                    break 'passes Termination::Cancelled;
                }
                changed |= step(&mut run, p)?;
                self.observer.on_block_done(iteration, p, n_blocks);
            }
            run.iteration += 1;
            ftlog::debug!("Finished pass {iteration}, changed = {changed}");

            if !changed {
                break Termination::Converged;
            }
        };

        let iterations = run.iteration;
        ftlog::info!("Finished batched Lloyd after {iterations} iterations: {termination:?}");
        self.observer.on_finished(iterations, termination);
        Ok(run.into_clustering(termination))
    }
}

impl<D, Init, O> BatchedLloyd<D, Init, O>
where
    D: DistanceFunction + Sync,
    Init: KMeansInitialization,
    O: KMeansObserver,
{
    /// Parallelized version of [`Self::run`].
    ///
    /// The nearest-mean searches of each block run in parallel against the means as they were at the start of the block. The assignments are then applied
    /// in block order, so the result is identical to [`Self::run`].
    ///
    /// # Errors
    ///
    /// See [`Self::run`].
    pub fn par_run<V: AsRef<[f64]> + Sync>(&self, relation: &Relation<V>) -> Result<Clustering> {
        let run = self.start(relation)?;
        self.drive(run, BatchedLloydRun::par_process_block)
    }
}

/// Runs every configuration on `relation` in parallel and returns the results in configuration order.
///
/// The runs share nothing mutable, so their results are the same as running them one after another.
pub fn par_sweep<V, D, Init, O>(relation: &Relation<V>, configs: &[BatchedLloyd<D, Init, O>]) -> Vec<Result<Clustering>>
where
    V: AsRef<[f64]> + Sync,
    D: DistanceFunction + Sync,
    Init: KMeansInitialization + Sync,
    O: KMeansObserver + Sync,
{
    ftlog::info!("Sweeping {} k-means configurations in parallel", configs.len());
    configs.par_iter().map(|config| config.run(relation)).collect()
}

/// Returns block `p`.
fn block_at(blocks: &[ArrayDbIds], p: usize) -> Result<&ArrayDbIds> {
    blocks
        .get(p)
        .ok_or_else(|| Error::InvalidConfiguration(format!("there is no block {p}; the run has {} blocks", blocks.len())))
}

/// The cluster member sets and the assignment store, kept consistent with each other.
#[derive(Debug)]
struct Membership {
    /// One member set per mean.
    clusters: Vec<HashSetDbIds>,
    /// The cluster index of every object, or [`UNASSIGNED`].
    assignment: IntegerStorage,
}

impl Membership {
    /// Creates `k` empty clusters and an assignment of `UNASSIGNED` for every object of `relation`.
    fn new<V>(relation: &Relation<V>, k: usize) -> Self {
        let capacity = 2 * relation.len() / k;
        Self {
            clusters: (0..k).map(|_| HashSetDbIds::with_capacity(capacity)).collect(),
            assignment: IntegerStorage::for_range(*relation.ids(), UNASSIGNED),
        }
    }

    /// Moves `id`, whose feature vector is `v`, into cluster `nearest` and records the change in `scratch`.
    ///
    /// Returns whether the assignment changed.
    fn reassign(&mut self, id: DbId, v: &[f64], nearest: usize, scratch: &mut BlockScratch) -> bool {
        // `k` was checked to fit in an `i32`.
        #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let label = nearest as i32;
        let previous = self.assignment.get(id);
        if previous == label {
            return false;
        }

        self.clusters[nearest].add(id);
        scratch.join(nearest, v);
        if let Ok(previous) = usize::try_from(previous) {
            self.clusters[previous].remove(id);
            scratch.leave(previous, v);
        }
        self.assignment.put(id, label);
        true
    }
}

/// Per-block accumulators: the sum of the vectors that joined minus those that left, and the net change in size, for every cluster.
///
/// Allocated once per run and zeroed before every block.
#[derive(Debug)]
struct BlockScratch {
    /// The net vector shift of each cluster.
    shift: Vec<MeanVector>,
    /// The net change in size of each cluster.
    change_size: Vec<i64>,
}

impl BlockScratch {
    /// Creates zeroed accumulators for `k` clusters of dimensionality `dim`.
    fn new(k: usize, dim: usize) -> Self {
        Self {
            shift: vec![MeanVector::zeros(dim); k],
            change_size: vec![0; k],
        }
    }

    /// Zeroes every accumulator.
    fn reset(&mut self) {
        self.shift.iter_mut().for_each(MeanVector::fill_zero);
        self.change_size.fill(0);
    }

    /// Records that `v` joined cluster `i`.
    fn join(&mut self, i: usize, v: &[f64]) {
        self.shift[i].plus_assign(v);
        self.change_size[i] += 1;
    }

    /// Records that `v` left cluster `i`.
    fn leave(&mut self, i: usize, v: &[f64]) {
        self.shift[i].minus_assign(v);
        self.change_size[i] -= 1;
    }
}

/// A k-means run in progress, created by [`BatchedLloyd::start`].
///
/// Owns the means, the cluster sets, the assignment store, the blocks and the per-block scratch space. After every block the means are exactly the
/// component-wise averages of their clusters' members, up to rounding.
#[derive(Debug)]
pub struct BatchedLloydRun<'a, V, D: DistanceFunction> {
    /// The objects being clustered.
    relation: &'a Relation<V>,
    /// The distance path, chosen once.
    strategy: NearestStrategy<'a, D>,
    /// The current means.
    means: Vec<MeanVector>,
    /// The cluster sets and the assignment store.
    membership: Membership,
    /// Per-block accumulators.
    scratch: BlockScratch,
    /// The blocks, fixed for the whole run.
    blocks: Vec<ArrayDbIds>,
    /// The number of completed passes.
    iteration: usize,
}

impl<V: AsRef<[f64]>, D: DistanceFunction> BatchedLloydRun<'_, V, D> {
    /// Assigns every object of block `p` to its nearest mean, then updates the means.
    ///
    /// Returns whether any assignment changed.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if there is no block `p`.
    /// - `ArithmeticAnomaly` if a distance is NaN or a mean stops being finite.
    pub fn process_block(&mut self, p: usize) -> Result<bool> {
        let block = block_at(&self.blocks, p)?;
        self.scratch.reset();

        let mut changed = false;
        for id in block.iter() {
            let v = self.relation.try_get(id)?;
            let nearest = self.strategy.nearest(v, &self.means)?;
            changed |= self.membership.reassign(id, v, nearest, &mut self.scratch);
        }

        self.update_means()?;
        Ok(changed)
    }

    /// Runs one full pass over all blocks, in order.
    ///
    /// Returns whether any assignment changed.
    ///
    /// # Errors
    ///
    /// See [`Self::process_block`].
    pub fn run_iteration(&mut self) -> Result<bool> {
        let mut changed = false;
        for p in 0..self.blocks.len() {
            changed |= self.process_block(p)?;
        }
        self.iteration += 1;
        Ok(changed)
    }

    /// Applies the size changes and vector shifts accumulated in the scratch space to the means.
    ///
    /// With `m` the old mean, `s` the shift and `old`/`new` the sizes before and after the block, the new mean is `m·(old/new) + s/new`. Empty clusters
    /// keep their mean.
    #[expect(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
    fn update_means(&mut self) -> Result<()> {
        let clusters = &self.membership.clusters;
        let accumulated = self.scratch.shift.iter().zip(&self.scratch.change_size);
        for (i, ((mean, (shift, &delta)), cluster)) in self.means.iter_mut().zip(accumulated).zip(clusters).enumerate() {
            let new_size = cluster.len() as i64;
            if new_size == 0 {
                continue;
            }
            let old_size = new_size - delta;
            let scale = 1.0 / new_size as f64;

            if old_size == 0 {
                mean.set_scaled(shift.as_slice(), scale);
            } else if old_size == new_size {
                mean.plus_times_assign(shift.as_slice(), scale);
            } else {
                mean.times_assign(old_size as f64 * scale).plus_times_assign(shift.as_slice(), scale);
            }

            if !mean.is_finite() {
                return Err(Error::ArithmeticAnomaly(format!("mean {i} is not finite after an update")));
            }
        }
        Ok(())
    }

    /// Returns the current means.
    #[must_use]
    pub fn means(&self) -> &[MeanVector] {
        &self.means
    }

    /// Returns the current member set of every cluster.
    #[must_use]
    pub fn clusters(&self) -> &[HashSetDbIds] {
        &self.membership.clusters
    }

    /// Returns the current assignment of every object. Unassigned objects map to [`UNASSIGNED`].
    #[must_use]
    pub const fn assignment(&self) -> &IntegerStorage {
        &self.membership.assignment
    }

    /// Returns the blocks.
    #[must_use]
    pub fn blocks(&self) -> &[ArrayDbIds] {
        &self.blocks
    }

    /// Returns the number of completed passes.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iteration
    }

    /// Whether the primitive distance path is in use.
    #[must_use]
    pub const fn uses_primitive_path(&self) -> bool {
        self.strategy.is_primitive()
    }

    /// Packages the current clusters and means as the result of the run.
    pub fn into_clustering(self, termination: Termination) -> Clustering {
        let clusters = self
            .membership
            .clusters
            .into_iter()
            .zip(self.means)
            .enumerate()
            .map(|(i, (ids, mean))| Cluster::new(format!("Cluster {i}"), ids, KMeansModel::new(mean.into_vec())))
            .collect();
        Clustering::new(clusters, self.iteration, termination)
    }
}

impl<V: AsRef<[f64]> + Sync, D: DistanceFunction + Sync> BatchedLloydRun<'_, V, D> {
    /// Parallelized version of [`Self::process_block`].
    ///
    /// # Errors
    ///
    /// See [`Self::process_block`].
    pub fn par_process_block(&mut self, p: usize) -> Result<bool> {
        let block = block_at(&self.blocks, p)?;
        let nearest = block
            .as_slice()
            .par_iter()
            .map(|&id| {
                self.relation
                    .try_get(id)
                    .and_then(|v| self.strategy.nearest(v, &self.means))
            })
            .collect::<Result<Vec<_>>>()?;

        self.scratch.reset();
        let mut changed = false;
        for (id, nearest) in block.iter().zip(nearest) {
            let v = self.relation.try_get(id)?;
            changed |= self.membership.reassign(id, v, nearest, &mut self.scratch);
        }

        self.update_means()?;
        Ok(changed)
    }

    /// Parallelized version of [`Self::run_iteration`].
    ///
    /// # Errors
    ///
    /// See [`Self::process_block`].
    pub fn par_run_iteration(&mut self) -> Result<bool> {
        let mut changed = false;
        for p in 0..self.blocks.len() {
            changed |= self.par_process_block(p)?;
        }
        self.iteration += 1;
        Ok(changed)
    }
}
