//! Progress observers and cooperative cancellation for k-means runs.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use super::Termination;

/// Receives progress events from a k-means run.
///
/// Observers are passive: they cannot influence the computation. All methods default to doing nothing, and `()` is the observer that ignores everything.
pub trait KMeansObserver {
    /// Called before each full pass over the blocks.
    fn on_iteration_start(&self, iteration: usize) {
        let _ = iteration;
    }

    /// Called after each block has been assigned and the means updated.
    fn on_block_done(&self, iteration: usize, block: usize, n_blocks: usize) {
        let _ = (iteration, block, n_blocks);
    }

    /// Called once when the run stops, with the number of completed passes.
    fn on_finished(&self, iterations: usize, termination: Termination) {
        let _ = (iterations, termination);
    }
}

impl KMeansObserver for () {}

impl<O: KMeansObserver + ?Sized> KMeansObserver for &O {
    fn on_iteration_start(&self, iteration: usize) {
        (**self).on_iteration_start(iteration);
    }

    fn on_block_done(&self, iteration: usize, block: usize, n_blocks: usize) {
        (**self).on_block_done(iteration, block, n_blocks);
    }

    fn on_finished(&self, iterations: usize, termination: Termination) {
        (**self).on_finished(iterations, termination);
    }
}

/// Forwards progress events to the `ftlog` logger: passes at `info`, blocks at `debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl KMeansObserver for LogObserver {
    fn on_iteration_start(&self, iteration: usize) {
        ftlog::info!("K-Means iteration {iteration}");
    }

    fn on_block_done(&self, iteration: usize, block: usize, n_blocks: usize) {
        ftlog::debug!("K-Means iteration {iteration}: finished block {}/{n_blocks}", block + 1);
    }

    fn on_finished(&self, iterations: usize, termination: Termination) {
        ftlog::info!("K-Means finished after {iterations} iterations: {termination:?}");
    }
}

/// A flag shared between a running algorithm and whoever may want to stop it.
///
/// Runs check the flag between blocks, never in the middle of one, so a cancelled run always leaves a consistent assignment.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
