//! Tests for batched Lloyd k-means.

use std::{cell::RefCell, collections::HashSet, error::Error};

use dmine::{
    InitializerError, Relation,
    distance::{Euclidean, GeneralPath, Manhattan, SquaredEuclidean},
    ids::{DbId, DbIds, HashSetDbIds},
    kmeans::{
        BatchedLloyd, Blocking, CancelToken, FirstK, KMeansInitialization, KMeansObserver, KMeansPlusPlus, LogObserver, PredefinedMeans,
        RandomlyChosen, Termination, UNASSIGNED, par_sweep,
    },
    store::IntegerStore,
};
use float_eq::assert_float_eq;
use test_case::test_case;

mod common;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn two_pairs() -> TestResult {
    let relation = Relation::from_vectors(vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![10.0, 0.0], vec![10.0, 1.0]])?;
    let init = PredefinedMeans(vec![vec![0.0, 0.0], vec![10.0, 0.0]]);

    for seed in 0..10 {
        let clustering = BatchedLloyd::new(2, Euclidean, &init).with_blocks(2).with_seed(seed).run(&relation)?;
        assert_eq!(clustering.termination(), Termination::Converged);
        assert!(clustering.iterations() <= 2, "{clustering:?}");

        let [left, right] = clustering.clusters() else {
            unreachable!("k = 2 gives two clusters")
        };
        assert_eq!(left.ids().to_sorted_vec(), relation.ids().iter().take(2).collect::<Vec<_>>());
        assert_eq!(right.ids().to_sorted_vec(), relation.ids().iter().skip(2).collect::<Vec<_>>());
        common::assert_close(left.mean(), &[0.0, 0.5]);
        common::assert_close(right.mean(), &[10.0, 0.5]);
    }
    Ok(())
}

#[test]
fn full_pass_is_classic_lloyd() -> TestResult {
    let relation = common::data_gen::three_blobs(7)?;
    let initial = RandomlyChosen { seed: 3 }.choose_initial_means(&relation, 3, &SquaredEuclidean)?;

    let config = BatchedLloyd::new(3, SquaredEuclidean, PredefinedMeans(initial.clone())).with_blocking(Blocking::FullPass);
    let mut run = config.start(&relation)?;
    assert_eq!(run.blocks().len(), 1);
    assert!(run.run_iteration()?);

    // One assignment against the initial means, then one mean per cluster.
    let mut expected = initial.clone();
    for (k, mean) in expected.iter_mut().enumerate() {
        let members = relation
            .iter()
            .filter(|(_, v)| common::brute_force_nearest(v, &initial) == k)
            .map(|(id, _)| id)
            .collect::<HashSetDbIds>();
        if let Some(m) = common::brute_force_mean(&relation, &members) {
            *mean = m;
        }
    }
    for (actual, expected) in run.means().iter().zip(&expected) {
        common::assert_close(actual.as_slice(), expected);
    }
    Ok(())
}

#[test]
fn same_seed_same_blocks() -> TestResult {
    let relation = common::data_gen::tabular(200, 3, 42)?;
    let config = BatchedLloyd::new(4, Euclidean, FirstK).with_blocks(10).with_seed(17);

    let a = config.start(&relation)?;
    let b = config.start(&relation)?;
    assert_eq!(a.blocks(), b.blocks());

    let other = BatchedLloyd::new(4, Euclidean, FirstK).with_blocks(10).with_seed(18);
    assert_ne!(a.blocks(), other.start(&relation)?.blocks());

    let first = config.run(&relation)?;
    let second = config.run(&relation)?;
    assert_eq!(first.labels(&relation), second.labels(&relation));
    assert_eq!(first.means(), second.means());
    Ok(())
}

#[test_case(2; "2_blocks")]
#[test_case(7; "7_blocks")]
#[test_case(10; "10_blocks")]
fn blocks_cover_the_relation(blocks: usize) -> TestResult {
    let relation = common::data_gen::tabular(103, 2, 1)?;
    let config = BatchedLloyd::new(3, Euclidean, FirstK).with_blocks(blocks).with_seed(5);
    let run = config.start(&relation)?;

    assert_eq!(run.blocks().len(), blocks);
    let mut seen = HashSet::new();
    for block in run.blocks() {
        assert!(block.len() == 103 / blocks || block.len() == 103 / blocks + 1);
        for id in block.iter() {
            assert!(seen.insert(id), "{id} is in two blocks");
        }
    }
    assert_eq!(seen.len(), relation.len());
    assert!(relation.ids().iter().all(|id| seen.contains(&id)));
    Ok(())
}

/// Checks that every object is in at most one cluster, that the assignment store agrees with the cluster sets, and that the assigned objects are
/// exactly those of the first `processed` blocks.
fn check_membership(run: &dmine::kmeans::BatchedLloydRun<'_, Vec<f64>, SquaredEuclidean>, processed: usize) {
    let mut seen = HashSet::new();
    for (k, cluster) in run.clusters().iter().enumerate() {
        for id in cluster.iter() {
            assert!(seen.insert(id), "{id} is in two clusters");
            assert_eq!(usize::try_from(run.assignment().get(id)).ok(), Some(k));
        }
    }
    let expected = run.blocks()[..processed].iter().flat_map(|b| b.iter()).collect::<HashSet<DbId>>();
    assert_eq!(seen, expected);
    for block in &run.blocks()[processed..] {
        assert!(block.iter().all(|id| run.assignment().get(id) == UNASSIGNED));
    }
}

#[test]
fn means_track_members_after_every_block() -> TestResult {
    let relation = common::data_gen::three_blobs(11)?;
    let config = BatchedLloyd::new(5, SquaredEuclidean, RandomlyChosen { seed: 9 }).with_blocks(6).with_seed(4);
    let mut run = config.start(&relation)?;

    for iteration in 0..4 {
        for p in 0..run.blocks().len() {
            run.process_block(p)?;
            if iteration == 0 {
                check_membership(&run, p + 1);
            }
            for (mean, cluster) in run.means().iter().zip(run.clusters()) {
                if let Some(expected) = common::brute_force_mean(&relation, cluster) {
                    common::assert_close(mean.as_slice(), &expected);
                }
            }
        }
    }
    check_membership(&run, run.blocks().len());
    Ok(())
}

#[test]
fn both_distance_paths_agree() -> TestResult {
    let relation = common::data_gen::tabular(300, 4, 8)?;

    let fast = BatchedLloyd::new(6, Manhattan, FirstK).with_blocks(5).with_seed(2);
    let general = BatchedLloyd::new(6, GeneralPath(Manhattan), FirstK).with_blocks(5).with_seed(2);
    assert!(fast.start(&relation)?.uses_primitive_path());
    assert!(!general.start(&relation)?.uses_primitive_path());

    let a = fast.run(&relation)?;
    let b = general.run(&relation)?;
    assert_eq!(a.labels(&relation), b.labels(&relation));
    assert_eq!(a.means(), b.means());
    assert_eq!(a.iterations(), b.iterations());
    Ok(())
}

#[test]
fn stops_at_convergence_or_cap() -> TestResult {
    let relation = common::data_gen::tabular(500, 2, 3)?;

    let converged = BatchedLloyd::new(8, SquaredEuclidean, FirstK).with_seed(1).run(&relation)?;
    assert_eq!(converged.termination(), Termination::Converged);
    assert!(converged.iterations() >= 2);

    // Another pass over a converged state changes nothing.
    let config = BatchedLloyd::new(8, SquaredEuclidean, FirstK)
        .with_seed(1)
        .with_max_iterations(converged.iterations());
    let mut run = config.start(&relation)?;
    for _ in 0..converged.iterations() {
        run.run_iteration()?;
    }
    assert!(!run.run_iteration()?);

    for cap in 1..converged.iterations() {
        let capped = BatchedLloyd::new(8, SquaredEuclidean, FirstK)
            .with_seed(1)
            .with_max_iterations(cap)
            .run(&relation)?;
        assert_eq!(capped.termination(), Termination::IterationCapReached);
        assert_eq!(capped.iterations(), cap);
    }
    Ok(())
}

#[test]
fn par_run_matches_run() -> TestResult {
    let relation = common::data_gen::tabular(2_000, 8, 21)?;
    let config = BatchedLloyd::new(12, Euclidean, KMeansPlusPlus { seed: 5 }).with_blocks(10).with_seed(99);

    let seq = config.run(&relation)?;
    let par = config.par_run(&relation)?;
    assert_eq!(seq.labels(&relation), par.labels(&relation));
    assert_eq!(seq.means(), par.means());
    assert_eq!(seq.iterations(), par.iterations());
    assert_eq!(seq.termination(), par.termination());
    Ok(())
}

#[test]
fn sweep_matches_individual_runs() -> TestResult {
    let relation = common::data_gen::three_blobs(5)?;
    let configs = (2..6)
        .map(|k| BatchedLloyd::new(k, SquaredEuclidean, FirstK).with_seed(3))
        .collect::<Vec<_>>();

    let results = par_sweep(&relation, &configs);
    assert_eq!(results.len(), configs.len());
    for (config, result) in configs.iter().zip(results) {
        let swept = result?;
        let single = config.run(&relation)?;
        assert_eq!(swept.len(), config.settings().k);
        assert_eq!(swept.labels(&relation), single.labels(&relation));
    }
    Ok(())
}

#[test]
fn three_blobs_are_recovered() -> TestResult {
    let relation = common::data_gen::three_blobs(13)?;
    let init = PredefinedMeans(vec![vec![1.0, 1.0], vec![19.0, 1.0], vec![1.0, 19.0]]);
    let clustering = BatchedLloyd::new(3, SquaredEuclidean, init)
        .with_seed(0)
        .with_observer(LogObserver)
        .run(&relation)?;

    assert!(clustering.termination().is_converged());
    let mut sizes = clustering.clusters().iter().map(|c| c.len()).collect::<Vec<_>>();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![50, 50, 50]);
    // 150 points with unit variance in each of two dimensions.
    assert!(clustering.variance_sum(&relation)? < 2.0 * 150.0 * 1.5);

    let nearest = clustering.nearest_clusters(&[19.0, 1.0], 1, &Euclidean)?;
    let labels = clustering.labels(&relation);
    assert_eq!(Some(nearest[0]), labels[50]);
    Ok(())
}

/// Records the events it observes and cancels a token after a given number of blocks.
#[derive(Default)]
struct Recorder {
    /// Observed events, in order.
    events: RefCell<Vec<String>>,
    /// Cancelled once `cancel_after` blocks are done.
    token: CancelToken,
    /// The number of blocks after which to cancel, if any.
    cancel_after: Option<usize>,
}

impl KMeansObserver for Recorder {
    fn on_iteration_start(&self, iteration: usize) {
        self.events.borrow_mut().push(format!("start {iteration}"));
    }

    fn on_block_done(&self, iteration: usize, block: usize, n_blocks: usize) {
        let mut events = self.events.borrow_mut();
        events.push(format!("block {iteration} {block}/{n_blocks}"));
        let done = events.iter().filter(|e| e.starts_with("block")).count();
        if self.cancel_after == Some(done) {
            self.token.cancel();
        }
    }

    fn on_finished(&self, iterations: usize, termination: Termination) {
        self.events.borrow_mut().push(format!("finished {iterations} {termination:?}"));
    }
}

#[test]
fn observer_sees_every_block() -> TestResult {
    let relation = common::data_gen::grid(5)?;
    let recorder = Recorder::default();
    let clustering = BatchedLloyd::new(4, Euclidean, FirstK)
        .with_blocks(3)
        .with_seed(8)
        .with_observer(&recorder)
        .run(&relation)?;

    let events = recorder.events.into_inner();
    let n = clustering.iterations();
    assert_eq!(events.iter().filter(|e| e.starts_with("start")).count(), n);
    assert_eq!(events.iter().filter(|e| e.starts_with("block")).count(), 3 * n);
    assert_eq!(events[..4], ["start 0", "block 0 0/3", "block 0 1/3", "block 0 2/3"]);
    assert_eq!(events.last(), Some(&format!("finished {n} Converged")));
    Ok(())
}

#[test]
fn cancellation_stops_between_blocks() -> TestResult {
    let relation = common::data_gen::tabular(100, 2, 4)?;
    let recorder = Recorder {
        cancel_after: Some(2),
        ..Recorder::default()
    };
    let config = BatchedLloyd::new(3, SquaredEuclidean, FirstK)
        .with_blocks(10)
        .with_seed(6)
        .with_cancel_token(recorder.token.clone())
        .with_observer(&recorder);

    let clustering = config.run(&relation)?;
    assert_eq!(clustering.termination(), Termination::Cancelled);
    assert_eq!(clustering.iterations(), 0);

    // Exactly the first two blocks were assigned, and the means still match their members.
    let assigned = clustering.labels(&relation).into_iter().flatten().count();
    assert_eq!(assigned, 20);
    for cluster in clustering.clusters() {
        if let Some(expected) = common::brute_force_mean(&relation, cluster.ids()) {
            common::assert_close(cluster.mean(), &expected);
        }
    }

    let token = CancelToken::new();
    token.cancel();
    let clustering = BatchedLloyd::new(3, SquaredEuclidean, FirstK).with_cancel_token(token).run(&relation)?;
    assert_eq!(clustering.termination(), Termination::Cancelled);
    assert!(clustering.clusters().iter().all(|c| c.is_empty()));
    Ok(())
}

#[test]
fn empty_clusters_keep_their_mean() -> TestResult {
    let relation = Relation::from_vectors(vec![vec![0.0], vec![1.0], vec![10.0]])?;
    let init = PredefinedMeans(vec![vec![0.4], vec![0.6], vec![20.0]]);
    let clustering = BatchedLloyd::new(3, Euclidean, init).with_blocking(Blocking::FullPass).run(&relation)?;

    assert_eq!(clustering.labels(&relation), vec![Some(0), Some(0), Some(1)]);
    assert_float_eq!(clustering.clusters()[0].mean()[0], 0.5, abs <= 1e-12);
    assert_float_eq!(clustering.clusters()[1].mean()[0], 10.0, abs <= 1e-12);

    // No object is ever nearest to the third mean. It stays in the result, empty and unmoved.
    let stale = &clustering.clusters()[2];
    assert!(stale.is_empty());
    assert_float_eq!(stale.mean()[0], 20.0, abs <= 0.0);
    Ok(())
}

#[test]
fn a_cluster_that_loses_its_members_keeps_its_mean() -> TestResult {
    // The objects at 4 and 6 first settle on the middle mean. Once the outer means move in they are both closer to a neighbor.
    let relation = Relation::from_vectors(vec![[3.2], [3.8], [4.0], [6.0], [6.2], [6.8]])?;
    let init = PredefinedMeans(vec![vec![5.0], vec![2.9], vec![7.1]]);
    let config = BatchedLloyd::new(3, SquaredEuclidean, init).with_blocking(Blocking::FullPass);
    let mut run = config.start(&relation)?;

    assert!(run.process_block(0)?);
    let sizes = run.clusters().iter().map(DbIds::len).collect::<Vec<_>>();
    assert_eq!(sizes, vec![2, 2, 2]);
    let before = run.means()[0].as_slice().to_vec();
    assert_float_eq!(before[0], 5.0, abs <= 0.0);

    assert!(run.process_block(0)?);
    assert!(run.clusters()[0].is_empty());
    let sizes = run.clusters().iter().map(DbIds::len).collect::<Vec<_>>();
    assert_eq!(sizes, vec![0, 3, 3]);
    let after = run.means()[0].as_slice();
    assert_eq!(after.iter().map(|x| x.to_bits()).collect::<Vec<_>>(), vec![before[0].to_bits()]);

    let ids = relation.ids();
    let moved = [2, 3].map(|i| ids.get(i).map(|id| run.assignment().get(id)));
    assert_eq!(moved, [Some(1), Some(2)]);
    common::assert_close(run.means()[1].as_slice(), &[11.0 / 3.0]);
    common::assert_close(run.means()[2].as_slice(), &[19.0 / 3.0]);

    // A full run settles with the emptied cluster still present.
    let clustering = config.run(&relation)?;
    assert_eq!(clustering.termination(), Termination::Converged);
    assert!(clustering.clusters()[0].is_empty());
    assert_float_eq!(clustering.clusters()[0].mean()[0], 5.0, abs <= 0.0);
    Ok(())
}

#[test]
fn invalid_configurations_are_rejected() -> TestResult {
    let relation = common::data_gen::tabular(10, 2, 0)?;
    let invalid = |r: dmine::Result<dmine::kmeans::Clustering>| matches!(r, Err(dmine::Error::InvalidConfiguration(_)));

    assert!(invalid(BatchedLloyd::new(0, Euclidean, FirstK).run(&relation)));
    assert!(invalid(BatchedLloyd::new(11, Euclidean, FirstK).with_blocking(Blocking::FullPass).run(&relation)));
    assert!(invalid(BatchedLloyd::new(2, Euclidean, FirstK).with_blocks(1).run(&relation)));
    assert!(invalid(BatchedLloyd::new(2, Euclidean, FirstK).with_blocks(11).run(&relation)));
    assert!(invalid(
        BatchedLloyd::new(2, Euclidean, PredefinedMeans(vec![vec![0.0, 0.0]])).run(&relation)
    ));
    assert!(invalid(
        BatchedLloyd::new(2, Euclidean, PredefinedMeans(vec![vec![0.0, 0.0], vec![1.0, 1.0, 1.0]])).run(&relation)
    ));
    assert!(matches!(
        BatchedLloyd::new(2, Euclidean, PredefinedMeans(vec![vec![0.0, 0.0], vec![f64::NAN, 1.0]])).run(&relation),
        Err(dmine::Error::ArithmeticAnomaly(_))
    ));
    assert!(matches!(
        BatchedLloyd::new(2, GeneralPath(Euclidean), KMeansPlusPlus { seed: 0 }).run(&relation),
        Err(dmine::Error::InitializerFailure(InitializerError::Unsupported(_)))
    ));
    Ok(())
}

#[test]
fn unseeded_runs_work() -> TestResult {
    let relation = common::data_gen::three_blobs(2)?;
    let clustering = BatchedLloyd::new(3, Euclidean, FirstK).run(&relation)?;
    assert_eq!(clustering.len(), 3);
    assert_eq!(clustering.labels(&relation).into_iter().flatten().count(), relation.len());
    Ok(())
}
