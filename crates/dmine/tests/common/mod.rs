//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub mod data_gen;

use dmine::{
    Relation,
    ids::{DbIds, HashSetDbIds},
};

/// Asserts that two vectors agree to within a relative tolerance of `1e-9`.
pub fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (&a, &e) in actual.iter().zip(expected) {
        let tolerance = 1e-9 * e.abs().max(1.0);
        assert!((a - e).abs() <= tolerance, "{actual:?} vs {expected:?}");
    }
}

/// The component-wise average of the members of `cluster`, or `None` for an empty cluster.
pub fn brute_force_mean(relation: &Relation<Vec<f64>>, cluster: &HashSetDbIds) -> Option<Vec<f64>> {
    if cluster.is_empty() {
        return None;
    }
    let mut sum = vec![0.0; relation.dimensionality()];
    for id in cluster.iter() {
        let v = relation.get(id)?;
        for (s, &x) in sum.iter_mut().zip(v) {
            *s += x;
        }
    }
    #[expect(clippy::cast_precision_loss)]
    let n = cluster.len() as f64;
    Some(sum.into_iter().map(|s| s / n).collect())
}

/// The index of the mean nearest to `v` under squared Euclidean distance, with ties going to the lowest index.
pub fn brute_force_nearest(v: &[f64], means: &[Vec<f64>]) -> usize {
    let mut best = (0, f64::INFINITY);
    for (i, m) in means.iter().enumerate() {
        let d = v.iter().zip(m).map(|(a, b)| (a - b) * (a - b)).sum::<f64>();
        if d < best.1 {
            best = (i, d);
        }
    }
    best.0
}
