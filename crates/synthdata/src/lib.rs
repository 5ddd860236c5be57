//! Seedable synthetic datasets for exercising clustering algorithms.
//!
//! All generators are deterministic for a given seed. Rows are generated in parallel, each from its own RNG seeded by `seed + row_index`, so the output does
//! not depend on the number of threads.

use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

/// Generates `car` rows of `dim` values drawn uniformly from `[min, max)`.
///
/// # Panics
///
/// If `min >= max`.
#[must_use]
pub fn random_tabular_seedable(car: usize, dim: usize, min: f64, max: f64, seed: u64) -> Vec<Vec<f64>> {
    assert!(min < max, "min ({min}) must be less than max ({max})");
    (0..car)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            (0..dim).map(|_| rng.random_range(min..max)).collect()
        })
        .collect()
}

/// Generates isotropic Gaussian blobs around the given `centers`.
///
/// Returns the points and, for each point, the index of the center it was drawn around. Points are emitted blob by blob.
///
/// # Errors
///
/// - If `centers` is empty.
/// - If the centers do not all have the same dimensionality.
/// - If `std_dev` is negative or not finite.
pub fn gaussian_blobs(centers: &[Vec<f64>], per_blob: usize, std_dev: f64, seed: u64) -> Result<(Vec<Vec<f64>>, Vec<usize>), String> {
    let dim = centers.first().map(Vec::len).ok_or_else(|| "At least one center is required".to_string())?;
    if centers.iter().any(|c| c.len() != dim) {
        return Err("All centers must have the same dimensionality".to_string());
    }
    let normal = Normal::new(0.0, std_dev).map_err(|e| e.to_string())?;

    let points = centers
        .par_iter()
        .enumerate()
        .flat_map_iter(|(b, center)| {
            (0..per_blob).map(move |j| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add((b * per_blob + j) as u64));
                center.iter().map(|&c| c + normal.sample(&mut rng)).collect::<Vec<_>>()
            })
        })
        .collect::<Vec<_>>();
    let labels = (0..centers.len()).flat_map(|b| core::iter::repeat_n(b, per_blob)).collect();

    Ok((points, labels))
}

/// A two-dimensional integer grid `[-max, max]²`, row-major.
#[must_use]
pub fn grid(max: i32) -> Vec<Vec<f64>> {
    (-max..=max)
        .flat_map(|x| (-max..=max).map(move |y| vec![f64::from(x), f64::from(y)]))
        .collect()
}
