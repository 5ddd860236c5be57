//! Data generation utilities for testing.

use dmine::Relation;

/// Three well separated Gaussian blobs of 50 points each in two dimensions.
pub fn three_blobs(seed: u64) -> Result<Relation<Vec<f64>>, String> {
    let centers = vec![vec![0.0, 0.0], vec![20.0, 0.0], vec![0.0, 20.0]];
    let (points, _) = synthdata::gaussian_blobs(&centers, 50, 1.0, seed)?;
    Relation::from_vectors(points).map_err(|e| e.to_string())
}

/// `car` uniformly random points in `[-10, 10)^dim`.
pub fn tabular(car: usize, dim: usize, seed: u64) -> Result<Relation<Vec<f64>>, String> {
    Relation::from_vectors(synthdata::random_tabular_seedable(car, dim, -10.0, 10.0, seed)).map_err(|e| e.to_string())
}

/// The integer grid `[-max, max]²`.
pub fn grid(max: i32) -> Result<Relation<Vec<f64>>, String> {
    Relation::from_vectors(synthdata::grid(max)).map_err(|e| e.to_string())
}
