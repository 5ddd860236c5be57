//! Lp-norm distances between feature vectors.
//!
//! All of these offer the primitive `f64` fast path. Vectors are expected to have the same dimensionality; extra coordinates of the longer vector are ignored.

use super::{DistanceFunction, PrimitiveDoubleDistance};

/// Implements [`DistanceFunction`] for a metric whose general distance value is its primitive one.
macro_rules! primitive_distance_function {
    ($ty:ty, $name:literal) => {
        impl DistanceFunction for $ty {
            type Value = f64;

            fn name(&self) -> String {
                $name.to_string()
            }

            fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
                self.double_distance(x, y)
            }

            fn as_primitive(&self) -> Option<&dyn PrimitiveDoubleDistance> {
                Some(self)
            }
        }
    };
}

/// Squared Euclidean distance: the sum of squared coordinate differences.
///
/// It orders neighbors exactly like [`Euclidean`] without the square root, which makes it the cheapest choice for k-means assignment.
#[derive(Clone, Copy, Debug, Default)]
pub struct SquaredEuclidean;

impl PrimitiveDoubleDistance for SquaredEuclidean {
    fn double_distance(&self, x: &[f64], y: &[f64]) -> f64 {
        x.iter().zip(y).map(|(a, b)| a - b).map(|d| d * d).sum()
    }

    fn is_squared(&self) -> bool {
        true
    }
}

primitive_distance_function!(SquaredEuclidean, "SquaredEuclidean");

/// Euclidean distance, also known as the L2-norm of the difference.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean;

impl PrimitiveDoubleDistance for Euclidean {
    fn double_distance(&self, x: &[f64], y: &[f64]) -> f64 {
        SquaredEuclidean.double_distance(x, y).sqrt()
    }
}

primitive_distance_function!(Euclidean, "Euclidean");

/// Manhattan distance, also known as the L1-norm, taxicab or city-block distance.
#[derive(Clone, Copy, Debug, Default)]
pub struct Manhattan;

impl PrimitiveDoubleDistance for Manhattan {
    fn double_distance(&self, x: &[f64], y: &[f64]) -> f64 {
        x.iter().zip(y).map(|(a, b)| (a - b).abs()).sum()
    }
}

primitive_distance_function!(Manhattan, "Manhattan");

/// Chebyshev distance, also known as the L∞-norm: the largest absolute coordinate difference.
///
/// The distance between two empty vectors is zero. A NaN coordinate makes the distance NaN.
#[derive(Clone, Copy, Debug, Default)]
pub struct Chebyshev;

impl PrimitiveDoubleDistance for Chebyshev {
    fn double_distance(&self, x: &[f64], y: &[f64]) -> f64 {
        x.iter()
            .zip(y)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, |acc, d| if d.is_nan() || d > acc { d } else { acc })
    }
}

primitive_distance_function!(Chebyshev, "Chebyshev");

/// Generic Minkowski distance: the p-th root of the sum of absolute coordinate differences raised to the power `p`.
///
/// `p` should be at least 1 for the result to be a metric.
#[derive(Clone, Copy, Debug)]
pub struct Minkowski {
    /// The order of the norm.
    pub p: f64,
}

impl PrimitiveDoubleDistance for Minkowski {
    fn double_distance(&self, x: &[f64], y: &[f64]) -> f64 {
        x.iter()
            .zip(y)
            .map(|(a, b)| (a - b).abs().powf(self.p))
            .sum::<f64>()
            .powf(self.p.recip())
    }
}

impl DistanceFunction for Minkowski {
    type Value = f64;

    fn name(&self) -> String {
        format!("Minkowski(p={})", self.p)
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        self.double_distance(x, y)
    }

    fn as_primitive(&self) -> Option<&dyn PrimitiveDoubleDistance> {
        Some(self)
    }
}
