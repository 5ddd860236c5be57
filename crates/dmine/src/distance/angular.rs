//! Angular distances between feature vectors.

use super::{DistanceFunction, PrimitiveDoubleDistance};

/// Cosine distance: `1 - cos(θ)` where `θ` is the angle between the two vectors.
///
/// The result lies in `[0, 2]`. Two zero vectors are at distance 0; a zero vector and a non-zero vector are at distance 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cosine;

impl PrimitiveDoubleDistance for Cosine {
    fn double_distance(&self, x: &[f64], y: &[f64]) -> f64 {
        let (xy, xx, yy) = x
            .iter()
            .zip(y)
            .fold((0.0, 0.0, 0.0), |(xy, xx, yy), (&a, &b)| (a.mul_add(b, xy), a.mul_add(a, xx), b.mul_add(b, yy)));
        if xx == 0.0 && yy == 0.0 {
            0.0
        } else if xx == 0.0 || yy == 0.0 {
            1.0
        } else {
            (1.0 - xy / (xx * yy).sqrt()).clamp(0.0, 2.0)
        }
    }
}

impl DistanceFunction for Cosine {
    type Value = f64;

    fn name(&self) -> String {
        "Cosine".to_string()
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        self.double_distance(x, y)
    }

    fn as_primitive(&self) -> Option<&dyn PrimitiveDoubleDistance> {
        Some(self)
    }
}
