//! Nearest-mean search with a distance path chosen once per run.

use crate::{Error, Result};

use super::{DistanceFunction, DistanceValue, PrimitiveDoubleDistance};

/// How to compare distances when searching for the nearest mean.
///
/// The variant is chosen once, before any search starts, by probing the distance function with [`DistanceFunction::as_primitive`]. Searches then run
/// without any per-comparison capability checks.
pub enum NearestStrategy<'a, D: DistanceFunction> {
    /// Raw `f64` comparisons starting from `f64::INFINITY`.
    Primitive(&'a dyn PrimitiveDoubleDistance),
    /// Comparisons of general distance values starting from [`DistanceValue::infinite`].
    General(&'a D),
}

impl<D: DistanceFunction> Clone for NearestStrategy<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: DistanceFunction> Copy for NearestStrategy<'_, D> {}

impl<D: DistanceFunction> core::fmt::Debug for NearestStrategy<'_, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Primitive(_) => f.write_str("Primitive"),
            Self::General(df) => write!(f, "General({})", df.name()),
        }
    }
}

impl<'a, D: DistanceFunction> NearestStrategy<'a, D> {
    /// Picks the primitive path if `distance` offers one, and the general path otherwise.
    pub fn select(distance: &'a D) -> Self {
        distance.as_primitive().map_or(Self::General(distance), Self::Primitive)
    }

    /// Uses the general path even if `distance` offers a primitive one.
    pub const fn general(distance: &'a D) -> Self {
        Self::General(distance)
    }

    /// Whether the primitive path was selected.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Returns the index of the mean nearest to `v`.
    ///
    /// Ties go to the lowest index: a later mean replaces the incumbent only if it is strictly closer. If every distance is infinite, the result is `0`.
    ///
    /// # Errors
    ///
    /// If any distance is NaN (or otherwise invalid).
    pub fn nearest<M: AsRef<[f64]>>(&self, v: &[f64], means: &[M]) -> Result<usize> {
        let mut min_index = 0;
        match self {
            Self::Primitive(df) => {
                let mut min_dist = f64::INFINITY;
                for (i, mean) in means.iter().enumerate() {
                    let dist = df.double_distance(v, mean.as_ref());
                    if dist.is_nan() {
                        return Err(invalid_distance(i));
                    }
                    if dist < min_dist {
                        min_index = i;
                        min_dist = dist;
                    }
                }
            }
            Self::General(df) => {
                let mut min_dist = D::Value::infinite();
                for (i, mean) in means.iter().enumerate() {
                    let dist = df.distance(v, mean.as_ref());
                    if dist.is_invalid() {
                        return Err(invalid_distance(i));
                    }
                    if dist < min_dist {
                        min_index = i;
                        min_dist = dist;
                    }
                }
            }
        }
        Ok(min_index)
    }
}

/// The error for an invalid distance to mean `i`.
fn invalid_distance(i: usize) -> Error {
    Error::ArithmeticAnomaly(format!("distance to mean {i} is not a number"))
}
