//! Distance functions between feature vectors.
//!
//! A [`DistanceFunction`] returns a general, partially ordered [`DistanceValue`]. Functions whose distances are plain `f64`s also implement
//! [`PrimitiveDoubleDistance`] and advertise it through [`DistanceFunction::as_primitive`]; algorithms probe for it once and then use raw `f64` comparisons on
//! their hot path. See [`NearestStrategy`].

mod angular;
mod minkowski;
mod strategy;
mod value;

pub use angular::Cosine;
pub use minkowski::{Chebyshev, Euclidean, Manhattan, Minkowski, SquaredEuclidean};
pub use strategy::NearestStrategy;
pub use value::DistanceValue;

/// A distance function between two feature vectors of the same dimensionality.
pub trait DistanceFunction {
    /// The type of distance values this function produces.
    type Value: DistanceValue;

    /// Returns a name for the distance function, for diagnostics.
    fn name(&self) -> String;

    /// Computes the distance between `x` and `y`.
    fn distance(&self, x: &[f64], y: &[f64]) -> Self::Value;

    /// Returns the primitive `f64` fast path of this function, if it has one.
    ///
    /// Both paths must order any pair of distances the same way.
    fn as_primitive(&self) -> Option<&dyn PrimitiveDoubleDistance> {
        None
    }
}

/// The primitive fast path of a distance function: distances as raw `f64`s.
pub trait PrimitiveDoubleDistance: Send + Sync {
    /// Computes the distance between `x` and `y`.
    fn double_distance(&self, x: &[f64], y: &[f64]) -> f64;

    /// Whether the distance is already the square of a metric, as with [`SquaredEuclidean`].
    fn is_squared(&self) -> bool {
        false
    }
}

/// Hides the primitive fast path of the wrapped function, so that algorithms use the general comparison path.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeneralPath<D>(pub D);

impl<D: DistanceFunction> DistanceFunction for GeneralPath<D> {
    type Value = D::Value;

    fn name(&self) -> String {
        format!("GeneralPath({})", self.0.name())
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> Self::Value {
        self.0.distance(x, y)
    }
}

// Blanket implementations of `DistanceFunction` for references and boxes.
impl<D: DistanceFunction + ?Sized> DistanceFunction for &D {
    type Value = D::Value;

    fn name(&self) -> String {
        (**self).name()
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> Self::Value {
        (**self).distance(x, y)
    }

    fn as_primitive(&self) -> Option<&dyn PrimitiveDoubleDistance> {
        (**self).as_primitive()
    }
}

impl<D: DistanceFunction + ?Sized> DistanceFunction for Box<D> {
    type Value = D::Value;

    fn name(&self) -> String {
        (**self).name()
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> Self::Value {
        (**self).distance(x, y)
    }

    fn as_primitive(&self) -> Option<&dyn PrimitiveDoubleDistance> {
        (**self).as_primitive()
    }
}
