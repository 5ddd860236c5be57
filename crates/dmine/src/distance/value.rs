//! A trait for types that can be used as distance values.

use core::fmt::{Debug, Display};

/// A trait for types that can be used as distance values in clustering algorithms.
///
/// This is the general comparison path: values only need to be partially ordered and to provide an "infinite" sentinel from which a running minimum can
/// start. Primitive `f64` distances additionally get the fast path of [`PrimitiveDoubleDistance`](super::PrimitiveDoubleDistance).
#[must_use]
pub trait DistanceValue: PartialOrd + Clone + Debug + Display {
    /// A value that compares greater than every valid distance.
    fn infinite() -> Self;

    /// Whether the value cannot take part in comparisons, e.g. because it is NaN.
    fn is_invalid(&self) -> bool;
}

/// Implements `DistanceValue` for primitive float types.
macro_rules! impl_float_distance_value {
    ($($ty:ty),*) => {
        $(
            impl DistanceValue for $ty {
                fn infinite() -> Self {
                    <$ty>::INFINITY
                }

                fn is_invalid(&self) -> bool {
                    self.is_nan()
                }
            }
        )*
    };
}

impl_float_distance_value!(f32, f64);
