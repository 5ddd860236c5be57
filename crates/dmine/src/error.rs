//! Errors raised by the algorithms and data structures in this crate.

/// Errors raised while configuring or running an algorithm.
///
/// All of these are fatal to a run. Nothing is retried internally and no partial result is returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parameter or input is inconsistent, e.g. `k == 0`, fewer than two blocks, or mismatched dimensionalities.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A non-finite value was found in a coordinate, a mean, or a distance.
    #[error("arithmetic anomaly: {0}")]
    ArithmeticAnomaly(String),
    /// The initializer could not produce starting means.
    #[error("initializer failed: {0}")]
    InitializerFailure(#[from] InitializerError),
}

/// Errors raised by a [`KMeansInitialization`](crate::kmeans::KMeansInitialization).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitializerError {
    /// The relation holds fewer objects than the requested number of means.
    #[error("cannot choose {k} means from {n} objects")]
    TooFewObjects {
        /// The requested number of means.
        k: usize,
        /// The number of objects in the relation.
        n: usize,
    },
    /// The initializer needs a capability the distance function does not offer.
    #[error("{0}")]
    Unsupported(String),
    /// Any other failure reported by a user-provided initializer.
    #[error("{0}")]
    Other(String),
}

/// Convenient alias for results produced by this crate.
pub type Result<T> = core::result::Result<T, Error>;
