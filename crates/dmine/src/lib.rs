//! Data mining over vector relations, starting with k-means.
//!
//! We provide an identifier layer for the objects of a dataset, per-object integer stores, distance functions with an optional primitive fast path, and
//! K-Means clustering by batched Lloyd iterations.
//!
//! ## Modules
//!
//! - [`ids`]: Object identifiers, identifier ranges and collections, and the seeded random partitioner.
//! - [`store`]: Per-object integer stores, dense over identifier ranges and sparse otherwise.
//! - [`distance`]: Distance functions, general distance values, and the nearest-mean search.
//! - [`heap`]: Bounded heaps for nearest-neighbor bookkeeping.
//! - [`kmeans`]: The batched Lloyd engine, its initializers, observers and results.
//!
//! ## Features
//!
//! - `serde`: Enables serialization and deserialization of identifiers, settings and clusterings using the [`serde`] crate.
//! - `all`: Enables the `serde` feature.

pub mod distance;
mod error;
pub mod heap;
pub mod ids;
pub mod kmeans;
mod relation;
pub mod store;
mod vector;

pub use error::{Error, InitializerError, Result};
pub use relation::Relation;
pub use vector::MeanVector;
