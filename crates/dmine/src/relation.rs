//! A dataset of feature vectors keyed by identifiers.

use crate::{
    Error, Result,
    ids::{DbId, DbIdFactory, DbIdRange, DbIds},
};

/// An ordered collection of feature vectors of one fixed dimensionality, each with its own [`DbId`].
///
/// The identifiers are a static range allocated when the relation is created, so looking up a vector by identifier is an offset computation. Algorithms only
/// ever read the vectors.
///
/// # Type Parameters
///
/// - `V`: The type of the feature vectors, e.g. `Vec<f64>` or `[f64; 2]`.
#[derive(Clone, Debug)]
#[must_use]
pub struct Relation<V> {
    /// The identifiers of the vectors, in order.
    ids: DbIdRange,
    /// The feature vectors.
    vectors: Vec<V>,
    /// The number of coordinates in every vector.
    dim: usize,
}

impl<V: AsRef<[f64]>> Relation<V> {
    /// Creates a relation, allocating identifiers for its vectors from `factory`.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if `vectors` is empty, if the vectors do not all have the same dimensionality, or if `factory` cannot allocate enough
    ///   identifiers.
    /// - `ArithmeticAnomaly` if any coordinate is not finite.
    pub fn new(factory: &DbIdFactory, vectors: Vec<V>) -> Result<Self> {
        let dim = vectors
            .first()
            .map(|v| v.as_ref().len())
            .ok_or_else(|| Error::InvalidConfiguration("Cannot create a Relation with no vectors.".to_string()))?;

        for (i, v) in vectors.iter().enumerate() {
            let v = v.as_ref();
            if v.len() != dim {
                return Err(Error::InvalidConfiguration(format!(
                    "Vector {i} has dimensionality {} but the first vector has {dim}",
                    v.len()
                )));
            }
            if let Some(j) = v.iter().position(|x| !x.is_finite()) {
                return Err(Error::ArithmeticAnomaly(format!("Coordinate {j} of vector {i} is {}", v[j])));
            }
        }

        let ids = factory.generate_static_range(vectors.len())?;
        ftlog::debug!("Created a relation with {} vectors of dimensionality {dim}", vectors.len());
        Ok(Self { ids, vectors, dim })
    }

    /// Creates a relation whose identifiers come from a fresh [`DbIdFactory`], i.e. `0..n`.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_vectors(vectors: Vec<V>) -> Result<Self> {
        Self::new(&DbIdFactory::new(), vectors)
    }

    /// Returns the feature vector of `id`, if `id` belongs to this relation.
    #[must_use]
    pub fn get(&self, id: DbId) -> Option<&[f64]> {
        self.ids.index_of(id).map(|i| self.vectors[i].as_ref())
    }

    /// Returns the feature vector of `id`.
    ///
    /// # Errors
    ///
    /// If `id` does not belong to this relation.
    pub fn try_get(&self, id: DbId) -> Result<&[f64]> {
        self.get(id)
            .ok_or_else(|| Error::InvalidConfiguration(format!("{id} does not belong to this relation")))
    }

    /// Iterates over the identifiers and feature vectors in order.
    pub fn iter(&self) -> impl Iterator<Item = (DbId, &[f64])> + '_ {
        self.ids.iter().zip(self.vectors.iter().map(AsRef::as_ref))
    }
}

impl<V> Relation<V> {
    /// Returns the identifiers of the vectors.
    pub const fn ids(&self) -> &DbIdRange {
        &self.ids
    }

    /// Returns the feature vectors in order.
    #[must_use]
    pub fn vectors(&self) -> &[V] {
        &self.vectors
    }

    /// Returns the number of vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Returns whether the relation holds no vectors. Always `false`, since relations cannot be created empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Returns the number of coordinates in every vector.
    #[must_use]
    pub const fn dimensionality(&self) -> usize {
        self.dim
    }
}
