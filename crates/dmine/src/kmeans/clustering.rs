//! The result of a k-means run.

use crate::{
    Error, Relation, Result,
    distance::{DistanceFunction, DistanceValue, PrimitiveDoubleDistance, SquaredEuclidean},
    heap::{DoubleKnnHeap, KnnHeap, NeighborHeap},
    ids::{DbIds, HashSetDbIds},
    store::{IntegerStorage, IntegerStore},
};

/// Why a k-means run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// A full pass over all blocks changed no assignment.
    Converged,
    /// The iteration cap was reached before convergence.
    IterationCapReached,
    /// The run was cancelled between two blocks.
    Cancelled,
}

impl Termination {
    /// Whether the run converged.
    #[must_use]
    pub const fn is_converged(self) -> bool {
        matches!(self, Self::Converged)
    }
}

/// The model of a k-means cluster: its mean.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KMeansModel {
    /// The final mean of the cluster.
    mean: Vec<f64>,
}

impl KMeansModel {
    /// Creates a model with the given mean.
    #[must_use]
    pub const fn new(mean: Vec<f64>) -> Self {
        Self { mean }
    }

    /// Returns the mean.
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }
}

/// A cluster: its member identifiers and its model.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cluster {
    /// A human-readable name for the cluster.
    name: String,
    /// The members of the cluster.
    ids: HashSetDbIds,
    /// The model of the cluster.
    model: KMeansModel,
}

impl Cluster {
    /// Creates a cluster.
    #[must_use]
    pub const fn new(name: String, ids: HashSetDbIds, model: KMeansModel) -> Self {
        Self { name, ids, model }
    }

    /// Returns the name of the cluster.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the members of the cluster.
    #[must_use]
    pub const fn ids(&self) -> &HashSetDbIds {
        &self.ids
    }

    /// Returns the model of the cluster.
    #[must_use]
    pub const fn model(&self) -> &KMeansModel {
        &self.model
    }

    /// Returns the mean of the cluster.
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        self.model.mean()
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns whether the cluster has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A partition of a relation into `k` clusters, as produced by a k-means run.
///
/// Cluster `i` is the cluster of mean `i`. Clusters may be empty.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct Clustering {
    /// The clusters, in mean order.
    clusters: Vec<Cluster>,
    /// The number of full passes performed.
    iterations: usize,
    /// Why the run stopped.
    termination: Termination,
}

impl Clustering {
    /// Creates a clustering.
    pub const fn new(clusters: Vec<Cluster>, iterations: usize, termination: Termination) -> Self {
        Self {
            clusters,
            iterations,
            termination,
        }
    }

    /// Returns the clusters in mean order.
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Consumes the clustering and returns the clusters.
    #[must_use]
    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }

    /// Returns the number of clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Returns whether there are no clusters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Returns the number of full passes over the data that were performed.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Returns why the run stopped.
    #[must_use]
    pub const fn termination(&self) -> Termination {
        self.termination
    }

    /// Returns the means of the clusters in order.
    #[must_use]
    pub fn means(&self) -> Vec<&[f64]> {
        self.clusters.iter().map(Cluster::mean).collect()
    }

    /// Returns the cluster index of every object of `relation`, in relation order.
    ///
    /// Objects that are not a member of any cluster get `None`.
    #[must_use]
    pub fn labels<V: AsRef<[f64]>>(&self, relation: &Relation<V>) -> Vec<Option<usize>> {
        let mut store = IntegerStorage::for_range(*relation.ids(), -1);
        for (i, cluster) in self.clusters.iter().enumerate() {
            // Cluster indices fit in an `i32` because the engine stores them in one.
            #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let label = i as i32;
            for id in cluster.ids.iter().filter(|&id| relation.get(id).is_some()) {
                store.put(id, label);
            }
        }
        relation
            .ids()
            .iter()
            .map(|id| usize::try_from(store.get(id)).ok())
            .collect()
    }

    /// Returns the sum over all clusters of the squared Euclidean distances from the members to their mean.
    ///
    /// # Errors
    ///
    /// If a member of a cluster does not belong to `relation`.
    pub fn variance_sum<V: AsRef<[f64]>>(&self, relation: &Relation<V>) -> Result<f64> {
        self.clusters.iter().try_fold(0.0, |total, cluster| {
            cluster.ids.iter().try_fold(total, |total, id| {
                relation
                    .try_get(id)
                    .map(|v| total + SquaredEuclidean.double_distance(v, cluster.mean()))
            })
        })
    }

    /// Returns the indices of the `n` clusters whose means are nearest to `query`, nearest first.
    ///
    /// The primitive path of `distance` is used when it has one. Equal distances are ordered by cluster index.
    ///
    /// # Errors
    ///
    /// If a distance is NaN (or otherwise invalid).
    pub fn nearest_clusters<D: DistanceFunction>(&self, query: &[f64], n: usize, distance: &D) -> Result<Vec<usize>> {
        let invalid = |i: usize| Error::ArithmeticAnomaly(format!("distance from the query to mean {i} is not a number"));

        if let Some(df) = distance.as_primitive() {
            let mut heap = DoubleKnnHeap::new(n);
            for (i, cluster) in self.clusters.iter().enumerate() {
                let d = df.double_distance(query, cluster.mean());
                if d.is_nan() {
                    return Err(invalid(i));
                }
                heap.push(i, d);
            }
            Ok(heap.into_sorted_vec().into_iter().map(|(i, _)| i).collect())
        } else {
            let mut heap = KnnHeap::new(n);
            for (i, cluster) in self.clusters.iter().enumerate() {
                let d = distance.distance(query, cluster.mean());
                if d.is_invalid() {
                    return Err(invalid(i));
                }
                heap.push(i, (d, i));
            }
            Ok(heap.into_sorted_vec().into_iter().map(|(i, _)| i).collect())
        }
    }
}
