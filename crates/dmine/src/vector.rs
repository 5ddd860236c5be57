//! Mutable mean vectors.

/// A mutable numeric vector, used for the mean of a cluster.
///
/// The operations are the in-place updates needed for incremental means: scaled accumulation (`v += s·w`), scaling (`v *= s`), and scaled replacement
/// (`v = s·w`).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct MeanVector(Vec<f64>);

impl MeanVector {
    /// Creates the zero vector of dimensionality `dim`.
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0.0; dim])
    }

    /// Copies the coordinates of `v`.
    pub fn from_slice(v: &[f64]) -> Self {
        Self(v.to_vec())
    }

    /// Creates `s·w`.
    pub fn from_scaled(w: &[f64], s: f64) -> Self {
        Self(w.iter().map(|&x| x * s).collect())
    }

    /// Returns the number of coordinates.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.0.len()
    }

    /// Computes `self += s·w` in place.
    ///
    /// Coordinates beyond the shorter of the two vectors are left untouched.
    pub fn plus_times_assign(&mut self, w: &[f64], s: f64) -> &mut Self {
        for (x, &y) in self.0.iter_mut().zip(w) {
            *x = y.mul_add(s, *x);
        }
        self
    }

    /// Computes `self += w` in place.
    pub fn plus_assign(&mut self, w: &[f64]) -> &mut Self {
        for (x, &y) in self.0.iter_mut().zip(w) {
            *x += y;
        }
        self
    }

    /// Computes `self -= w` in place.
    pub fn minus_assign(&mut self, w: &[f64]) -> &mut Self {
        for (x, &y) in self.0.iter_mut().zip(w) {
            *x -= y;
        }
        self
    }

    /// Computes `self *= s` in place.
    pub fn times_assign(&mut self, s: f64) -> &mut Self {
        for x in &mut self.0 {
            *x *= s;
        }
        self
    }

    /// Replaces the coordinates with `s·w`.
    pub fn set_scaled(&mut self, w: &[f64], s: f64) -> &mut Self {
        self.0.clear();
        self.0.extend(w.iter().map(|&x| x * s));
        self
    }

    /// Sets every coordinate to zero, keeping the allocation.
    pub fn fill_zero(&mut self) {
        self.0.fill(0.0);
    }

    /// Whether every coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|x| x.is_finite())
    }

    /// Returns the coordinates.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consumes the vector and returns its coordinates.
    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl AsRef<[f64]> for MeanVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for MeanVector {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}
