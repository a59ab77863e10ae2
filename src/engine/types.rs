use thiserror::Error;

/// Output of one k-means run over N input vectors.
///
/// `labels[i]` and `distances[i]` describe the i-th input vector, so callers
/// can pair results with their own point identifiers by position without any
/// further lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansOutput {
    /// K centroids, indexed by label.
    pub centroids: Vec<Vec<f64>>,
    /// Assigned centroid index in `[0, K)` per input vector.
    pub labels: Vec<usize>,
    /// Euclidean distance from each input vector to its assigned centroid.
    pub distances: Vec<f64>,
    /// Number of assign/recompute passes actually run.
    pub iterations: usize,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid clustering input: {0}")]
    InvalidInput(String),
}
