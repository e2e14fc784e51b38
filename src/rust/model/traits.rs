use ndarray::{Array2, ArrayView2};

use super::error::ModelError;

/// A pre-fitted transformer from raw text to a numeric feature matrix.
///
/// Implementations are loaded once and then only read, so `transform`
/// takes `&self` and must be safe to call from many threads at once.
pub trait Vectorizer: Send + Sync {
    /// Transforms `documents` into a matrix with one row per document and
    /// [`Vectorizer::n_features`] columns.
    fn transform(&self, documents: &[&str]) -> Result<Array2<f32>, ModelError>;

    /// Width of every row produced by [`Vectorizer::transform`].
    fn n_features(&self) -> usize;
}

/// A pre-fitted model mapping feature rows to discrete class codes.
pub trait Classifier: Send + Sync {
    /// Predicts one class code per row of `features`.
    fn predict(&self, features: ArrayView2<'_, f32>) -> Result<Vec<i64>, ModelError>;

    /// Expected input width, if the model records one.
    fn n_features(&self) -> Option<usize>;
}
