use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::traits::Classifier;
use super::utils::argmax;

/// Exported state of a fitted linear classifier (e.g. a linear SVM).
///
/// Two classes use a single coefficient row and a sign decision; three or
/// more classes use one one-vs-rest row per class. Weights are kept in
/// double precision so scores near a tie resolve the way the fitted model
/// does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearParams {
    /// Class codes in model order; stored as numbers, must be integral
    pub classes: Vec<f64>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct LinearClassifier {
    classes: Vec<i64>,
    coef: Array2<f64>,
    intercept: Array1<f64>,
}

impl LinearClassifier {
    /// Validates exported parameters and packs them into dense arrays.
    pub fn from_params(params: LinearParams) -> Result<Self, ModelError> {
        if params.classes.len() < 2 {
            return Err(ModelError::InvalidArtifact(format!(
                "A classifier needs at least 2 classes, found {}",
                params.classes.len()
            )));
        }
        let classes = params
            .classes
            .iter()
            .map(|&c| {
                if c.is_finite() && c.fract() == 0.0 {
                    Ok(c as i64)
                } else {
                    Err(ModelError::InvalidArtifact(format!("Class label {} is not an integer", c)))
                }
            })
            .collect::<Result<Vec<i64>, _>>()?;

        let expected_rows = if classes.len() == 2 { 1 } else { classes.len() };
        if params.coef.len() != expected_rows {
            return Err(ModelError::InvalidArtifact(format!(
                "Expected {} coefficient rows for {} classes, found {}",
                expected_rows,
                classes.len(),
                params.coef.len()
            )));
        }
        if params.intercept.len() != expected_rows {
            return Err(ModelError::InvalidArtifact(format!(
                "Expected {} intercepts, found {}",
                expected_rows,
                params.intercept.len()
            )));
        }

        let width = params.coef[0].len();
        if width == 0 || params.coef.iter().any(|row| row.len() != width) {
            return Err(ModelError::InvalidArtifact(
                "Coefficient rows must be non-empty and of equal length".into(),
            ));
        }
        if params
            .coef
            .iter()
            .flatten()
            .chain(params.intercept.iter())
            .any(|v| !v.is_finite())
        {
            return Err(ModelError::InvalidArtifact("Model weights contain non-finite values".into()));
        }

        let coef = Array2::from_shape_vec(
            (expected_rows, width),
            params.coef.into_iter().flatten().collect(),
        )
        .map_err(|e| ModelError::InvalidArtifact(format!("Failed to pack coefficients: {}", e)))?;

        Ok(Self {
            classes,
            coef,
            intercept: Array1::from(params.intercept),
        })
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Raw scores `features . coef^T + intercept`, one row per input row.
    /// Features are widened to `f64` before scoring.
    pub fn decision_function(&self, features: ArrayView2<'_, f32>) -> Result<Array2<f64>, ModelError> {
        if features.ncols() != self.coef.ncols() {
            return Err(ModelError::ValidationError(format!(
                "Expected {} features, got {}",
                self.coef.ncols(),
                features.ncols()
            )));
        }
        let mut scores = features.mapv(f64::from).dot(&self.coef.t());
        for mut row in scores.rows_mut() {
            row += &self.intercept;
        }
        Ok(scores)
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, features: ArrayView2<'_, f32>) -> Result<Vec<i64>, ModelError> {
        let scores = self.decision_function(features)?;
        scores
            .rows()
            .into_iter()
            .map(|row| {
                if self.classes.len() == 2 {
                    Ok(if row[0] > 0.0 { self.classes[1] } else { self.classes[0] })
                } else {
                    argmax(&row.to_vec())
                        .map(|i| self.classes[i])
                        .ok_or_else(|| ModelError::PredictionError("Empty decision row".into()))
                }
            })
            .collect()
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coef.ncols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn three_class() -> LinearClassifier {
        LinearClassifier::from_params(LinearParams {
            classes: vec![-1.0, 0.0, 1.0],
            coef: vec![vec![-1.0, 2.0], vec![0.0, 0.0], vec![2.0, -1.0]],
            intercept: vec![0.0, 0.1, 0.0],
        })
        .unwrap()
    }

    #[test]
    fn test_multiclass_argmax() {
        let model = three_class();
        assert_eq!(model.classes(), &[-1, 0, 1]);
        let x = array![[1.0f32, 0.0], [0.0, 1.0], [0.0, 0.0]];
        assert_eq!(model.predict(x.view()).unwrap(), vec![1, -1, 0]);
    }

    #[test]
    fn test_binary_sign_decision() {
        let model = LinearClassifier::from_params(LinearParams {
            classes: vec![0.0, 1.0],
            coef: vec![vec![1.0, -1.0]],
            intercept: vec![0.0],
        })
        .unwrap();
        let x = array![[2.0f32, 1.0], [1.0, 2.0], [1.0, 1.0]];
        // a zero score falls to the first class
        assert_eq!(model.predict(x.view()).unwrap(), vec![1, 0, 0]);
    }

    #[test]
    fn test_scores_in_double_precision() {
        // The intercept rounds to -1.0 in single precision, which would tie
        let model = LinearClassifier::from_params(LinearParams {
            classes: vec![-1.0, 1.0],
            coef: vec![vec![1.0]],
            intercept: vec![-1.0 + 1e-9],
        })
        .unwrap();
        let x = array![[1.0f32]];
        let scores = model.decision_function(x.view()).unwrap();
        assert!(scores[[0, 0]] > 0.0);
        assert_eq!(model.predict(x.view()).unwrap(), vec![1]);
    }

    #[test]
    fn test_wrong_feature_width() {
        let model = three_class();
        let x = array![[1.0f32, 0.0, 0.0]];
        assert!(matches!(model.predict(x.view()), Err(ModelError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let bad = vec![
            LinearParams { classes: vec![1.0], coef: vec![vec![1.0]], intercept: vec![0.0] },
            LinearParams { classes: vec![0.5, 1.0], coef: vec![vec![1.0]], intercept: vec![0.0] },
            LinearParams { classes: vec![-1.0, 0.0, 1.0], coef: vec![vec![1.0]], intercept: vec![0.0] },
            LinearParams { classes: vec![0.0, 1.0], coef: vec![vec![1.0]], intercept: vec![] },
            LinearParams {
                classes: vec![-1.0, 0.0, 1.0],
                coef: vec![vec![1.0], vec![1.0, 2.0], vec![1.0]],
                intercept: vec![0.0, 0.0, 0.0],
            },
            LinearParams { classes: vec![0.0, 1.0], coef: vec![vec![f64::NAN]], intercept: vec![0.0] },
        ];
        for params in bad {
            assert!(matches!(
                LinearClassifier::from_params(params),
                Err(ModelError::InvalidArtifact(_))
            ));
        }
    }
}
