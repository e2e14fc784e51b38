use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use ndarray::{Array1, Array2};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::traits::Vectorizer;
use super::utils::{l1_normalize, l2_normalize};

/// Default token pattern of a word-level TF-IDF vectorizer: runs of two or
/// more word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Row normalization applied after TF-IDF weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// Exported state of a fitted word-level TF-IDF vectorizer.
///
/// This is the on-disk shape of the vectorizer artifact. Only `vocabulary`
/// is required; every other field falls back to the usual fitting default.
/// Settings that change how text is analyzed are read explicitly so that an
/// export relying on one this vectorizer cannot reproduce is rejected rather
/// than silently tokenized as plain words. Fit-time keys such as `min_df` or
/// `max_features` are already reflected in `vocabulary` and are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfParams {
    /// Term to column index
    pub vocabulary: HashMap<String, usize>,
    /// Only `"word"` is supported
    #[serde(default)]
    pub analyzer: Option<String>,
    /// Accent stripping is not supported; must be absent or null
    #[serde(default)]
    pub strip_accents: Option<String>,
    /// Custom callables cannot be exported; must be absent or null
    #[serde(default)]
    pub preprocessor: Option<serde_json::Value>,
    #[serde(default)]
    pub tokenizer: Option<serde_json::Value>,
    /// Inverse document frequency per column, absent when idf was disabled
    #[serde(default)]
    pub idf: Option<Vec<f32>>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    /// Inclusive `(min_n, max_n)` range of word n-grams
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: Option<Vec<String>>,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub binary: bool,
}

fn default_lowercase() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// A fitted TF-IDF vectorizer ready to transform text.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Option<Array1<f32>>,
    lowercase: bool,
    token_pattern: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    norm: Option<Norm>,
    sublinear_tf: bool,
    binary: bool,
}

impl TfidfVectorizer {
    /// Validates exported parameters and compiles them into a vectorizer.
    ///
    /// # Errors
    /// `InvalidArtifact` if the analyzer is anything but word-level with no
    /// accent stripping or custom callables, if the vocabulary is empty or its indices are not a
    /// permutation of `0..len`, if `idf` has the wrong length or holds
    /// non-finite values, if the n-gram range is empty, or if the token
    /// pattern does not compile or has more than one capture group.
    pub fn from_params(params: TfidfParams) -> Result<Self, ModelError> {
        check_analysis_supported(&params)?;

        let n_features = params.vocabulary.len();
        if n_features == 0 {
            return Err(ModelError::InvalidArtifact("Vocabulary is empty".into()));
        }

        let mut seen = vec![false; n_features];
        for (term, &index) in &params.vocabulary {
            if index >= n_features {
                return Err(ModelError::InvalidArtifact(format!(
                    "Vocabulary index {} for term '{}' is out of range (size {})",
                    index, term, n_features
                )));
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(ModelError::InvalidArtifact(format!(
                    "Vocabulary index {} is assigned to more than one term",
                    index
                )));
            }
        }

        if let Some(idf) = &params.idf {
            if idf.len() != n_features {
                return Err(ModelError::InvalidArtifact(format!(
                    "idf has {} entries but vocabulary has {}",
                    idf.len(),
                    n_features
                )));
            }
            if idf.iter().any(|v| !v.is_finite()) {
                return Err(ModelError::InvalidArtifact("idf contains non-finite values".into()));
            }
        }

        let (min_n, max_n) = params.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelError::InvalidArtifact(format!(
                "Invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        let token_pattern = Regex::new(&params.token_pattern).map_err(|e| {
            ModelError::InvalidArtifact(format!("Invalid token_pattern: {}", e))
        })?;
        if token_pattern.captures_len() > 2 {
            return Err(ModelError::InvalidArtifact(
                "token_pattern may contain at most one capturing group".into(),
            ));
        }

        Ok(Self {
            vocabulary: params.vocabulary,
            idf: params.idf.map(Array1::from),
            lowercase: params.lowercase,
            token_pattern,
            ngram_range: params.ngram_range,
            stop_words: params.stop_words.unwrap_or_default().into_iter().collect(),
            norm: params.norm,
            sublinear_tf: params.sublinear_tf,
            binary: params.binary,
        })
    }

    /// Splits a document into the terms looked up in the vocabulary.
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let text: Cow<'_, str> = if self.lowercase {
            Cow::Owned(document.to_lowercase())
        } else {
            Cow::Borrowed(document)
        };

        // A single capturing group selects the token, as in the fitted pattern
        let tokens: Vec<&str> = if self.token_pattern.captures_len() == 2 {
            self.token_pattern
                .captures_iter(&text)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str())
                .collect()
        } else {
            self.token_pattern.find_iter(&text).map(|m| m.as_str()).collect()
        };
        let tokens: Vec<&str> = tokens
            .into_iter()
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        self.word_ngrams(&tokens)
    }

    fn word_ngrams(&self, tokens: &[&str]) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            terms.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        terms
    }
}

fn check_analysis_supported(params: &TfidfParams) -> Result<(), ModelError> {
    if let Some(analyzer) = params.analyzer.as_deref() {
        if analyzer != "word" {
            return Err(ModelError::InvalidArtifact(format!(
                "Unsupported analyzer '{}', only 'word' is supported",
                analyzer
            )));
        }
    }
    if let Some(strip_accents) = &params.strip_accents {
        return Err(ModelError::InvalidArtifact(format!(
            "Unsupported strip_accents '{}'",
            strip_accents
        )));
    }
    for (name, value) in [("preprocessor", &params.preprocessor), ("tokenizer", &params.tokenizer)] {
        if matches!(value, Some(v) if !v.is_null()) {
            return Err(ModelError::InvalidArtifact(format!(
                "Custom {} cannot be reproduced",
                name
            )));
        }
    }
    Ok(())
}

impl Vectorizer for TfidfVectorizer {
    fn transform(&self, documents: &[&str]) -> Result<Array2<f32>, ModelError> {
        let mut features = Array2::<f32>::zeros((documents.len(), self.n_features()));

        for (i, document) in documents.iter().enumerate() {
            let mut row = features.row_mut(i);
            for term in self.analyze(document) {
                if let Some(&column) = self.vocabulary.get(&term) {
                    row[column] += 1.0;
                }
            }

            if self.binary {
                row.mapv_inplace(|count| if count > 0.0 { 1.0 } else { 0.0 });
            } else if self.sublinear_tf {
                row.mapv_inplace(|count| if count > 0.0 { 1.0 + count.ln() } else { 0.0 });
            }
            if let Some(idf) = &self.idf {
                row *= idf;
            }
            match self.norm {
                Some(Norm::L2) => l2_normalize(row),
                Some(Norm::L1) => l1_normalize(row),
                None => {}
            }
        }

        Ok(features)
    }

    fn n_features(&self) -> usize {
        self.vocabulary.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> TfidfParams {
        serde_json::from_value(value).unwrap()
    }

    fn vectorizer(value: serde_json::Value) -> TfidfVectorizer {
        TfidfVectorizer::from_params(params(value)).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let p = params(json!({ "vocabulary": { "good": 0 } }));
        assert!(p.lowercase);
        assert_eq!(p.token_pattern, DEFAULT_TOKEN_PATTERN);
        assert_eq!(p.ngram_range, (1, 1));
        assert_eq!(p.norm, Some(Norm::L2));
        assert!(p.idf.is_none());
        assert!(!p.sublinear_tf);
    }

    #[test]
    fn test_explicit_null_norm() {
        let p = params(json!({ "vocabulary": { "good": 0 }, "norm": null }));
        assert_eq!(p.norm, None);
    }

    #[test]
    fn test_analyze_drops_single_characters_and_lowercases() {
        let v = vectorizer(json!({ "vocabulary": { "good": 0 } }));
        assert_eq!(v.analyze("A GOOD day, I think!"), vec!["good", "day", "think"]);
    }

    #[test]
    fn test_analyze_ngrams_and_stop_words() {
        let v = vectorizer(json!({
            "vocabulary": { "good": 0 },
            "ngram_range": [1, 2],
            "stop_words": ["the"]
        }));
        assert_eq!(
            v.analyze("the movie was good"),
            vec!["movie", "was", "good", "movie was", "was good"]
        );
    }

    #[test]
    fn test_analyze_capture_group() {
        let v = vectorizer(json!({
            "vocabulary": { "good": 0 },
            "token_pattern": r"#(\w+)"
        }));
        assert_eq!(v.analyze("#good and #bad"), vec!["good", "bad"]);
    }

    #[test]
    fn test_transform_counts_idf_and_l2() {
        let v = vectorizer(json!({
            "vocabulary": { "good": 0, "bad": 1, "movie": 2 },
            "idf": [1.0, 1.0, 2.0]
        }));
        let x = v.transform(&["good good movie", "nothing known here"]).unwrap();
        assert_eq!(x.shape(), &[2, 3]);
        // counts [2, 0, 1] * idf [1, 1, 2] = [2, 0, 2], normalized
        let expected = 1.0 / 2f32.sqrt();
        assert!((x[[0, 0]] - expected).abs() < 1e-6);
        assert_eq!(x[[0, 1]], 0.0);
        assert!((x[[0, 2]] - expected).abs() < 1e-6);
        assert!(x.row(1).iter().all(|&value| value == 0.0));
    }

    #[test]
    fn test_transform_sublinear_without_norm() {
        let v = vectorizer(json!({
            "vocabulary": { "good": 0 },
            "sublinear_tf": true,
            "norm": null
        }));
        let x = v.transform(&["good good good"]).unwrap();
        assert!((x[[0, 0]] - (1.0 + 3f32.ln())).abs() < 1e-6);
    }

    #[test]
    fn test_transform_binary_l1() {
        let v = vectorizer(json!({
            "vocabulary": { "good": 0, "movie": 1 },
            "binary": true,
            "norm": "l1"
        }));
        let x = v.transform(&["good good good movie"]).unwrap();
        assert!((x[[0, 0]] - 0.5).abs() < 1e-6);
        assert!((x[[0, 1]] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_word_analyzer_and_fit_keys_accepted() {
        let v = vectorizer(json!({
            "vocabulary": { "good": 0 },
            "analyzer": "word",
            "strip_accents": null,
            "preprocessor": null,
            "tokenizer": null,
            "min_df": 2,
            "max_features": 1000,
            "dtype": "float64"
        }));
        assert_eq!(v.analyze("good day"), vec!["good", "day"]);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let cases = vec![
            json!({ "vocabulary": {} }),
            json!({ "vocabulary": { "good": 1 } }),
            json!({ "vocabulary": { "good": 0, "bad": 0 } }),
            json!({ "vocabulary": { "good": 0 }, "idf": [1.0, 2.0] }),
            json!({ "vocabulary": { "good": 0 }, "ngram_range": [2, 1] }),
            json!({ "vocabulary": { "good": 0 }, "ngram_range": [0, 1] }),
            json!({ "vocabulary": { "good": 0 }, "token_pattern": "(unclosed" }),
            json!({ "vocabulary": { "good": 0 }, "token_pattern": r"(\w)(\w)" }),
            json!({ "vocabulary": { "caf": 0, "cafe": 1 }, "analyzer": "char", "strip_accents": "unicode" }),
            json!({ "vocabulary": { "good": 0 }, "analyzer": "char_wb" }),
            json!({ "vocabulary": { "good": 0 }, "strip_accents": "ascii" }),
            json!({ "vocabulary": { "good": 0 }, "tokenizer": "my_module.split" }),
            json!({ "vocabulary": { "good": 0 }, "preprocessor": { "callable": "clean" } }),
        ];
        for case in cases {
            let result = TfidfVectorizer::from_params(params(case.clone()));
            assert!(
                matches!(result, Err(ModelError::InvalidArtifact(_))),
                "expected rejection for {}",
                case
            );
        }
    }
}
