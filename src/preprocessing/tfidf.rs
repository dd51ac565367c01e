//! TF-IDF text vectorization.
//!
//! Reproduces the transform a fitted scikit-learn `TfidfVectorizer` applies
//! at inference time, from an exported vocabulary and idf table. Terms that
//! are not in the vocabulary are dropped.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::core::error::{Result, SentimentError};

fn default_token_pattern() -> String {
    r"(?u)\b\w\w+\b".to_string()
}

fn default_true() -> bool {
    true
}

fn default_ngram_range() -> [usize; 2] {
    [1, 1]
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// On-disk representation of a fitted vectorizer.
///
/// Options this transform does not implement (`stop_words`, `strip_accents`,
/// ...) are rejected rather than ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TfidfConfig {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f32>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: [usize; 2],
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
    #[serde(default)]
    pub binary: bool,
}

/// Sparse feature vector with entries sorted by column index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dot(&self, dense: &[f32]) -> f64 {
        self.entries
            .iter()
            .filter_map(|&(idx, value)| dense.get(idx).map(|w| *w as f64 * value as f64))
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    lowercase: bool,
    token_re: Regex,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Option<Norm>,
    binary: bool,
}

impl TfidfVectorizer {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TfidfConfig = serde_json::from_str(&content).map_err(|e| {
            SentimentError::ArtifactFormat(format!(
                "failed to parse vectorizer {}: {e}",
                path.display()
            ))
        })?;
        Self::from_config(config)
    }

    /// Validate an exported vectorizer and compile its token pattern.
    pub fn from_config(config: TfidfConfig) -> Result<Self> {
        let n_features = config.idf.len();
        if n_features == 0 {
            return Err(SentimentError::Capability(
                "vectorizer has an empty idf table".to_string(),
            ));
        }
        if config.idf.iter().any(|w| !w.is_finite()) {
            return Err(SentimentError::Capability(
                "vectorizer idf table contains non-finite weights".to_string(),
            ));
        }
        if let Some((term, idx)) = config.vocabulary.iter().find(|&(_, &idx)| idx >= n_features) {
            return Err(SentimentError::Capability(format!(
                "vocabulary term `{term}` maps to column {idx} but the idf table has {n_features} columns"
            )));
        }

        let [min_n, max_n] = config.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(SentimentError::ArtifactFormat(format!(
                "invalid ngram_range [{min_n}, {max_n}]"
            )));
        }

        Ok(Self {
            vocabulary: config.vocabulary,
            idf: config.idf,
            lowercase: config.lowercase,
            token_re: Regex::new(&config.token_pattern)?,
            ngram_range: (min_n, max_n),
            sublinear_tf: config.sublinear_tf,
            norm: config.norm,
            binary: config.binary,
        })
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        self.token_re
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn terms(&self, tokens: &[String]) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }

    pub fn transform(&self, text: &str) -> SparseVector {
        let tokens = self.tokenize(text);

        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for term in self.terms(&tokens) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.binary {
                    1.0
                } else if self.sublinear_tf {
                    1.0 + tf.ln()
                } else {
                    tf
                };
                (idx, tf * self.idf[idx])
            })
            .collect();

        let norm = match self.norm {
            Some(Norm::L2) => entries.iter().map(|(_, v)| v * v).sum::<f32>().sqrt(),
            Some(Norm::L1) => entries.iter().map(|(_, v)| v.abs()).sum::<f32>(),
            None => 0.0,
        };
        if norm > 0.0 {
            for (_, v) in entries.iter_mut() {
                *v /= norm;
            }
        }

        SparseVector { entries }
    }
}
