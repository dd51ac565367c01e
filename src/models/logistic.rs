use serde::Deserialize;

use crate::core::error::{Result, SentimentError};
use crate::preprocessing::SparseVector;

/// On-disk representation of a fitted binary logistic regression.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticConfig {
    pub coef: Vec<f32>,
    pub intercept: f32,
    /// Class labels in column order; must be `[0, 1]` (negative, positive).
    #[serde(default = "default_classes")]
    pub classes: Vec<i64>,
}

fn default_classes() -> Vec<i64> {
    vec![0, 1]
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coef: Vec<f32>,
    intercept: f32,
}

impl LogisticRegression {
    pub fn from_config(config: LogisticConfig) -> Result<Self> {
        if config.classes != [0, 1] {
            return Err(SentimentError::Capability(format!(
                "classifier must be binary with classes [0, 1], found {:?}",
                config.classes
            )));
        }
        if config.coef.is_empty() {
            return Err(SentimentError::Capability(
                "classifier has no coefficients".to_string(),
            ));
        }
        if !config.intercept.is_finite() || config.coef.iter().any(|w| !w.is_finite()) {
            return Err(SentimentError::Capability(
                "classifier contains non-finite weights".to_string(),
            ));
        }
        Ok(Self {
            coef: config.coef,
            intercept: config.intercept,
        })
    }

    /// Ensure the classifier consumes exactly the columns a vectorizer produces.
    pub fn check_features(&self, n_features: usize) -> Result<()> {
        if self.coef.len() != n_features {
            return Err(SentimentError::Capability(format!(
                "classifier expects {} features but the vectorizer produces {n_features}",
                self.coef.len()
            )));
        }
        Ok(())
    }

    /// `[p(negative), p(positive)]` for one sample.
    pub fn predict_proba(&self, x: &SparseVector) -> [f32; 2] {
        let z = x.dot(&self.coef) + self.intercept as f64;
        let positive = 1.0 / (1.0 + (-z).exp());
        [(1.0 - positive) as f32, positive as f32]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::{TfidfConfig, TfidfVectorizer};

    fn classifier(coef: Vec<f32>, intercept: f32) -> LogisticRegression {
        LogisticRegression::from_config(LogisticConfig {
            coef,
            intercept,
            classes: vec![0, 1],
        })
        .unwrap()
    }

    #[test]
    fn empty_input_scores_the_intercept() {
        let clf = classifier(vec![1.0, -1.0], 0.0);
        assert_eq!(clf.predict_proba(&SparseVector::default()), [0.5, 0.5]);
    }

    #[test]
    fn probabilities_follow_the_sign_of_the_margin() {
        let vectorizer = TfidfVectorizer::from_config(
            serde_json::from_value::<TfidfConfig>(serde_json::json!({
                "vocabulary": {"love": 0, "hate": 1},
                "idf": [1.0, 1.0]
            }))
            .unwrap(),
        )
        .unwrap();
        let clf = classifier(vec![3.0, -3.0], 0.0);

        let [neg, pos] = clf.predict_proba(&vectorizer.transform("I love it"));
        assert!(pos > 0.9);
        assert!((neg + pos - 1.0).abs() < 1e-6);

        let [_, pos] = clf.predict_proba(&vectorizer.transform("I hate it"));
        assert!(pos < 0.1);
    }

    #[test]
    fn multiclass_artifacts_are_rejected() {
        let err = LogisticRegression::from_config(LogisticConfig {
            coef: vec![1.0],
            intercept: 0.0,
            classes: vec![0, 1, 2],
        })
        .unwrap_err();
        assert!(matches!(err, SentimentError::Capability(_)));
    }

    #[test]
    fn feature_count_mismatch_is_reported() {
        let clf = classifier(vec![1.0, 2.0], 0.0);
        assert!(clf.check_features(2).is_ok());
        assert!(matches!(
            clf.check_features(3),
            Err(SentimentError::Capability(_))
        ));
    }
}
