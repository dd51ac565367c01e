//! TF-IDF + logistic regression artifacts.
//!
//! The same two components ship in two layouts: bundled in one pipeline file,
//! where the artifact owns vectorization, or as separate classifier and
//! vectorizer files, where the service vectorizes before scoring.

use std::path::Path;

use serde::Deserialize;

use super::logistic::{LogisticConfig, LogisticRegression};
use super::{unexpected_features, ArtifactFamily, Features, RawScore, SentimentModel};
use crate::core::error::{Result, SentimentError};
use crate::preprocessing::{TfidfConfig, TfidfVectorizer};

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        SentimentError::ArtifactFormat(format!("failed to parse {what} {}: {e}", path.display()))
    })
}

#[derive(Debug, Deserialize)]
struct PipelineFile {
    vectorizer: TfidfConfig,
    classifier: LogisticConfig,
}

/// Vectorizer and classifier bundled in a single artifact.
#[derive(Debug, Clone)]
pub struct TfidfPipelineModel {
    vectorizer: TfidfVectorizer,
    classifier: LogisticRegression,
}

impl TfidfPipelineModel {
    pub fn new(vectorizer: TfidfVectorizer, classifier: LogisticRegression) -> Result<Self> {
        classifier.check_features(vectorizer.n_features())?;
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let file: PipelineFile = read_json(path, "pipeline")?;
        Self::new(
            TfidfVectorizer::from_config(file.vectorizer)?,
            LogisticRegression::from_config(file.classifier)?,
        )
    }
}

impl SentimentModel for TfidfPipelineModel {
    fn family(&self) -> ArtifactFamily {
        ArtifactFamily::Pipeline
    }

    fn preprocess(&self, text: &str) -> Result<Features> {
        Ok(Features::Text(text.to_string()))
    }

    fn score(&self, features: &Features) -> Result<RawScore> {
        match features {
            Features::Text(text) => {
                let x = self.vectorizer.transform(text);
                Ok(RawScore::Probabilities(self.classifier.predict_proba(&x)))
            }
            other => Err(unexpected_features(self.family(), other)),
        }
    }
}

/// Classifier whose vectorizer is loaded from a separate file.
#[derive(Debug, Clone)]
pub struct SplitLinearModel {
    vectorizer: TfidfVectorizer,
    classifier: LogisticRegression,
}

impl SplitLinearModel {
    pub fn new(vectorizer: TfidfVectorizer, classifier: LogisticRegression) -> Result<Self> {
        classifier.check_features(vectorizer.n_features())?;
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    pub fn from_files(model_path: &Path, vectorizer_path: &Path) -> Result<Self> {
        let classifier: LogisticConfig = read_json(model_path, "classifier")?;
        Self::new(
            TfidfVectorizer::from_file(vectorizer_path)?,
            LogisticRegression::from_config(classifier)?,
        )
    }
}

impl SentimentModel for SplitLinearModel {
    fn family(&self) -> ArtifactFamily {
        ArtifactFamily::Vectorizer
    }

    fn preprocess(&self, text: &str) -> Result<Features> {
        Ok(Features::Sparse(self.vectorizer.transform(text)))
    }

    fn score(&self, features: &Features) -> Result<RawScore> {
        match features {
            Features::Sparse(x) => Ok(RawScore::Probabilities(self.classifier.predict_proba(x))),
            other => Err(unexpected_features(self.family(), other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> (TfidfVectorizer, LogisticRegression) {
        let vectorizer = TfidfVectorizer::from_config(
            serde_json::from_value(serde_json::json!({
                "vocabulary": {"good": 0, "bad": 1},
                "idf": [1.0, 1.0]
            }))
            .unwrap(),
        )
        .unwrap();
        let classifier = LogisticRegression::from_config(
            serde_json::from_value(serde_json::json!({"coef": [2.0, -2.0], "intercept": 0.0}))
                .unwrap(),
        )
        .unwrap();
        (vectorizer, classifier)
    }

    #[test]
    fn both_layouts_score_identically() {
        let (vectorizer, classifier) = parts();
        let bundled = TfidfPipelineModel::new(vectorizer.clone(), classifier.clone()).unwrap();
        let split = SplitLinearModel::new(vectorizer, classifier).unwrap();

        let text = "good food, bad service, good drinks";
        let a = bundled.score(&bundled.preprocess(text).unwrap()).unwrap();
        let b = split.score(&split.preprocess(text).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn pipeline_preprocessing_is_a_passthrough() {
        let (vectorizer, classifier) = parts();
        let model = TfidfPipelineModel::new(vectorizer, classifier).unwrap();
        assert_eq!(
            model.preprocess("Good!").unwrap(),
            Features::Text("Good!".to_string())
        );
    }

    #[test]
    fn mismatched_features_are_an_inference_error() {
        let (vectorizer, classifier) = parts();
        let model = SplitLinearModel::new(vectorizer, classifier).unwrap();
        let err = model.score(&Features::Sequence(vec![1, 2])).unwrap_err();
        assert!(matches!(err, SentimentError::Inference(_)));
    }
}
