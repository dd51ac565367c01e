//! Embedding-bag sequence classifier backed by candle.

use std::path::Path;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{Embedding, Linear, VarBuilder};
use serde::Deserialize;
use tokenizers::Tokenizer;

use super::{unexpected_features, ArtifactFamily, Features, RawScore, SentimentModel};
use crate::core::error::{Result, SentimentError};
use crate::preprocessing::{SequenceEncoder, Side};

fn default_max_len() -> usize {
    200
}

/// Architecture and input policy of an exported sequence classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct SequenceConfig {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    #[serde(default)]
    pub hidden_dim: Option<usize>,
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    #[serde(default)]
    pub pad_id: u32,
    #[serde(default)]
    pub padding: Side,
    #[serde(default)]
    pub truncating: Side,
    #[serde(default)]
    pub add_special_tokens: bool,
}

impl SequenceConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            SentimentError::ArtifactFormat(format!(
                "failed to parse model config {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vocab_size == 0 || self.embedding_dim == 0 || self.hidden_dim == Some(0) {
            return Err(SentimentError::Capability(
                "model dimensions must be positive".to_string(),
            ));
        }
        if self.max_len == 0 {
            return Err(SentimentError::Capability(
                "max_len must be positive".to_string(),
            ));
        }
        if self.pad_id as usize >= self.vocab_size {
            return Err(SentimentError::Capability(format!(
                "pad_id {} is outside the vocabulary of {}",
                self.pad_id, self.vocab_size
            )));
        }
        Ok(())
    }
}

struct Network {
    embedding: Embedding,
    hidden: Option<Linear>,
    output: Linear,
}

impl Network {
    fn load(vb: VarBuilder, config: &SequenceConfig) -> candle_core::Result<Self> {
        let embedding = candle_nn::embedding(
            config.vocab_size,
            config.embedding_dim,
            vb.pp("embedding"),
        )?;
        let (hidden, output_in) = match config.hidden_dim {
            Some(dim) => (
                Some(candle_nn::linear(config.embedding_dim, dim, vb.pp("hidden"))?),
                dim,
            ),
            None => (None, config.embedding_dim),
        };
        let output = candle_nn::linear(output_in, 1, vb.pp("output"))?;
        Ok(Self {
            embedding,
            hidden,
            output,
        })
    }

    /// `input_ids` is `[batch, seq_len]`; returns `[batch]` sigmoid scores.
    fn forward(&self, input_ids: &Tensor) -> candle_core::Result<Tensor> {
        let _enter = tracing::span!(tracing::Level::TRACE, "sequence-forward").entered();
        let xs = self.embedding.forward(input_ids)?.mean(1)?;
        let xs = match &self.hidden {
            Some(hidden) => hidden.forward(&xs)?.relu()?,
            None => xs,
        };
        candle_nn::ops::sigmoid(&self.output.forward(&xs)?)?.squeeze(1)
    }
}

pub struct SequenceClassifier {
    network: Network,
    encoder: SequenceEncoder,
    vocab_size: usize,
    device: Device,
}

impl SequenceClassifier {
    pub fn load(
        weights: &Path,
        config: SequenceConfig,
        tokenizer: Tokenizer,
        device: &Device,
    ) -> Result<Self> {
        config.validate()?;
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, device)? };
        let network = Network::load(vb, &config)?;
        Self::from_parts(network, config, tokenizer, device)
    }

    /// Build from weights already held in memory, keyed like the safetensors file.
    pub fn from_tensors(
        tensors: std::collections::HashMap<String, Tensor>,
        config: SequenceConfig,
        tokenizer: Tokenizer,
        device: &Device,
    ) -> Result<Self> {
        config.validate()?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, device);
        let network = Network::load(vb, &config)?;
        Self::from_parts(network, config, tokenizer, device)
    }

    fn from_parts(
        network: Network,
        config: SequenceConfig,
        tokenizer: Tokenizer,
        device: &Device,
    ) -> Result<Self> {
        let encoder = SequenceEncoder::new(
            tokenizer,
            config.max_len,
            config.pad_id,
            config.padding,
            config.truncating,
            config.add_special_tokens,
        )?;
        Ok(Self {
            network,
            encoder,
            vocab_size: config.vocab_size,
            device: device.clone(),
        })
    }
}

impl SentimentModel for SequenceClassifier {
    fn family(&self) -> ArtifactFamily {
        ArtifactFamily::Sequence
    }

    fn preprocess(&self, text: &str) -> Result<Features> {
        let ids = self.encoder.encode(text)?;
        if let Some(id) = ids.iter().find(|&&id| id as usize >= self.vocab_size) {
            return Err(SentimentError::Tokenization(format!(
                "token id {id} is outside the model vocabulary of {}",
                self.vocab_size
            )));
        }
        Ok(Features::Sequence(ids))
    }

    fn score(&self, features: &Features) -> Result<RawScore> {
        let ids = match features {
            Features::Sequence(ids) => ids,
            other => return Err(unexpected_features(self.family(), other)),
        };
        let input = Tensor::new(ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let score = self
            .network
            .forward(&input)?
            .squeeze(0)?
            .to_dtype(DType::F32)?
            .to_scalar::<f32>()?;
        Ok(RawScore::Scalar(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn tokenizer() -> Tokenizer {
        Tokenizer::from_str(
            &serde_json::json!({
                "version": "1.0",
                "truncation": null,
                "padding": null,
                "added_tokens": [],
                "normalizer": {"type": "Lowercase"},
                "pre_tokenizer": {"type": "Whitespace"},
                "post_processor": null,
                "decoder": null,
                "model": {
                    "type": "WordLevel",
                    "vocab": {"<pad>": 0, "<unk>": 1, "love": 2, "hate": 3},
                    "unk_token": "<unk>"
                }
            })
            .to_string(),
        )
        .unwrap()
    }

    fn config(hidden_dim: Option<usize>) -> SequenceConfig {
        serde_json::from_value(serde_json::json!({
            "vocab_size": 4,
            "embedding_dim": 2,
            "hidden_dim": hidden_dim,
            "max_len": 4
        }))
        .unwrap()
    }

    /// Embedding column 0 carries sentiment: +4 for "love", -4 for "hate".
    fn tensors(device: &Device) -> HashMap<String, Tensor> {
        let embedding = Tensor::new(
            &[[0f32, 0.0], [0.0, 0.0], [4.0, 0.0], [-4.0, 0.0]],
            device,
        )
        .unwrap();
        let output_w = Tensor::new(&[[1f32, 0.0]], device).unwrap();
        let output_b = Tensor::new(&[0f32], device).unwrap();
        HashMap::from([
            ("embedding.weight".to_string(), embedding),
            ("output.weight".to_string(), output_w),
            ("output.bias".to_string(), output_b),
        ])
    }

    fn score(model: &SequenceClassifier, text: &str) -> f32 {
        match model.score(&model.preprocess(text).unwrap()).unwrap() {
            RawScore::Scalar(s) => s,
            other => panic!("expected a scalar score, got {other:?}"),
        }
    }

    #[test]
    fn defaults_follow_the_keras_conventions() {
        let config: SequenceConfig =
            serde_json::from_value(serde_json::json!({"vocab_size": 10, "embedding_dim": 8}))
                .unwrap();
        assert_eq!(config.max_len, 200);
        assert_eq!(config.pad_id, 0);
        assert_eq!(config.padding, Side::Pre);
        assert_eq!(config.truncating, Side::Pre);
        assert!(config.hidden_dim.is_none());
    }

    #[test]
    fn pad_id_must_be_inside_the_vocabulary() {
        let config: SequenceConfig = serde_json::from_value(serde_json::json!({
            "vocab_size": 4, "embedding_dim": 2, "pad_id": 4
        }))
        .unwrap();
        assert!(matches!(config.validate(), Err(SentimentError::Capability(_))));
    }

    #[test]
    fn preprocessing_yields_fixed_length_ids() {
        let device = Device::Cpu;
        let model =
            SequenceClassifier::from_tensors(tensors(&device), config(None), tokenizer(), &device)
                .unwrap();
        assert_eq!(
            model.preprocess("I love it").unwrap(),
            Features::Sequence(vec![0, 1, 2, 1])
        );
    }

    #[test]
    fn mean_pooled_scores_follow_the_embedding() {
        let device = Device::Cpu;
        let model =
            SequenceClassifier::from_tensors(tensors(&device), config(None), tokenizer(), &device)
                .unwrap();

        // One "love" among four positions: mean 1.0, sigmoid(1.0).
        let expected = 1.0 / (1.0 + (-1.0f32).exp());
        assert!((score(&model, "love") - expected).abs() < 1e-5);
        assert!(score(&model, "hate hate") < 0.5);
        assert!((score(&model, "") - 0.5).abs() < 1e-6);
    }

    #[test]
    fn optional_hidden_layer_is_applied() {
        let device = Device::Cpu;
        let mut weights = tensors(&device);
        weights.insert(
            "hidden.weight".to_string(),
            Tensor::new(&[[1f32, 0.0], [-1.0, 0.0]], &device).unwrap(),
        );
        weights.insert(
            "hidden.bias".to_string(),
            Tensor::new(&[0f32, 0.0], &device).unwrap(),
        );
        let model =
            SequenceClassifier::from_tensors(weights, config(Some(2)), tokenizer(), &device)
                .unwrap();

        // "hate" pools to -1.0, the ReLU zeroes the first unit, so the output is sigmoid(0).
        assert!((score(&model, "hate") - 0.5).abs() < 1e-6);
        assert!(score(&model, "love") > 0.5);
    }

    #[test]
    fn wrong_weight_shapes_fail_to_load() {
        let device = Device::Cpu;
        let mut weights = tensors(&device);
        weights.insert(
            "embedding.weight".to_string(),
            Tensor::zeros((3, 2), DType::F32, &device).unwrap(),
        );
        assert!(
            SequenceClassifier::from_tensors(weights, config(None), tokenizer(), &device).is_err()
        );
    }

    #[test]
    fn token_ids_beyond_the_vocabulary_are_rejected() {
        let device = Device::Cpu;
        let mut small = config(None);
        small.vocab_size = 3;
        let mut weights = tensors(&device);
        weights.insert(
            "embedding.weight".to_string(),
            Tensor::zeros((3, 2), DType::F32, &device).unwrap(),
        );
        let model = SequenceClassifier::from_tensors(weights, small, tokenizer(), &device).unwrap();
        assert!(matches!(
            model.preprocess("hate"),
            Err(SentimentError::Tokenization(_))
        ));
    }
}
