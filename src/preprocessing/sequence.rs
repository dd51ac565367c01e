//! Fixed-length integer sequences for sequence classifiers.

use serde::Deserialize;
use tokenizers::Tokenizer;

use crate::core::error::{Result, SentimentError};

/// Which end of the sequence is padded or cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Pre,
    Post,
}

/// Truncate or pad `ids` to exactly `max_len` entries.
pub fn fit_to_length(
    ids: &[u32],
    max_len: usize,
    pad_id: u32,
    padding: Side,
    truncating: Side,
) -> Vec<u32> {
    if ids.len() >= max_len {
        return match truncating {
            Side::Pre => ids[ids.len() - max_len..].to_vec(),
            Side::Post => ids[..max_len].to_vec(),
        };
    }

    let fill = std::iter::repeat(pad_id).take(max_len - ids.len());
    match padding {
        Side::Pre => fill.chain(ids.iter().copied()).collect(),
        Side::Post => ids.iter().copied().chain(fill).collect(),
    }
}

/// Tokenizer plus the length policy used when the model was trained.
#[derive(Clone)]
pub struct SequenceEncoder {
    tokenizer: Tokenizer,
    max_len: usize,
    pad_id: u32,
    padding: Side,
    truncating: Side,
    add_special_tokens: bool,
}

impl SequenceEncoder {
    pub fn new(
        mut tokenizer: Tokenizer,
        max_len: usize,
        pad_id: u32,
        padding: Side,
        truncating: Side,
        add_special_tokens: bool,
    ) -> Result<Self> {
        if max_len == 0 {
            return Err(SentimentError::ArtifactFormat(
                "sequence length must be positive".to_string(),
            ));
        }

        // Length is enforced by `fit_to_length`; tokenizer-side policies would interfere.
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(None)
            .map_err(|e| SentimentError::Tokenization(e.to_string()))?;

        Ok(Self {
            tokenizer,
            max_len,
            pad_id,
            padding,
            truncating,
            add_special_tokens,
        })
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, self.add_special_tokens)
            .map_err(|e| SentimentError::Tokenization(e.to_string()))?;

        Ok(fit_to_length(
            encoding.get_ids(),
            self.max_len,
            self.pad_id,
            self.padding,
            self.truncating,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn short_sequences_are_padded_on_the_configured_side() {
        assert_eq!(fit_to_length(&[5, 6], 4, 0, Side::Pre, Side::Pre), vec![0, 0, 5, 6]);
        assert_eq!(fit_to_length(&[5, 6], 4, 0, Side::Post, Side::Pre), vec![5, 6, 0, 0]);
        assert_eq!(fit_to_length(&[], 3, 9, Side::Pre, Side::Pre), vec![9, 9, 9]);
    }

    #[test]
    fn long_sequences_are_truncated_on_the_configured_side() {
        let ids = [1, 2, 3, 4, 5];
        assert_eq!(fit_to_length(&ids, 3, 0, Side::Pre, Side::Pre), vec![3, 4, 5]);
        assert_eq!(fit_to_length(&ids, 3, 0, Side::Pre, Side::Post), vec![1, 2, 3]);
        assert_eq!(fit_to_length(&ids, 5, 0, Side::Pre, Side::Pre), ids.to_vec());
    }

    #[test]
    fn encoder_output_always_has_fixed_length() {
        let tokenizer = Tokenizer::from_str(&serde_json::json!({
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
                "vocab": {"<pad>": 0, "<unk>": 1, "great": 2, "film": 3},
                "unk_token": "<unk>"
            }
        })
        .to_string())
        .unwrap();

        let encoder = SequenceEncoder::new(tokenizer, 4, 0, Side::Pre, Side::Pre, false).unwrap();
        assert_eq!(encoder.encode("Great film").unwrap(), vec![0, 0, 2, 3]);
        assert_eq!(encoder.encode("great unknown film").unwrap(), vec![0, 2, 1, 3]);
        assert_eq!(
            encoder.encode("great great great great film").unwrap(),
            vec![2, 2, 2, 3]
        );
    }
}
