//! Text to numeric input transforms applied before a model is invoked.
//!
//! Both transforms must match what the artifact saw during training exactly;
//! a mismatch does not fail, it silently degrades predictions.

pub mod sequence;
pub mod tfidf;

pub use sequence::{fit_to_length, SequenceEncoder, Side};
pub use tfidf::{SparseVector, TfidfConfig, TfidfVectorizer};
