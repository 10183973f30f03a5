//! Token codec used to measure and bound chunk sizes.

use tiktoken_rs::CoreBPE;

use crate::{Result, SyncError};

/// Black-box token codec. Encoding then decoding must be lossless for
/// whitespace-normalized text; the chunker only uses it to measure text and
/// to slice overlap tails.
pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Vec<u32>;

    fn decode(&self, tokens: &[u32]) -> Result<String>;

    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// `cl100k_base` tokenizer, the encoding used by the embedding model family.
pub struct Cl100kTokenizer {
    bpe: CoreBPE,
}

impl Cl100kTokenizer {
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| SyncError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for Cl100kTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        self.bpe.encode_ordinary(text)
    }

    fn decode(&self, tokens: &[u32]) -> Result<String> {
        self.bpe
            .decode(tokens.to_vec())
            .map_err(|e| SyncError::Tokenizer(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_roundtrips_plain_text() {
        let tokenizer = Cl100kTokenizer::new().expect("load cl100k_base");
        let text = "Let's start the meeting. We need to discuss the budget.";

        let tokens = tokenizer.encode(text);
        assert!(!tokens.is_empty());

        let decoded = tokenizer.decode(&tokens).expect("decode");
        assert_eq!(decoded, text);
    }

    #[test]
    fn tail_slice_decodes_to_a_suffix() {
        let tokenizer = Cl100kTokenizer::new().expect("load cl100k_base");
        let text = "[Speaker 1]: We agreed to ship the release on Friday.";

        let tokens = tokenizer.encode(text);
        let tail = &tokens[tokens.len().saturating_sub(4)..];
        let decoded = tokenizer.decode(tail).expect("decode tail");

        assert!(text.ends_with(decoded.as_str()));
    }
}
