//! Transcript chunking for embedding and retrieval
//!
//! Splits a transcript into overlapping, token-bounded chunks that preserve
//! speaker attribution and temporal bounds.

mod builder;
mod tokenizer;

pub use builder::{Chunk, ChunkBuilder, ChunkConfig, ChunkMetadata, OverlapBudget, Utterance};
pub use tokenizer::{Cl100kTokenizer, Tokenizer};
