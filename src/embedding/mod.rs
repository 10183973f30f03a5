//! Embedding module for meetsync
//!
//! Turns chunk text into fixed-length vectors via the configured provider.

mod client;
mod openai;

pub use client::{build_provider, EmbeddingProvider};
pub use openai::OpenAiEmbeddings;
