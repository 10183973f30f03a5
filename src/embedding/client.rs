use async_trait::async_trait;

use crate::config::Settings;
use crate::embedding::openai::OpenAiEmbeddings;
use crate::{Result, SyncError};

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Build an embedding provider from runtime settings.
pub fn build_provider(settings: &Settings) -> Result<Box<dyn EmbeddingProvider>> {
    match settings.embedding.provider.to_lowercase().as_str() {
        "openai" => Ok(Box::new(OpenAiEmbeddings::from_settings(settings)?)),
        other => Err(SyncError::Config(format!(
            "Unsupported embedding.provider '{other}'. Supported providers: openai"
        ))),
    }
}
