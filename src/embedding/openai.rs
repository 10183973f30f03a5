use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Settings;
use crate::embedding::client::EmbeddingProvider;
use crate::{Result, SyncError};

const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

pub struct OpenAiEmbeddings {
    http: Client,
    api_key: String,
    model: String,
    dimension: usize,
    endpoint: String,
}

impl OpenAiEmbeddings {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.embedding.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(SyncError::Config(
                "OpenAI API key is missing. Set embedding.api_key in config or OPENAI_API_KEY."
                    .to_string(),
            ));
        }

        let endpoint = if settings.embedding.endpoint.trim().is_empty() {
            DEFAULT_OPENAI_ENDPOINT.to_string()
        } else {
            settings
                .embedding
                .endpoint
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(45))
                .build()
                .map_err(SyncError::Http)?,
            api_key,
            model: settings.embedding.model.trim().to_string(),
            dimension: settings.embedding.dimension,
            endpoint,
        })
    }

    fn request_url(&self) -> String {
        format!("{}/embeddings", self.endpoint)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .http
            .post(self.request_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(SyncError::Embedding(format!(
                "embeddings request failed with {status}: {detail}"
            )));
        }

        let payload: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Embedding(format!("failed to parse response: {e}")))?;

        if payload.data.len() != texts.len() {
            return Err(SyncError::Embedding(format!(
                "expected {} vectors, got {}",
                texts.len(),
                payload.data.len()
            )));
        }

        let mut data = payload.data;
        data.sort_by_key(|item| item.index);

        for item in &data {
            if item.embedding.len() != self.dimension {
                return Err(SyncError::Embedding(format!(
                    "model returned {}-dimensional vector, expected {}",
                    item.embedding.len(),
                    self.dimension
                )));
            }
        }

        Ok(data.into_iter().map(|item| item.embedding).collect())
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    #[serde(default)]
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}
