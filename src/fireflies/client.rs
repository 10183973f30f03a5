use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::config::Settings;
use crate::fireflies::models::{null_to_default, Transcript, TranscriptListing};
use crate::{Result, SyncError};

const DEFAULT_FIREFLIES_ENDPOINT: &str = "https://api.fireflies.ai/graphql";

/// Pause between listing pages to stay under the API rate limit.
const PAGE_PAUSE: Duration = Duration::from_millis(500);

const LIST_TRANSCRIPTS_QUERY: &str = "\
query GetTranscripts($limit: Int, $skip: Int) {
    transcripts(limit: $limit, skip: $skip) {
        id
        title
        date
        duration
    }
}";

const TRANSCRIPT_DETAIL_QUERY: &str = "\
query GetTranscriptContent($id: String!) {
    transcript(id: $id) {
        title
        id
        transcript_url
        duration
        date
        participants
        sentences {
            text
            speaker_id
            start_time
            end_time
        }
        summary {
            keywords
            action_items
            outline
            shorthand_bullet
            overview
        }
    }
}";

pub struct FirefliesClient {
    http: Client,
    api_key: String,
    endpoint: String,
}

impl FirefliesClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = settings.fireflies.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(SyncError::Config(
                "Fireflies API key is missing. Set fireflies.api_key in config or FIREFLIES_API_KEY."
                    .to_string(),
            ));
        }

        let endpoint = if settings.fireflies.endpoint.trim().is_empty() {
            DEFAULT_FIREFLIES_ENDPOINT.to_string()
        } else {
            settings
                .fireflies
                .endpoint
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .map_err(SyncError::Http)?,
            api_key,
            endpoint,
        })
    }

    /// Fetch one page of transcript metadata.
    pub async fn fetch_transcripts(
        &self,
        limit: usize,
        skip: usize,
    ) -> Result<Vec<TranscriptListing>> {
        let data: TranscriptsData = self
            .execute(
                LIST_TRANSCRIPTS_QUERY,
                json!({ "limit": limit, "skip": skip }),
            )
            .await?;
        Ok(data.transcripts)
    }

    /// Fetch the whole transcript listing, page by page, until an empty
    /// batch signals the end.
    pub async fn fetch_all_transcripts(&self, page_size: usize) -> Result<Vec<TranscriptListing>> {
        let mut all = Vec::new();
        let mut skip = 0;

        loop {
            let batch = self.fetch_transcripts(page_size, skip).await?;
            if batch.is_empty() {
                break;
            }

            all.extend(batch);
            skip += page_size;
            tracing::info!(total = all.len(), "fetched transcript listing page");
            tokio::time::sleep(PAGE_PAUSE).await;
        }

        Ok(all)
    }

    /// Fetch full transcript content and metadata.
    pub async fn fetch_transcript(&self, id: &str) -> Result<Transcript> {
        let data: TranscriptData = self
            .execute(TRANSCRIPT_DETAIL_QUERY, json!({ "id": id }))
            .await?;

        data.transcript
            .ok_or_else(|| SyncError::NotFound(format!("transcript {id}")))
    }

    async fn execute<V: Serialize, T: DeserializeOwned>(&self, query: &str, variables: V) -> Result<T> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?
            .error_for_status()?;

        let payload: GraphQlResponse<T> = response.json().await?;

        if !payload.errors.is_empty() {
            let messages: Vec<String> = payload.errors.into_iter().map(|e| e.message).collect();
            return Err(SyncError::Fireflies(messages.join("; ")));
        }

        payload
            .data
            .ok_or_else(|| SyncError::Fireflies("response contained no data".to_string()))
    }
}

#[derive(Serialize)]
struct GraphQlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct GraphQlResponse<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default, deserialize_with = "null_to_default")]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize, Default)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct TranscriptsData {
    #[serde(default, deserialize_with = "null_to_default")]
    transcripts: Vec<TranscriptListing>,
}

#[derive(Deserialize)]
struct TranscriptData {
    #[serde(default)]
    transcript: Option<Transcript>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_a_config_error() {
        let settings = Settings::default();

        let err = match FirefliesClient::from_settings(&settings) {
            Ok(_) => panic!("expected client creation to fail"),
            Err(e) => e,
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("Fireflies API key is missing"));
    }

    #[test]
    fn custom_endpoint_is_trimmed() {
        let mut settings = Settings::default();
        settings.fireflies.api_key = "test-key".to_string();
        settings.fireflies.endpoint = "http://localhost:9999/graphql/ ".to_string();

        let client = FirefliesClient::from_settings(&settings).expect("client");
        assert_eq!(client.endpoint, "http://localhost:9999/graphql");
    }
}
