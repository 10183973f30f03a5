//! Supabase REST client: PostgREST tables plus storage object upload

use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;
use std::time::Duration;

use crate::config::Settings;
use crate::storage::models::{MeetingRow, NewChunk, NewMeeting, NewSummary};
use crate::{Result, SyncError};

pub struct SupabaseStore {
    http: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseStore {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.supabase.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(SyncError::Config(
                "Supabase URL is missing. Set supabase.url in config or SUPABASE_URL.".to_string(),
            ));
        }

        let service_key = settings.supabase.service_key.trim().to_string();
        if service_key.is_empty() {
            return Err(SyncError::Config(
                "Supabase service key is missing. Set supabase.service_key in config or SUPABASE_SERVICE_KEY."
                    .to_string(),
            ));
        }

        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .map_err(SyncError::Http)?,
            base_url,
            service_key,
            bucket: settings.supabase.bucket.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// All meeting rows with their source metadata, for the idempotency
    /// check before ingestion.
    pub async fn list_meetings(&self) -> Result<Vec<MeetingRow>> {
        let response = self
            .authed(self.http.get(self.table_url("meetings")))
            .query(&[("select", "id,raw_metadata")])
            .send()
            .await?;
        let response = check(response, "listing meetings").await?;

        Ok(response.json().await?)
    }

    /// Insert a meeting row, returning its id.
    pub async fn insert_meeting(&self, meeting: &NewMeeting) -> Result<String> {
        let response = self
            .authed(self.http.post(self.table_url("meetings")))
            .header("Prefer", "return=representation")
            .json(meeting)
            .send()
            .await?;
        let response = check(response, "inserting meeting").await?;

        let rows: Vec<MeetingRow> = response.json().await?;
        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| SyncError::Storage("meeting insert returned no row".to_string()))
    }

    pub async fn insert_chunk(&self, chunk: &NewChunk) -> Result<()> {
        let response = self
            .authed(self.http.post(self.table_url("meeting_chunks")))
            .json(chunk)
            .send()
            .await?;
        check(response, "inserting chunk").await?;
        Ok(())
    }

    pub async fn insert_summary(&self, summary: &NewSummary) -> Result<()> {
        let response = self
            .authed(self.http.post(self.table_url("meeting_summaries")))
            .json(summary)
            .send()
            .await?;
        check(response, "inserting summary").await?;
        Ok(())
    }

    /// Stamp a meeting as fully processed.
    pub async fn mark_processed(&self, meeting_id: &str, storage_path: &str) -> Result<()> {
        let response = self
            .authed(self.http.patch(self.table_url("meetings")))
            .query(&[("id", format!("eq.{meeting_id}"))])
            .json(&json!({
                "processed_at": Utc::now().to_rfc3339(),
                "storage_bucket_path": storage_path,
            }))
            .send()
            .await?;
        check(response, "marking meeting processed").await?;
        Ok(())
    }

    /// Upload the rendered markdown document into the storage bucket.
    pub async fn upload_markdown(&self, path: &str, markdown: &str) -> Result<()> {
        let response = self
            .authed(self.http.post(self.object_url(path)))
            .header("Content-Type", "text/markdown")
            .body(markdown.to_string())
            .send()
            .await?;
        check(response, "uploading markdown").await?;
        Ok(())
    }
}

async fn check(response: Response, context: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let detail = response.text().await.unwrap_or_default();
    Err(SyncError::Storage(format!(
        "{context} failed with {status}: {detail}"
    )))
}
