//! Repository pattern wrapper for store operations
//!
//! Provides a higher-level interface for the pipeline: idempotency check,
//! meeting/chunk/summary persistence, markdown upload with a local copy.

use std::collections::HashSet;
use std::path::PathBuf;
use uuid::Uuid;

use crate::chunking::Chunk;
use crate::config::Settings;
use crate::fireflies::Transcript;
use crate::markdown;
use crate::storage::{NewChunk, NewMeeting, NewSummary, SupabaseStore};
use crate::Result;

/// Repository for meetings, chunks, and summaries
pub struct Repository {
    store: SupabaseStore,
    transcripts_dir: PathBuf,
}

impl Repository {
    /// Create a new repository
    pub fn new(settings: &Settings) -> Result<Self> {
        let store = SupabaseStore::from_settings(settings)?;
        Ok(Self {
            store,
            transcripts_dir: settings.transcripts_dir(),
        })
    }

    /// Fireflies ids of every meeting already in the store.
    pub async fn existing_fireflies_ids(&self) -> Result<HashSet<String>> {
        let rows = self.store.list_meetings().await?;
        Ok(rows.iter().filter_map(|row| row.fireflies_id()).collect())
    }

    /// Has this transcript been ingested before?
    pub async fn is_ingested(&self, fireflies_id: &str) -> Result<bool> {
        Ok(self
            .existing_fireflies_ids()
            .await?
            .contains(fireflies_id))
    }

    /// Insert the meeting row for a transcript, returning the meeting id.
    pub async fn create_meeting(&self, transcript: &Transcript) -> Result<String> {
        let meeting = NewMeeting::from_transcript(Uuid::new_v4().to_string(), transcript);
        self.store.insert_meeting(&meeting).await
    }

    /// Render target path plus upload: keeps a local copy under the data
    /// directory, then uploads to the bucket. Returns the object path.
    pub async fn upload_transcript_markdown(
        &self,
        transcript: &Transcript,
        meeting_id: &str,
        rendered: &str,
    ) -> Result<String> {
        let filename = markdown::markdown_filename(transcript, meeting_id);

        std::fs::create_dir_all(&self.transcripts_dir)?;
        std::fs::write(self.transcripts_dir.join(&filename), rendered)?;

        let object_path = format!("transcripts/{meeting_id}/{filename}");
        self.store.upload_markdown(&object_path, rendered).await?;

        Ok(object_path)
    }

    /// Store one chunk with its embedding.
    pub async fn store_chunk(
        &self,
        meeting_id: &str,
        chunk: &Chunk,
        embedding: Vec<f32>,
    ) -> Result<()> {
        let record = NewChunk {
            meeting_id: meeting_id.to_string(),
            chunk_index: chunk.index as i64,
            content: chunk.text.clone(),
            embedding,
            metadata: serde_json::to_value(&chunk.metadata)?,
        };
        self.store.insert_chunk(&record).await
    }

    /// Store the source-provided executive summary, when there is one.
    /// Returns whether a row was written.
    pub async fn store_summary(&self, meeting_id: &str, transcript: &Transcript) -> Result<bool> {
        let Some(summary) = &transcript.summary else {
            return Ok(false);
        };
        let Some(overview) = summary.overview.as_deref().filter(|o| !o.trim().is_empty()) else {
            return Ok(false);
        };

        let record = NewSummary {
            meeting_id: meeting_id.to_string(),
            summary_type: "executive".to_string(),
            summary_text: overview.trim().to_string(),
            key_points: summary.outline.clone(),
            action_items: summary.action_items.clone(),
            generated_by: "fireflies".to_string(),
        };
        self.store.insert_summary(&record).await?;
        Ok(true)
    }

    /// Stamp the meeting as fully processed.
    pub async fn mark_processed(&self, meeting_id: &str, storage_path: &str) -> Result<()> {
        self.store.mark_processed(meeting_id, storage_path).await
    }
}
