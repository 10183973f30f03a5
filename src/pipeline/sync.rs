//! Sync pipeline: fetch, convert, chunk, embed, persist

use std::time::Duration;

use crate::chunking::{Chunk, ChunkBuilder, Cl100kTokenizer};
use crate::config::Settings;
use crate::embedding::{build_provider, EmbeddingProvider};
use crate::fireflies::{FirefliesClient, Transcript};
use crate::markdown;
use crate::pipeline::retry::RetryPolicy;
use crate::pipeline::shutdown::ShutdownFlag;
use crate::storage::Repository;
use crate::{Result, SyncError};

/// Pause between chunk batches to respect embedding rate limits.
const BATCH_PAUSE: Duration = Duration::from_millis(500);

/// Granularity of the watch-mode sleep, so shutdown stays responsive.
const WATCH_SLEEP_STEP: Duration = Duration::from_secs(5);

/// Outcome of processing one transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptOutcome {
    /// Stored, with per-chunk accounting. `chunks_failed` counts chunks
    /// abandoned after embedding retries were exhausted.
    Synced {
        meeting_id: String,
        chunks_stored: usize,
        chunks_failed: usize,
    },
    /// Already ingested; nothing written.
    Skipped,
    /// Dry run: chunked but not embedded or stored.
    DryRun { chunk_count: usize },
}

/// Aggregate report for a full sync pass.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub synced: usize,
    pub skipped: usize,
    pub failed: usize,
    pub chunks_stored: usize,
    pub chunks_failed: usize,
    pub interrupted: bool,
}

/// The one authoritative ingestion pipeline.
pub struct SyncPipeline {
    fireflies: FirefliesClient,
    repository: Option<Repository>,
    embedder: Option<Box<dyn EmbeddingProvider>>,
    chunker: ChunkBuilder<Cl100kTokenizer>,
    retry: RetryPolicy,
    batch_size: usize,
    page_size: usize,
    pace_every: usize,
    pace: Duration,
    dry_run: bool,
    shutdown: ShutdownFlag,
}

impl SyncPipeline {
    /// Build the pipeline from settings. In dry-run mode only the
    /// transcript source is required; storage and embedding credentials
    /// stay unchecked.
    pub fn new(settings: &Settings, dry_run: bool, shutdown: ShutdownFlag) -> Result<Self> {
        let fireflies = FirefliesClient::from_settings(settings)?;

        let (repository, embedder) = if dry_run {
            (None, None)
        } else {
            (
                Some(Repository::new(settings)?),
                Some(build_provider(settings)?),
            )
        };

        Ok(Self {
            fireflies,
            repository,
            embedder,
            chunker: ChunkBuilder::new(Cl100kTokenizer::new()?, settings.chunking.clone()),
            retry: RetryPolicy::new(
                settings.sync.max_retries,
                Duration::from_secs(settings.sync.retry_delay_secs),
            ),
            batch_size: settings.sync.batch_size.max(1),
            page_size: settings.fireflies.page_size.max(1),
            pace_every: settings.sync.pace_every,
            pace: Duration::from_secs(settings.sync.pace_secs),
            dry_run,
            shutdown,
        })
    }

    /// Sync a single transcript by its fireflies id.
    pub async fn sync_one(&self, fireflies_id: &str) -> Result<TranscriptOutcome> {
        let transcript = self.fireflies.fetch_transcript(fireflies_id).await?;

        if !self.dry_run && self.repository()?.is_ingested(&transcript.id).await? {
            tracing::info!(id = %transcript.id, "transcript already ingested, skipping");
            return Ok(TranscriptOutcome::Skipped);
        }

        self.process_transcript(&transcript).await
    }

    /// Sync every transcript not yet in the store, oldest listing order,
    /// optionally capped at `limit` new transcripts.
    pub async fn sync_all(&self, limit: Option<usize>) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        let listings = self.fireflies.fetch_all_transcripts(self.page_size).await?;
        tracing::info!(total = listings.len(), "fetched transcript listing");

        let existing = if self.dry_run {
            Default::default()
        } else {
            self.repository()?.existing_fireflies_ids().await?
        };

        let total = listings.len();
        let mut pending: Vec<_> = listings
            .into_iter()
            .filter(|t| !existing.contains(&t.id))
            .collect();
        report.skipped = total - pending.len();
        if let Some(limit) = limit {
            pending.truncate(limit);
        }
        tracing::info!(new = pending.len(), "starting sync pass");

        for (i, listing) in pending.iter().enumerate() {
            if self.shutdown.is_triggered() {
                report.interrupted = true;
                break;
            }

            tracing::info!(
                current = i + 1,
                total = pending.len(),
                title = %listing.title,
                "processing transcript"
            );

            let outcome = match self.fireflies.fetch_transcript(&listing.id).await {
                Ok(transcript) => self.process_transcript(&transcript).await,
                Err(err) => Err(err),
            };

            match outcome {
                Ok(TranscriptOutcome::Synced {
                    chunks_stored,
                    chunks_failed,
                    ..
                }) => {
                    report.synced += 1;
                    report.chunks_stored += chunks_stored;
                    report.chunks_failed += chunks_failed;
                }
                Ok(TranscriptOutcome::DryRun { .. }) => report.synced += 1,
                Ok(TranscriptOutcome::Skipped) => report.skipped += 1,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::error!(error = %err, id = %listing.id, "failed to sync transcript");
                    report.failed += 1;
                }
            }

            if self.pace_every > 0 && (i + 1) % self.pace_every == 0 {
                tokio::time::sleep(self.pace).await;
            }
        }

        if self.shutdown.is_triggered() {
            report.interrupted = true;
        }

        Ok(report)
    }

    /// Repeatedly run full sync passes until shutdown.
    pub async fn watch(&self, limit: Option<usize>, interval: Duration) -> Result<()> {
        loop {
            let report = self.sync_all(limit).await?;
            tracing::info!(
                synced = report.synced,
                skipped = report.skipped,
                failed = report.failed,
                "sync pass complete"
            );

            if report.interrupted || self.shutdown.is_triggered() {
                return Ok(());
            }

            tracing::info!(interval_secs = interval.as_secs(), "sleeping until next pass");
            let mut remaining = interval;
            while !remaining.is_zero() {
                if self.shutdown.is_triggered() {
                    return Ok(());
                }
                let step = remaining.min(WATCH_SLEEP_STEP);
                tokio::time::sleep(step).await;
                remaining -= step;
            }
        }
    }

    async fn process_transcript(&self, transcript: &Transcript) -> Result<TranscriptOutcome> {
        let utterances = transcript.utterances();
        let chunks = self.chunker.build_chunks(&utterances, transcript.keywords())?;
        tracing::info!(id = %transcript.id, chunks = chunks.len(), "built chunks");

        if self.dry_run {
            for chunk in &chunks {
                tracing::info!(
                    index = chunk.index,
                    tokens = chunk.token_count,
                    speakers = ?chunk.speakers,
                    position = %chunk.metadata.position,
                    "chunk preview"
                );
            }
            return Ok(TranscriptOutcome::DryRun {
                chunk_count: chunks.len(),
            });
        }

        let repository = self.repository()?;

        let meeting_id = repository.create_meeting(transcript).await?;
        let rendered = markdown::to_markdown(transcript);
        let storage_path = repository
            .upload_transcript_markdown(transcript, &meeting_id, &rendered)
            .await?;

        let (chunks_stored, chunks_failed) = self.embed_and_store(&meeting_id, &chunks).await?;

        let completed = chunks_stored + chunks_failed == chunks.len();
        if completed {
            repository.store_summary(&meeting_id, transcript).await?;
            repository.mark_processed(&meeting_id, &storage_path).await?;
        } else {
            tracing::warn!(
                meeting_id = %meeting_id,
                "ingestion interrupted before all chunks were handled; meeting left unstamped"
            );
        }

        tracing::info!(
            id = %transcript.id,
            meeting_id = %meeting_id,
            chunks_stored,
            chunks_failed,
            "transcript processed"
        );

        Ok(TranscriptOutcome::Synced {
            meeting_id,
            chunks_stored,
            chunks_failed,
        })
    }

    /// Embed and store chunks in batches. A batch whose embedding call
    /// keeps failing is abandoned; the rest of the transcript continues.
    async fn embed_and_store(&self, meeting_id: &str, chunks: &[Chunk]) -> Result<(usize, usize)> {
        let repository = self.repository()?;
        let embedder = self
            .embedder
            .as_deref()
            .ok_or_else(|| SyncError::Config("embedding provider not initialized".to_string()))?;

        let mut stored = 0;
        let mut failed = 0;

        for batch in chunks.chunks(self.batch_size) {
            if self.shutdown.is_triggered() {
                tracing::warn!("shutdown requested, abandoning remaining chunks");
                break;
            }

            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = match self.retry.run("embedding batch", || embedder.embed(&texts)).await
            {
                Ok(vectors) => vectors,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        meeting_id = %meeting_id,
                        abandoned = batch.len(),
                        "embedding batch failed after retries"
                    );
                    failed += batch.len();
                    continue;
                }
            };

            for (chunk, embedding) in batch.iter().zip(embeddings) {
                match repository.store_chunk(meeting_id, chunk, embedding).await {
                    Ok(()) => stored += 1,
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => {
                        tracing::error!(
                            error = %err,
                            index = chunk.index,
                            "failed to store chunk"
                        );
                        failed += 1;
                    }
                }
            }

            tokio::time::sleep(BATCH_PAUSE).await;
        }

        Ok((stored, failed))
    }

    fn repository(&self) -> Result<&Repository> {
        self.repository
            .as_ref()
            .ok_or_else(|| SyncError::Config("storage not initialized in dry-run mode".to_string()))
    }
}
