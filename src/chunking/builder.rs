//! Chunk construction from transcript utterances
//!
//! Utterances are partitioned into semantic groups (speaker runs without
//! long pauses), groups are greedily packed into token-bounded chunks with a
//! decoded-token overlap carried across chunk boundaries, and the emitted
//! sequence gets a retrieval-metadata enrichment pass.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::chunking::Tokenizer;
use crate::Result;

/// Markers that flag a chunk as carrying action items.
const ACTION_MARKERS: [&str; 5] = ["action", "todo", "will do", "next step", "follow up"];

/// Markers that flag a chunk as carrying decisions. Matched as substrings of
/// the lowercased text, so "agree" also hits "disagreement" — kept that way
/// to stay consistent with already-ingested data.
const DECISION_MARKERS: [&str; 5] = ["decided", "agree", "confirm", "approved", "rejected"];

/// One spoken sentence from the transcript source. `speaker_id` is scoped to
/// a single transcript; timestamps are milliseconds and monotonically
/// non-decreasing when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub speaker_id: i64,
    pub text: String,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
}

impl Utterance {
    pub fn new(speaker_id: i64, text: impl Into<String>) -> Self {
        Self {
            speaker_id,
            text: text.into(),
            start_time: None,
            end_time: None,
        }
    }
}

/// Chunking budgets. Passed explicitly into the builder so concurrent
/// callers can use different budgets without interference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Token budget per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Tokens repeated at each chunk boundary.
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Pause length that starts a new semantic group, when timestamps are
    /// present.
    #[serde(default = "default_time_gap_threshold_ms")]
    pub time_gap_threshold_ms: u64,
}

fn default_chunk_size() -> usize {
    512
}

fn default_overlap() -> usize {
    128
}

fn default_time_gap_threshold_ms() -> u64 {
    5000
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
            time_gap_threshold_ms: default_time_gap_threshold_ms(),
        }
    }
}

/// Overlap budget shared with each neighboring chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapBudget {
    pub previous: usize,
    pub next: usize,
}

/// Retrieval-relevance metadata attached to every chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub chunk_type: String,
    /// Position string, "i+1/total".
    pub position: String,
    pub has_action_items: bool,
    pub has_decisions: bool,
    /// Heuristic score in [0, 1].
    pub importance_score: f64,
    /// Up to 5 transcript-level keywords found in this chunk.
    pub keywords: Vec<String>,
    pub chunk_overlap: OverlapBudget,
}

/// The unit handed to the embedding service and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based, contiguous position within the transcript.
    pub index: usize,
    pub text: String,
    /// Speaker ids contributing text to this chunk, ascending.
    pub speakers: Vec<i64>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub token_count: usize,
    pub metadata: ChunkMetadata,
}

/// Accumulator for the chunk under construction.
#[derive(Default)]
struct ChunkDraft {
    text: String,
    speakers: BTreeSet<i64>,
    tokens: usize,
    start_time: Option<u64>,
    end_time: Option<u64>,
}

impl ChunkDraft {
    fn seeded(overlap_text: String, overlap_tokens: usize) -> Self {
        Self {
            text: overlap_text,
            tokens: overlap_tokens,
            ..Self::default()
        }
    }

    fn append_group(&mut self, formatted: &str, group: &[Utterance]) {
        self.text.push_str(formatted);
        self.text.push('\n');
        for utterance in group {
            self.speakers.insert(utterance.speaker_id);
        }
        if self.start_time.is_none() {
            self.start_time = group.iter().find_map(|u| u.start_time);
        }
        if let Some(end) = group.iter().rev().find_map(|u| u.end_time) {
            self.end_time = Some(end);
        }
    }
}

/// Transforms a transcript's utterances into ordered, overlapping,
/// token-bounded chunks. Pure: no I/O, no state between calls.
pub struct ChunkBuilder<T: Tokenizer> {
    tokenizer: T,
    config: ChunkConfig,
}

impl<T: Tokenizer> ChunkBuilder<T> {
    pub fn new(tokenizer: T, config: ChunkConfig) -> Self {
        Self { tokenizer, config }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Build the chunk sequence for one transcript. `keywords` is the
    /// transcript-level keyword list used for metadata matching; pass an
    /// empty slice when the source has none.
    pub fn build_chunks(&self, utterances: &[Utterance], keywords: &[String]) -> Result<Vec<Chunk>> {
        if utterances.is_empty() {
            return Ok(Vec::new());
        }

        if self.config.overlap >= self.config.chunk_size {
            tracing::warn!(
                overlap = self.config.overlap,
                chunk_size = self.config.chunk_size,
                "overlap is not smaller than chunk_size; consecutive chunks will mostly repeat each other"
            );
        }

        let mut drafts: Vec<ChunkDraft> = Vec::new();
        let mut current = ChunkDraft::default();

        for group in group_by_semantics(utterances, self.config.time_gap_threshold_ms) {
            let Some(formatted) = format_group(group) else {
                continue;
            };
            let group_tokens = self.tokenizer.count(&formatted);

            if !current.text.is_empty() && current.tokens + group_tokens > self.config.chunk_size {
                let seed = self.overlap_seed(&current.text)?;
                let seed_tokens = self.tokenizer.count(&seed);
                drafts.push(std::mem::replace(
                    &mut current,
                    ChunkDraft::seeded(seed, seed_tokens),
                ));
            }

            current.append_group(&formatted, group);
            current.tokens += group_tokens;
        }

        if !current.text.trim().is_empty() {
            drafts.push(current);
        }

        let total = drafts.len();
        Ok(drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| self.finalize(index, total, draft, keywords))
            .collect())
    }

    /// Trailing `overlap` tokens of a closed chunk, decoded back to text.
    /// The whole text seeds the next chunk when it fits the overlap budget.
    fn overlap_seed(&self, closed_text: &str) -> Result<String> {
        let tokens = self.tokenizer.encode(closed_text);
        if tokens.len() <= self.config.overlap {
            return Ok(closed_text.to_string());
        }
        self.tokenizer.decode(&tokens[tokens.len() - self.config.overlap..])
    }

    fn finalize(&self, index: usize, total: usize, draft: ChunkDraft, keywords: &[String]) -> Chunk {
        let text = draft.text.trim().to_string();
        let lowered = text.to_lowercase();

        let has_action_items = ACTION_MARKERS.iter().any(|m| lowered.contains(m));
        let has_decisions = DECISION_MARKERS.iter().any(|m| lowered.contains(m));

        let mut importance: f64 = 0.5;
        if has_action_items {
            importance += 0.2;
        }
        if has_decisions {
            importance += 0.2;
        }
        if index == 0 || index + 1 == total {
            importance += 0.1;
        }

        let matched_keywords: Vec<String> = keywords
            .iter()
            .filter(|kw| lowered.contains(&kw.to_lowercase()))
            .take(5)
            .cloned()
            .collect();

        Chunk {
            index,
            text,
            speakers: draft.speakers.into_iter().collect(),
            start_time: draft.start_time,
            end_time: draft.end_time,
            token_count: draft.tokens,
            metadata: ChunkMetadata {
                chunk_type: "transcript".to_string(),
                position: format!("{}/{}", index + 1, total),
                has_action_items,
                has_decisions,
                importance_score: importance.min(1.0),
                keywords: matched_keywords,
                chunk_overlap: OverlapBudget {
                    previous: if index > 0 { self.config.overlap } else { 0 },
                    next: if index + 1 < total { self.config.overlap } else { 0 },
                },
            },
        }
    }
}

/// Partition utterances into maximal runs of one speaker with no long pause.
/// A missing timestamp on either side of a boundary disables the gap check
/// for that boundary.
fn group_by_semantics(utterances: &[Utterance], gap_threshold_ms: u64) -> Vec<&[Utterance]> {
    let mut groups = Vec::new();
    let mut start = 0;

    for i in 1..utterances.len() {
        let prev = &utterances[i - 1];
        let next = &utterances[i];

        let speaker_changed = next.speaker_id != prev.speaker_id;
        let gap_exceeded = match (prev.end_time, next.start_time) {
            (Some(end), Some(begin)) => begin.saturating_sub(end) > gap_threshold_ms,
            _ => false,
        };

        if speaker_changed || gap_exceeded {
            groups.push(&utterances[start..i]);
            start = i;
        }
    }

    if start < utterances.len() {
        groups.push(&utterances[start..]);
    }

    groups
}

/// Format one group as a labeled line. Returns `None` when every utterance
/// in the group is empty or whitespace-only.
fn format_group(group: &[Utterance]) -> Option<String> {
    let speaker_id = group.first()?.speaker_id;
    let texts: Vec<&str> = group
        .iter()
        .map(|u| u.text.trim())
        .filter(|t| !t.is_empty())
        .collect();

    if texts.is_empty() {
        return None;
    }

    Some(format!("[Speaker {}]: {}", speaker_id + 1, texts.join(" ")))
}
