//! Wire models for the Fireflies GraphQL API
//!
//! The API returns explicit `null` for absent lists, so collection fields
//! normalize null to empty during deserialization.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use crate::chunking::Utterance;

/// Deserialize `null` as `T::default()`.
pub(crate) fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One row of the paginated transcript listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptListing {
    pub id: String,
    pub title: String,

    /// Meeting date as epoch milliseconds
    #[serde(default)]
    pub date: Option<i64>,

    /// Duration in minutes
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Full transcript detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub transcript_url: Option<String>,

    /// Duration in minutes
    #[serde(default)]
    pub duration: Option<f64>,

    /// Meeting date as epoch milliseconds
    #[serde(default)]
    pub date: Option<i64>,

    /// Participant email addresses
    #[serde(default, deserialize_with = "null_to_default")]
    pub participants: Vec<String>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub sentences: Vec<Sentence>,

    #[serde(default)]
    pub summary: Option<MeetingSummary>,
}

/// One spoken sentence as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(default, deserialize_with = "null_to_default")]
    pub text: String,

    #[serde(default, deserialize_with = "null_to_default")]
    pub speaker_id: i64,

    /// Start offset in milliseconds
    #[serde(default)]
    pub start_time: Option<f64>,

    /// End offset in milliseconds
    #[serde(default)]
    pub end_time: Option<f64>,
}

/// Fireflies-generated meeting summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeetingSummary {
    #[serde(default, deserialize_with = "null_to_default")]
    pub keywords: Vec<String>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub action_items: Vec<String>,

    #[serde(default, deserialize_with = "null_to_default")]
    pub outline: Vec<String>,

    #[serde(default)]
    pub shorthand_bullet: Option<String>,

    #[serde(default)]
    pub overview: Option<String>,
}

impl Sentence {
    pub fn to_utterance(&self) -> Utterance {
        Utterance {
            speaker_id: self.speaker_id,
            text: self.text.clone(),
            start_time: self.start_time.map(|t| t as u64),
            end_time: self.end_time.map(|t| t as u64),
        }
    }
}

impl Transcript {
    /// Sentences adapted to the chunker's input type.
    pub fn utterances(&self) -> Vec<Utterance> {
        self.sentences.iter().map(Sentence::to_utterance).collect()
    }

    /// Transcript-level keyword list, empty when the summary is absent.
    pub fn keywords(&self) -> &[String] {
        self.summary
            .as_ref()
            .map(|s| s.keywords.as_slice())
            .unwrap_or(&[])
    }

    /// Meeting date as UTC, when the source supplied one.
    pub fn date_utc(&self) -> Option<DateTime<Utc>> {
        self.date
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Total words across all sentences.
    pub fn word_count(&self) -> usize {
        self.sentences
            .iter()
            .map(|s| s.text.split_whitespace().count())
            .sum()
    }

    /// Number of distinct speakers in the transcript.
    pub fn speaker_count(&self) -> usize {
        self.sentences
            .iter()
            .map(|s| s.speaker_id)
            .collect::<HashSet<_>>()
            .len()
    }
}
