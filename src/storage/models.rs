//! Data models for storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::fireflies::Transcript;

/// How many transcript keywords become meeting tags.
const MAX_TAGS: usize = 10;

/// A meeting row ready for insertion.
#[derive(Debug, Clone, Serialize)]
pub struct NewMeeting {
    /// Client-generated UUID
    pub id: String,
    pub title: String,
    pub date: Option<DateTime<Utc>>,
    pub transcript_url: Option<String>,
    pub participants: Vec<String>,
    pub duration_minutes: i64,
    pub word_count: i64,
    pub speaker_count: i64,
    /// Source-specific metadata; carries the fireflies id used for
    /// idempotent re-ingestion checks.
    pub raw_metadata: Value,
    pub tags: Vec<String>,
}

impl NewMeeting {
    pub fn from_transcript(id: String, transcript: &Transcript) -> Self {
        let raw_metadata = json!({
            "fireflies_id": transcript.id,
            "summary": transcript.summary,
            "participant_count": transcript.participants.len(),
        });

        Self {
            id,
            title: transcript.title.clone(),
            date: transcript.date_utc(),
            transcript_url: transcript.transcript_url.clone(),
            participants: transcript.participants.clone(),
            duration_minutes: transcript.duration.unwrap_or(0.0).round() as i64,
            word_count: transcript.word_count() as i64,
            speaker_count: transcript.speaker_count() as i64,
            raw_metadata,
            tags: transcript.keywords().iter().take(MAX_TAGS).cloned().collect(),
        }
    }
}

/// A chunk row ready for insertion.
#[derive(Debug, Clone, Serialize)]
pub struct NewChunk {
    pub meeting_id: String,
    pub chunk_index: i64,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: Value,
}

/// A summary row ready for insertion.
#[derive(Debug, Clone, Serialize)]
pub struct NewSummary {
    pub meeting_id: String,
    pub summary_type: String,
    pub summary_text: String,
    pub key_points: Vec<String>,
    pub action_items: Vec<String>,
    pub generated_by: String,
}

/// A meeting row as read back from the store.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingRow {
    pub id: String,

    #[serde(default)]
    pub raw_metadata: Value,
}

impl MeetingRow {
    /// Extract the fireflies id recorded at ingestion time. Older rows
    /// store `raw_metadata` as a JSON-encoded string rather than an
    /// object; both shapes are accepted.
    pub fn fireflies_id(&self) -> Option<String> {
        let metadata = match &self.raw_metadata {
            Value::String(encoded) => serde_json::from_str::<Value>(encoded).ok()?,
            other => other.clone(),
        };

        metadata
            .get("fireflies_id")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fireflies::Sentence;

    fn transcript() -> Transcript {
        Transcript {
            id: "ff-42".to_string(),
            title: "Planning".to_string(),
            transcript_url: None,
            duration: Some(30.4),
            date: Some(1722902400000),
            participants: vec!["bot@fireflies.ai".to_string(), "ana@example.com".to_string()],
            sentences: vec![Sentence {
                text: "Two words".to_string(),
                speaker_id: 0,
                start_time: None,
                end_time: None,
            }],
            summary: None,
        }
    }

    #[test]
    fn meeting_record_carries_fireflies_id_in_metadata() {
        let meeting = NewMeeting::from_transcript("m-1".to_string(), &transcript());

        assert_eq!(meeting.raw_metadata["fireflies_id"], "ff-42");
        assert_eq!(meeting.duration_minutes, 30);
        assert_eq!(meeting.word_count, 2);
        assert_eq!(meeting.speaker_count, 1);
    }

    #[test]
    fn fireflies_id_reads_object_metadata() {
        let row = MeetingRow {
            id: "m-1".to_string(),
            raw_metadata: json!({"fireflies_id": "ff-42"}),
        };
        assert_eq!(row.fireflies_id().as_deref(), Some("ff-42"));
    }

    #[test]
    fn fireflies_id_reads_string_encoded_metadata() {
        let row = MeetingRow {
            id: "m-1".to_string(),
            raw_metadata: Value::String(r#"{"fireflies_id": "ff-42"}"#.to_string()),
        };
        assert_eq!(row.fireflies_id().as_deref(), Some("ff-42"));
    }

    #[test]
    fn fireflies_id_is_none_for_unrelated_metadata() {
        let row = MeetingRow {
            id: "m-1".to_string(),
            raw_metadata: json!({"source": "manual-upload"}),
        };
        assert!(row.fireflies_id().is_none());

        let garbled = MeetingRow {
            id: "m-2".to_string(),
            raw_metadata: Value::String("not json".to_string()),
        };
        assert!(garbled.fireflies_id().is_none());
    }
}
