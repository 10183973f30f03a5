//! Fireflies transcript source
//!
//! GraphQL client and wire models for fetching meeting transcripts.

mod client;
mod models;

pub use client::FirefliesClient;
pub use models::{MeetingSummary, Sentence, Transcript, TranscriptListing};
