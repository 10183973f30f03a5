//! Storage module for meetsync
//!
//! Persists meetings, chunks, and summaries into Supabase (PostgREST
//! tables plus a storage bucket for the markdown documents).

mod models;
mod repository;
mod supabase;

pub use models::{MeetingRow, NewChunk, NewMeeting, NewSummary};
pub use repository::Repository;
pub use supabase::SupabaseStore;
