//! Markdown rendering of transcripts
//!
//! Produces the document stored in the bucket and kept as a local copy.

mod converter;

pub use converter::{markdown_filename, sanitize_title, to_markdown};
