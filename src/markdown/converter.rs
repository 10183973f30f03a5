//! Transcript to Markdown conversion

use std::collections::HashMap;

use crate::fireflies::Transcript;

/// Strip characters that are hostile to filenames and object keys, keeping
/// word characters, whitespace, and dashes. Truncated to 50 characters.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .take(50)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Filename for the rendered document: `<date>_<safe-title>_<meeting-id>.md`
pub fn markdown_filename(transcript: &Transcript, meeting_id: &str) -> String {
    let date = transcript
        .date_utc()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "undated".to_string());

    format!("{}_{}_{}.md", date, sanitize_title(&transcript.title), meeting_id)
}

/// Render a transcript as a Markdown document: metadata header, the
/// Fireflies summary when present, then the conversation with consecutive
/// sentences from one speaker merged into a single paragraph.
pub fn to_markdown(transcript: &Transcript) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", transcript.title.trim()));
    if let Some(date) = transcript.date_utc() {
        md.push_str(&format!("**Date:** {}\n", date.format("%Y-%m-%d %H:%M")));
    }
    md.push_str(&format!(
        "**Duration:** {} minutes\n",
        transcript.duration.unwrap_or(0.0).round() as i64
    ));
    if let Some(url) = transcript.transcript_url.as_deref() {
        md.push_str(&format!("**Transcript:** [View Transcript]({url})\n"));
    }
    md.push_str(&format!(
        "**Participants:** {}\n\n",
        transcript.participants.join(", ")
    ));

    if let Some(summary) = &transcript.summary {
        if let Some(overview) = summary.overview.as_deref() {
            if !overview.trim().is_empty() {
                md.push_str("## Summary\n\n");
                md.push_str(overview.trim());
                md.push_str("\n\n");
            }
        }

        if !summary.action_items.is_empty() {
            md.push_str("## Action Items\n\n");
            for item in &summary.action_items {
                md.push_str(&format!("- {item}\n"));
            }
            md.push('\n');
        }

        if !summary.keywords.is_empty() {
            md.push_str(&format!("**Keywords:** {}\n\n", summary.keywords.join(", ")));
        }
    }

    md.push_str("## Transcript\n\n");

    let speaker_map = speaker_names(&transcript.participants);
    let mut current_speaker: Option<String> = None;
    let mut paragraph: Vec<&str> = Vec::new();

    for sentence in &transcript.sentences {
        let text = sentence.text.trim();
        if text.is_empty() {
            continue;
        }

        let speaker = speaker_map
            .get(&sentence.speaker_id)
            .cloned()
            .unwrap_or_else(|| format!("Speaker {}", sentence.speaker_id + 1));

        if current_speaker.as_deref() != Some(speaker.as_str()) {
            if let Some(previous) = current_speaker.take() {
                if !paragraph.is_empty() {
                    md.push_str(&format!("**{}:** {}\n\n", previous, paragraph.join(" ")));
                }
            }
            current_speaker = Some(speaker);
            paragraph = vec![text];
        } else {
            paragraph.push(text);
        }
    }

    if let Some(previous) = current_speaker {
        if !paragraph.is_empty() {
            md.push_str(&format!("**{}:** {}\n\n", previous, paragraph.join(" ")));
        }
    }

    md
}

/// Map speaker ids to display names taken from participant emails. The
/// first participant is skipped: it is usually the notetaker bot, and the
/// remaining order lines up with speaker ids in practice.
fn speaker_names(participants: &[String]) -> HashMap<i64, String> {
    participants
        .iter()
        .skip(1)
        .enumerate()
        .map(|(i, email)| {
            let local = email.split('@').next().unwrap_or(email);
            (i as i64, capitalize(local))
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
