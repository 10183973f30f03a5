//! CLI command implementations

use anyhow::Result;
use chrono::{TimeZone, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::chunking::Cl100kTokenizer;
use crate::cli::args::ConfigCommand;
use crate::config::Settings;
use crate::fireflies::FirefliesClient;
use crate::pipeline::{ShutdownFlag, SyncPipeline, TranscriptOutcome};

/// Run the sync pipeline: one transcript, a full pass, or watch mode.
pub async fn sync(
    settings: &Settings,
    id: Option<String>,
    limit: Option<usize>,
    dry_run: bool,
    watch: bool,
    interval_mins: Option<u64>,
) -> Result<()> {
    if !dry_run {
        settings.ensure_dirs()?;
    }

    let shutdown = ShutdownFlag::new();
    shutdown.watch_signals();

    let pipeline = SyncPipeline::new(settings, dry_run, shutdown)?;

    if let Some(id) = id {
        match pipeline.sync_one(&id).await? {
            TranscriptOutcome::Synced {
                meeting_id,
                chunks_stored,
                chunks_failed,
            } => {
                println!(
                    "Synced transcript {id} into meeting {meeting_id} ({chunks_stored} chunks stored, {chunks_failed} failed)"
                );
            }
            TranscriptOutcome::Skipped => {
                println!("Transcript {id} already ingested, nothing to do");
            }
            TranscriptOutcome::DryRun { chunk_count } => {
                println!("Dry run: built {chunk_count} chunks for transcript {id}");
            }
        }
        return Ok(());
    }

    if watch {
        let minutes = interval_mins.unwrap_or(settings.sync.watch_interval_mins);
        let interval = Duration::from_secs(minutes.saturating_mul(60));
        println!("Watching for new transcripts every {minutes} minutes (Ctrl-C to stop)");
        pipeline.watch(limit, interval).await?;
        return Ok(());
    }

    let report = pipeline.sync_all(limit).await?;
    println!(
        "Sync complete: {} synced, {} skipped, {} failed ({} chunks stored, {} chunks failed)",
        report.synced, report.skipped, report.failed, report.chunks_stored, report.chunks_failed
    );
    if report.interrupted {
        println!("Run was interrupted by a shutdown signal");
    }

    Ok(())
}

/// List transcripts available at the source
pub async fn list_transcripts(settings: &Settings, limit: usize) -> Result<()> {
    let client = FirefliesClient::from_settings(settings)?;
    let transcripts = client.fetch_transcripts(limit, 0).await?;

    if transcripts.is_empty() {
        println!("No transcripts found");
        return Ok(());
    }

    println!(
        "{:<24} {:<40} {:<12} {:<10}",
        "ID", "Title", "Date", "Duration"
    );
    println!("{}", "-".repeat(90));

    for transcript in transcripts {
        let date = transcript
            .date
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let duration = transcript
            .duration
            .map(|m| format!("{} min", m.round() as i64))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<24} {:<40} {:<12} {:<10}",
            transcript.id,
            truncate(&transcript.title, 38),
            date,
            duration
        );
    }

    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(settings)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: &'static str,
    detail: &'static str,
}

#[derive(Serialize)]
struct DoctorReport {
    checks: Vec<DoctorCheck>,
    notes: Vec<String>,
}

/// Run diagnostic checks to help troubleshoot local setup issues.
pub async fn run_doctor(settings: &Settings, json: bool) -> Result<()> {
    let report = collect_doctor_report(settings);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("meetsync doctor");
    println!();

    for check in &report.checks {
        println!("{:<22} {:<8} {}", check.name, check.status, check.detail);
    }

    if !report.notes.is_empty() {
        println!();
        for note in &report.notes {
            println!("{}", note);
        }
    }

    Ok(())
}

fn collect_doctor_report(settings: &Settings) -> DoctorReport {
    let mut notes = Vec::new();

    let checks = vec![
        key_check(
            "fireflies.api_key",
            &settings.fireflies.api_key,
            "required to fetch transcripts",
        ),
        key_check(
            "embedding.api_key",
            &settings.embedding.api_key,
            "required to embed chunks",
        ),
        key_check(
            "supabase.url",
            &settings.supabase.url,
            "required to store meetings",
        ),
        key_check(
            "supabase.service_key",
            &settings.supabase.service_key,
            "required to store meetings",
        ),
        DoctorCheck {
            name: "tokenizer",
            status: if Cl100kTokenizer::new().is_ok() {
                "ok"
            } else {
                "error"
            },
            detail: "cl100k_base vocabulary",
        },
    ];

    if settings.chunking.overlap >= settings.chunking.chunk_size {
        notes.push(format!(
            "warning: chunking.overlap ({}) is not smaller than chunking.chunk_size ({}); consecutive chunks will mostly duplicate each other.",
            settings.chunking.overlap, settings.chunking.chunk_size
        ));
    }

    if checks.iter().any(|c| c.status == "missing") {
        notes.push(
            "hint: set missing values in the config file (`meetsync config path`) or export FIREFLIES_API_KEY / OPENAI_API_KEY / SUPABASE_URL / SUPABASE_SERVICE_KEY."
                .to_string(),
        );
    }

    DoctorReport { checks, notes }
}

fn key_check(name: &'static str, value: &str, detail: &'static str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: if value.trim().is_empty() {
            "missing"
        } else {
            "ok"
        },
        detail,
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let prefix: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", prefix)
    }
}
