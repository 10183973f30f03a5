//! Supabase store and repository tests against a mocked REST backend.

use httpmock::prelude::*;
use serde_json::json;

use meetsync::config::Settings;
use meetsync::storage::{NewChunk, Repository, SupabaseStore};

fn settings_for(server: &MockServer, data_dir: Option<&std::path::Path>) -> Settings {
    let mut settings = Settings::default();
    settings.supabase.url = server.base_url();
    settings.supabase.service_key = "sb-key".to_string();
    if let Some(dir) = data_dir {
        settings.general.data_dir = dir.to_path_buf();
    }
    settings
}

#[tokio::test]
async fn existing_ids_tolerate_object_and_string_metadata() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/meetings")
                .query_param("select", "id,raw_metadata");
            then.status(200).json_body(json!([
                {"id": "m-1", "raw_metadata": {"fireflies_id": "ff-1"}},
                {"id": "m-2", "raw_metadata": "{\"fireflies_id\": \"ff-2\"}"},
                {"id": "m-3", "raw_metadata": "not json"},
                {"id": "m-4", "raw_metadata": {"source": "manual-upload"}}
            ]));
        })
        .await;

    let repository = Repository::new(&settings_for(&server, None)).expect("repository");
    let ids = repository.existing_fireflies_ids().await.expect("ids");

    assert_eq!(ids.len(), 2);
    assert!(ids.contains("ff-1"));
    assert!(ids.contains("ff-2"));

    assert!(repository.is_ingested("ff-2").await.expect("check"));
    assert!(!repository.is_ingested("ff-9").await.expect("check"));
}

#[tokio::test]
async fn insert_meeting_returns_the_row_id() {
    let server = MockServer::start_async().await;

    let insert = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/meetings")
                .header("Prefer", "return=representation")
                .header("apikey", "sb-key");
            then.status(201).json_body(json!([{"id": "meeting-9"}]));
        })
        .await;

    let store = SupabaseStore::from_settings(&settings_for(&server, None)).expect("store");
    let meeting = sample_meeting();
    let id = store.insert_meeting(&meeting).await.expect("insert");

    assert_eq!(id, "meeting-9");
    assert_eq!(insert.hits_async().await, 1);
}

#[tokio::test]
async fn markdown_upload_targets_the_bucket_object_path() {
    let server = MockServer::start_async().await;

    let upload = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/storage/v1/object/meetings/transcripts/m-1/doc.md")
                .header("Content-Type", "text/markdown")
                .body_contains("# Planning");
            then.status(200).json_body(json!({"Key": "ok"}));
        })
        .await;

    let store = SupabaseStore::from_settings(&settings_for(&server, None)).expect("store");
    store
        .upload_markdown("transcripts/m-1/doc.md", "# Planning\n")
        .await
        .expect("upload");

    assert_eq!(upload.hits_async().await, 1);
}

#[tokio::test]
async fn failed_writes_surface_as_transient_storage_errors() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/meeting_chunks");
            then.status(500).body("database unavailable");
        })
        .await;

    let store = SupabaseStore::from_settings(&settings_for(&server, None)).expect("store");
    let chunk = NewChunk {
        meeting_id: "m-1".to_string(),
        chunk_index: 0,
        content: "text".to_string(),
        embedding: vec![0.0, 0.0, 0.0],
        metadata: json!({}),
    };

    let err = store.insert_chunk(&chunk).await.expect_err("500 should fail");
    assert!(err.is_transient());
    assert!(err.to_string().contains("inserting chunk"));
}

fn sample_meeting() -> meetsync::storage::NewMeeting {
    use meetsync::fireflies::Transcript;

    let transcript: Transcript = serde_json::from_value(json!({
        "id": "ff-9",
        "title": "Planning",
        "date": 1722902400000i64,
        "participants": ["bot@fireflies.ai"],
        "sentences": []
    }))
    .expect("transcript fixture");

    meetsync::storage::NewMeeting::from_transcript("meeting-9".to_string(), &transcript)
}
