//! FirefliesClient tests against a mocked GraphQL endpoint.

use httpmock::prelude::*;
use serde_json::json;

use meetsync::config::Settings;
use meetsync::fireflies::FirefliesClient;

fn client_for(server: &MockServer) -> FirefliesClient {
    let mut settings = Settings::default();
    settings.fireflies.api_key = "ff-key".to_string();
    settings.fireflies.endpoint = server.url("/graphql");
    FirefliesClient::from_settings(&settings).expect("client")
}

#[tokio::test]
async fn listing_pages_until_an_empty_batch() {
    let server = MockServer::start_async().await;

    let first_page = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains("GetTranscripts")
                .body_contains("\"skip\":0");
            then.status(200).json_body(json!({
                "data": {
                    "transcripts": [
                        {"id": "ff-1", "title": "Standup", "date": 1722902400000i64, "duration": 15.0},
                        {"id": "ff-2", "title": "Retro", "date": 1722988800000i64, "duration": 45.0}
                    ]
                }
            }));
        })
        .await;

    let second_page = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/graphql")
                .body_contains("GetTranscripts")
                .body_contains("\"skip\":2");
            then.status(200).json_body(json!({"data": {"transcripts": []}}));
        })
        .await;

    let client = client_for(&server);
    let all = client.fetch_all_transcripts(2).await.expect("listing");

    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, "ff-1");
    assert_eq!(all[1].title, "Retro");
    assert_eq!(first_page.hits_async().await, 1);
    assert_eq!(second_page.hits_async().await, 1);
}

#[tokio::test]
async fn graphql_errors_are_surfaced() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(json!({
                "data": null,
                "errors": [{"message": "invalid api key"}]
            }));
        })
        .await;

    let client = client_for(&server);
    let err = client
        .fetch_transcripts(10, 0)
        .await
        .expect_err("errors array should fail the call");

    assert!(err.to_string().contains("invalid api key"));
    assert!(err.is_transient());
}

#[tokio::test]
async fn null_transcript_detail_is_not_found() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(json!({"data": {"transcript": null}}));
        })
        .await;

    let client = client_for(&server);
    let err = client
        .fetch_transcript("does-not-exist")
        .await
        .expect_err("null transcript should be an error");

    assert!(err.to_string().contains("does-not-exist"));
}

#[tokio::test]
async fn null_sentence_lists_are_normalized() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(200).json_body(json!({
                "data": {
                    "transcript": {
                        "id": "ff-3",
                        "title": "Empty Meeting",
                        "date": 1722902400000i64,
                        "participants": null,
                        "sentences": null,
                        "summary": null
                    }
                }
            }));
        })
        .await;

    let client = client_for(&server);
    let transcript = client.fetch_transcript("ff-3").await.expect("fetch");

    assert!(transcript.sentences.is_empty());
    assert!(transcript.participants.is_empty());
}
