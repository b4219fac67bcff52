//! Audio Pipeline Integration Tests
//!
//! Drives the audio handler end-to-end over in-memory collaborators.

use std::sync::Arc;

use callflow::adapters::{ArtifactStore, LocalStore, MemoryStore, MockJobService};
use callflow::config::PipelineSettings;
use callflow::core::{AudioHandler, PipelineError, PollPolicy};
use callflow::domain::{JobStatusReport, NormalizedTranscript, ResultReference, SourceObject};
use reqwest::Url;
use tempfile::TempDir;

const DOCUMENT: &str =
    r#"{"jobName":"abc-123","results":{"transcripts":[{"transcript":"hello world"}]}}"#;

fn settings() -> PipelineSettings {
    PipelineSettings {
        poll: PollPolicy {
            interval_ms: 1,
            max_attempts: 10,
        },
        ..Default::default()
    }
}

async fn audio_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert("call-audio", "call42.mp3", vec![0u8; 16]).await;
    store
}

fn source() -> SourceObject {
    SourceObject::new("call-audio", "call42.mp3")
}

/// Write the transcript document to disk and return its file:// URI
fn document_uri(temp: &TempDir, content: &str) -> String {
    let path = temp.path().join("result.json");
    std::fs::write(&path, content).unwrap();
    Url::from_file_path(&path).unwrap().to_string()
}

#[tokio::test]
async fn test_completed_job_writes_raw_and_normalized() {
    let temp = TempDir::new().unwrap();
    let store = audio_store().await;
    let speech = Arc::new(MockJobService::new(vec![
        JobStatusReport::in_progress(),
        JobStatusReport::in_progress(),
        JobStatusReport::completed(ResultReference::Uri(document_uri(&temp, DOCUMENT))),
    ]));
    let handler = AudioHandler::new(store.clone(), speech.clone(), settings());

    let outcome = handler.handle(&source()).await.unwrap();

    assert_eq!(outcome.status, "audio/mpeg");
    assert!(!outcome.job_failed);
    assert_eq!(outcome.report.written(), 2);
    assert_eq!(speech.polls(), 3);

    let job_name = outcome.job_name.unwrap();
    let key = format!("{}.json", job_name);

    let raw = store.object("raw-transcripts", &key).await.unwrap();
    assert_eq!(raw, DOCUMENT.as_bytes());

    let normalized = store.object("transcripts", &key).await.unwrap();
    assert_eq!(normalized, br#"{"JobName":"abc-123","Text":"hello world"}"#.to_vec());
}

#[tokio::test]
async fn test_no_polls_after_terminal_state() {
    let store = audio_store().await;
    let speech = Arc::new(MockJobService::new(vec![
        JobStatusReport::completed(ResultReference::Inline(DOCUMENT.to_string())),
        JobStatusReport::in_progress(),
        JobStatusReport::in_progress(),
    ]));
    let handler = AudioHandler::new(store, speech.clone(), settings());

    handler.handle(&source()).await.unwrap();

    assert_eq!(speech.polls(), 1);
    assert_eq!(speech.submitted().await.len(), 1);
}

#[tokio::test]
async fn test_failed_job_writes_nothing() {
    let store = audio_store().await;
    let speech = Arc::new(MockJobService::new(vec![
        JobStatusReport::in_progress(),
        JobStatusReport::failed("unsupported media"),
    ]));
    let handler = AudioHandler::new(store.clone(), speech.clone(), settings());

    let outcome = handler.handle(&source()).await.unwrap();

    assert!(outcome.job_failed);
    assert_eq!(outcome.status, "audio/mpeg");
    assert!(outcome.report.outcomes.is_empty());
    assert_eq!(speech.polls(), 2);
    assert_eq!(
        store.keys().await,
        vec![("call-audio".to_string(), "call42.mp3".to_string())]
    );
}

#[tokio::test]
async fn test_missing_transcripts_is_shape_error() {
    let store = audio_store().await;
    let speech = Arc::new(MockJobService::new(vec![JobStatusReport::completed(
        ResultReference::Inline(r#"{"jobName":"abc-123","results":{}}"#.to_string()),
    )]));
    let handler = AudioHandler::new(store.clone(), speech, settings());

    let err = handler.handle(&source()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Shape(_)));
    assert_eq!(store.keys().await.len(), 1);
}

#[tokio::test]
async fn test_submission_error_surfaces() {
    let store = audio_store().await;
    let speech = Arc::new(MockJobService::rejecting("quota exceeded"));
    let handler = AudioHandler::new(store, speech.clone(), settings());

    let err = handler.handle(&source()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Submission { .. }));
    assert!(err.is_fatal());
    assert_eq!(speech.polls(), 0);
}

#[tokio::test]
async fn test_unreachable_result_is_fetch_error() {
    let store = audio_store().await;
    let speech = Arc::new(MockJobService::new(vec![JobStatusReport::completed(
        ResultReference::Uri("file:///no/such/transcript.json".to_string()),
    )]));
    let handler = AudioHandler::new(store.clone(), speech, settings());

    let err = handler.handle(&source()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Fetch { .. }));
    assert_eq!(store.keys().await.len(), 1);
}

#[tokio::test]
async fn test_failed_write_is_isolated() {
    let store = audio_store().await;
    store.fail_writes_to("transcripts").await;
    let speech = Arc::new(MockJobService::new(vec![JobStatusReport::completed(
        ResultReference::Inline(DOCUMENT.to_string()),
    )]));
    let handler = AudioHandler::new(store.clone(), speech, settings());

    let outcome = handler.handle(&source()).await.unwrap();

    assert_eq!(outcome.report.written(), 1);
    assert_eq!(outcome.report.failed(), 1);

    let key = format!("{}.json", outcome.job_name.unwrap());
    assert!(store.object("transcripts", &key).await.is_none());
    assert_eq!(
        store.object("raw-transcripts", &key).await.unwrap(),
        DOCUMENT.as_bytes()
    );
}

#[tokio::test]
async fn test_normalized_transcript_round_trip_on_disk() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(LocalStore::new(temp.path()));
    store
        .put("call-audio", "call42.mp3", vec![0u8; 16], "audio/mpeg")
        .await
        .unwrap();
    let speech = Arc::new(MockJobService::new(vec![JobStatusReport::completed(
        ResultReference::Inline(DOCUMENT.to_string()),
    )]));
    let handler = AudioHandler::new(store.clone(), speech, settings());

    let outcome = handler.handle(&source()).await.unwrap();
    let key = format!("{}.json", outcome.job_name.unwrap());

    let bytes = store.get("transcripts", &key).await.unwrap();
    let record: NormalizedTranscript = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(record.job_name, "abc-123");
    assert_eq!(record.text, "hello world");
}
