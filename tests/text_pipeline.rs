//! Text Pipeline Integration Tests
//!
//! Normalized transcript in, key-phrase table and sentiment record out.

use std::sync::Arc;

use callflow::adapters::{MemoryStore, MockTextAnalytics, ServiceError};
use callflow::config::PipelineSettings;
use callflow::core::PipelineError;
use callflow::domain::{KeyPhrase, Sentiment, SentimentLabel, SentimentScore, SourceObject};
use callflow::TextHandler;

const TRANSCRIPT: &str = r#"{"JobName":"abc-123","Text":"I want a refund for this billing error"}"#;

fn phrases() -> Vec<KeyPhrase> {
    vec![
        KeyPhrase {
            text: "refund".to_string(),
            score: 0.91,
        },
        KeyPhrase {
            text: "billing".to_string(),
            score: 0.77,
        },
    ]
}

fn negative() -> Sentiment {
    Sentiment {
        label: SentimentLabel::Negative,
        scores: SentimentScore {
            mixed: 0.01,
            negative: 0.87,
            neutral: 0.1,
            positive: 0.02,
        },
    }
}

async fn transcript_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.insert("transcripts", "call42.json", TRANSCRIPT).await;
    store
}

fn source() -> SourceObject {
    SourceObject::new("transcripts", "call42.json")
}

#[tokio::test]
async fn test_writes_key_phrases_and_sentiment() {
    let store = transcript_store().await;
    let analytics = Arc::new(MockTextAnalytics::new(Vec::new(), negative(), phrases()));
    let handler = TextHandler::new(store.clone(), analytics.clone(), PipelineSettings::default());

    let outcome = handler.handle(&source()).await.unwrap();

    assert_eq!(outcome.status, "application/json");
    assert!(outcome.job_name.is_none());
    assert_eq!(outcome.report.written(), 2);
    assert_eq!(analytics.calls(), 3);

    let table = store
        .object("athena-data/key-phrases", "call42.csv")
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8(table).unwrap(),
        "Id,Score,Text\ncall42,0.91,refund\ncall42,0.77,billing\n"
    );

    let record = store
        .object("athena-data/sentiment", "call42.json")
        .await
        .unwrap();
    let record: serde_json::Value = serde_json::from_slice(&record).unwrap();
    assert_eq!(record["Id"], "call42");
    assert_eq!(record["Sentiment"], "NEGATIVE");
    assert_eq!(record["MixedScore"], 0.01);
    assert_eq!(record["NegativeScore"], 0.87);
    assert_eq!(record["NeutralScore"], 0.1);
    assert_eq!(record["PositiveScore"], 0.02);
}

#[tokio::test]
async fn test_no_phrases_writes_header_only() {
    let store = transcript_store().await;
    let analytics = Arc::new(MockTextAnalytics::new(Vec::new(), negative(), Vec::new()));
    let handler = TextHandler::new(store.clone(), analytics, PipelineSettings::default());

    handler.handle(&source()).await.unwrap();

    let table = store
        .object("athena-data/key-phrases", "call42.csv")
        .await
        .unwrap();
    assert_eq!(table, b"Id,Score,Text\n".to_vec());
}

#[tokio::test]
async fn test_failed_key_phrases_keeps_sentiment() {
    let store = transcript_store().await;
    let mut mock = MockTextAnalytics::new(Vec::new(), negative(), phrases());
    mock.key_phrases = Err(ServiceError::Status {
        status: 503,
        body: "throttled".to_string(),
    });
    let handler = TextHandler::new(store.clone(), Arc::new(mock), PipelineSettings::default());

    let err = handler.handle(&source()).await.unwrap_err();

    match err {
        PipelineError::Analysis { failures } => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].starts_with("key phrases"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(store
        .object("athena-data/sentiment", "call42.json")
        .await
        .is_some());
    assert!(store
        .object("athena-data/key-phrases", "call42.csv")
        .await
        .is_none());
}

#[tokio::test]
async fn test_failed_entities_do_not_fail_invocation() {
    let store = transcript_store().await;
    let mut mock = MockTextAnalytics::new(Vec::new(), negative(), phrases());
    mock.entities = Err(ServiceError::Request("connection reset".to_string()));
    let handler = TextHandler::new(store.clone(), Arc::new(mock), PipelineSettings::default());

    let outcome = handler.handle(&source()).await.unwrap();

    assert_eq!(outcome.report.written(), 2);
    assert_eq!(store.keys().await.len(), 3);
}

#[tokio::test]
async fn test_failed_table_write_keeps_sentiment() {
    let store = transcript_store().await;
    store.fail_writes_to("athena-data/key-phrases").await;
    let analytics = Arc::new(MockTextAnalytics::new(Vec::new(), negative(), phrases()));
    let handler = TextHandler::new(store.clone(), analytics, PipelineSettings::default());

    let outcome = handler.handle(&source()).await.unwrap();

    assert_eq!(outcome.report.written(), 1);
    assert_eq!(outcome.report.failed(), 1);
    assert!(store
        .object("athena-data/sentiment", "call42.json")
        .await
        .is_some());
}

#[tokio::test]
async fn test_missing_transcript_is_store_error() {
    let store = Arc::new(MemoryStore::new());
    let analytics = Arc::new(MockTextAnalytics::default());
    let handler = TextHandler::new(store, analytics.clone(), PipelineSettings::default());

    let err = handler.handle(&source()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Store { .. }));
    assert_eq!(analytics.calls(), 0);
}

#[tokio::test]
async fn test_failed_calls_are_aggregated() {
    let store = transcript_store().await;
    let mut mock = MockTextAnalytics::new(Vec::new(), negative(), phrases());
    mock.key_phrases = Err(ServiceError::Request("phrases down".to_string()));
    mock.sentiment = Err(ServiceError::Request("sentiment down".to_string()));
    let handler = TextHandler::new(store.clone(), Arc::new(mock), PipelineSettings::default());

    let err = handler.handle(&source()).await.unwrap_err();

    match err {
        PipelineError::Analysis { failures } => {
            assert_eq!(failures.len(), 2);
            assert!(failures
                .iter()
                .any(|f| f.starts_with("key phrases") && f.contains("phrases down")));
            assert!(failures
                .iter()
                .any(|f| f.starts_with("sentiment") && f.contains("sentiment down")));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        store.keys().await,
        vec![("transcripts".to_string(), "call42.json".to_string())]
    );
}
