//! Text analytics fan-out and the artifacts derived from it.
//!
//! Entity, sentiment and key-phrase detection run concurrently against the
//! same text and language; each call's outcome is kept separately so one
//! failing call does not discard the others. Entities are detected but not
//! persisted.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapters::{ServiceError, TextAnalytics};
use crate::domain::artifact::{KEY_PHRASES, SENTIMENT};
use crate::domain::{
    key_without_extension, ContentKind, DerivedArtifact, Destination, Entity, KeyPhrase,
    KeyPhraseRow, Sentiment, SentimentRecord,
};

use super::error::PipelineError;

/// Header of the key-phrase table
pub const KEY_PHRASE_HEADER: [&str; 3] = ["Id", "Score", "Text"];

/// Outcome of the three analytics calls for one text
#[derive(Debug, Clone)]
pub struct AnalysisFindings {
    pub entities: Result<Vec<Entity>, ServiceError>,
    pub sentiment: Result<Sentiment, ServiceError>,
    pub key_phrases: Result<Vec<KeyPhrase>, ServiceError>,
}

/// Artifacts derived from a set of findings, plus the calls that failed
#[derive(Debug, Clone, Default)]
pub struct DerivedFindings {
    pub artifacts: Vec<DerivedArtifact>,
    pub failures: Vec<String>,
}

impl AnalysisFindings {
    /// Derive the key-phrase table and sentiment record for `source_key`
    ///
    /// Only successful calls produce artifacts; a failed sentiment or
    /// key-phrase call is reported in `failures`. Entity failures are logged
    /// and otherwise ignored.
    pub fn derive(&self, source_key: &str) -> DerivedFindings {
        let mut derived = DerivedFindings::default();

        match &self.entities {
            Ok(entities) => debug!(count = entities.len(), "Entities detected"),
            Err(e) => warn!(error = %e, "Entity detection failed"),
        }

        match &self.key_phrases {
            Ok(phrases) => match key_phrase_artifact(source_key, phrases) {
                Ok(artifact) => derived.artifacts.push(artifact),
                Err(e) => derived.failures.push(format!("key phrases: {}", e)),
            },
            Err(e) => derived.failures.push(format!("key phrases: {}", e)),
        }

        match &self.sentiment {
            Ok(sentiment) => match sentiment_artifact(source_key, sentiment) {
                Ok(artifact) => derived.artifacts.push(artifact),
                Err(e) => derived.failures.push(format!("sentiment: {}", e)),
            },
            Err(e) => derived.failures.push(format!("sentiment: {}", e)),
        }

        derived
    }
}

/// Runs the analytics calls for a text
pub struct AnalyticsExtractor {
    analytics: Arc<dyn TextAnalytics>,
    language: String,
}

impl AnalyticsExtractor {
    pub fn new(analytics: Arc<dyn TextAnalytics>, language: impl Into<String>) -> Self {
        Self {
            analytics,
            language: language.into(),
        }
    }

    /// Run entity, sentiment and key-phrase detection concurrently
    pub async fn analyze(&self, text: &str) -> AnalysisFindings {
        let language = self.language.as_str();
        let (entities, sentiment, key_phrases) = tokio::join!(
            self.analytics.detect_entities(text, language),
            self.analytics.detect_sentiment(text, language),
            self.analytics.detect_key_phrases(text, language),
        );

        AnalysisFindings {
            entities,
            sentiment,
            key_phrases,
        }
    }
}

/// Build the `Id,Score,Text` table for `athena-data/key-phrases/<key-stem>.csv`
///
/// Rows keep the service's order; the header is written even with no rows.
pub fn key_phrase_artifact(
    source_key: &str,
    phrases: &[KeyPhrase],
) -> Result<DerivedArtifact, PipelineError> {
    let id = key_without_extension(source_key);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(KEY_PHRASE_HEADER)
        .map_err(|e| PipelineError::Serialize(e.to_string()))?;

    for phrase in phrases {
        let row = KeyPhraseRow {
            id: id.to_string(),
            score: phrase.score,
            text: phrase.text.clone(),
        };
        writer
            .serialize(&row)
            .map_err(|e| PipelineError::Serialize(e.to_string()))?;
    }

    let content = writer
        .into_inner()
        .map_err(|e| PipelineError::Serialize(e.to_string()))?;

    Ok(DerivedArtifact::new(
        Destination::new(KEY_PHRASES, format!("{}.csv", id)),
        content,
        ContentKind::Csv,
    ))
}

/// Build the flat sentiment record for `athena-data/sentiment/<source-key>`
pub fn sentiment_artifact(
    source_key: &str,
    sentiment: &Sentiment,
) -> Result<DerivedArtifact, PipelineError> {
    let record = SentimentRecord::new(key_without_extension(source_key), sentiment);
    let content =
        serde_json::to_vec(&record).map_err(|e| PipelineError::Serialize(e.to_string()))?;

    Ok(DerivedArtifact::new(
        Destination::new(SENTIMENT, source_key),
        content,
        ContentKind::Json,
    ))
}
