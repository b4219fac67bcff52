//! Invocation handlers: one per source kind.
//!
//! Each handler is invoked with the stored object that triggered it, reads
//! the object's content type (returned as the invocation status), runs its
//! path and writes the derived artifacts. Fatal errors propagate to the
//! caller; artifact write failures are contained in the returned report.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::adapters::{ArtifactStore, SpeechJobService, TextAnalytics};
use crate::config::PipelineSettings;
use crate::domain::{JobName, SourceObject};

use super::analytics::AnalyticsExtractor;
use super::error::PipelineError;
use super::fetcher::ResultFetcher;
use super::poller::JobPoller;
use super::transcript;
use super::writer::{ArtifactWriter, WriteReport};

/// What an invocation did
#[derive(Debug, Clone)]
pub struct InvocationOutcome {
    /// Content type of the source object
    pub status: String,

    /// Transcription job, for audio invocations
    pub job_name: Option<JobName>,

    /// Whether the transcription job failed on the service side
    pub job_failed: bool,

    /// Outcome of every artifact write
    pub report: WriteReport,
}

/// Read a source object's content type, mapping failures to `Store`
async fn source_content_type(
    store: &dyn ArtifactStore,
    source: &SourceObject,
) -> Result<String, PipelineError> {
    store
        .content_type(&source.container, &source.key)
        .await
        .map_err(|e| store_error(source, e))
}

fn store_error(source: &SourceObject, error: crate::adapters::StoreError) -> PipelineError {
    PipelineError::Store {
        container: source.container.clone(),
        key: source.key.clone(),
        source: error,
    }
}

/// Transcribes stored audio and writes the transcript artifacts
pub struct AudioHandler {
    store: Arc<dyn ArtifactStore>,
    poller: JobPoller,
    fetcher: ResultFetcher,
    writer: ArtifactWriter,
    settings: PipelineSettings,
}

impl AudioHandler {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        speech: Arc<dyn SpeechJobService>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            poller: JobPoller::new(speech, settings.poll.clone()),
            fetcher: ResultFetcher::new(),
            writer: ArtifactWriter::new(store.clone()),
            store,
            settings,
        }
    }

    /// Replace the result fetcher
    pub fn with_fetcher(mut self, fetcher: ResultFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    #[instrument(skip(self), fields(container = %source.container, key = %source.key))]
    pub async fn handle(&self, source: &SourceObject) -> Result<InvocationOutcome, PipelineError> {
        let limit = self.settings.invocation_timeout();
        tokio::time::timeout(limit, self.process(source))
            .await
            .map_err(|_| PipelineError::InvocationTimeout(limit))?
    }

    async fn process(&self, source: &SourceObject) -> Result<InvocationOutcome, PipelineError> {
        let status = source_content_type(self.store.as_ref(), source).await?;
        info!(content_type = %status, "Processing audio object");

        let media_uri = source.media_uri(&self.settings.media_uri_base);
        let terminal = match self
            .poller
            .submit_and_await(&media_uri, self.settings.speech.clone())
            .await
        {
            Ok(terminal) => terminal,
            Err(PipelineError::JobFailed { job_name, reason }) => {
                warn!(
                    %job_name,
                    reason = reason.as_deref().unwrap_or("unknown"),
                    "Transcription failed; no transcript artifacts produced"
                );
                return Ok(InvocationOutcome {
                    status,
                    job_name: Some(job_name),
                    job_failed: true,
                    report: WriteReport::default(),
                });
            }
            Err(e) => return Err(e),
        };

        let job_name = terminal.job.name;
        let raw = self.fetcher.fetch(&terminal.result).await?;
        let artifacts = transcript::transform(&raw, &job_name)?;
        info!(
            %job_name,
            transcript_job = %artifacts.result.normalized.job_name,
            text_chars = artifacts.result.normalized.text.chars().count(),
            "Transcript extracted"
        );

        let report = self.writer.write_all(&artifacts.into_vec()).await;
        info!(
            %job_name,
            written = report.written(),
            failed = report.failed(),
            "Audio object processed"
        );

        Ok(InvocationOutcome {
            status,
            job_name: Some(job_name),
            job_failed: false,
            report,
        })
    }
}

/// The field of a normalized transcript the text path reads
#[derive(Debug, Deserialize)]
struct TextDocument {
    #[serde(rename = "Text")]
    text: String,
}

/// Runs text analytics over a normalized transcript and writes the results
pub struct TextHandler {
    store: Arc<dyn ArtifactStore>,
    extractor: AnalyticsExtractor,
    writer: ArtifactWriter,
    settings: PipelineSettings,
}

impl TextHandler {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        analytics: Arc<dyn TextAnalytics>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            extractor: AnalyticsExtractor::new(analytics, settings.text_language.clone()),
            writer: ArtifactWriter::new(store.clone()),
            store,
            settings,
        }
    }

    #[instrument(skip(self), fields(container = %source.container, key = %source.key))]
    pub async fn handle(&self, source: &SourceObject) -> Result<InvocationOutcome, PipelineError> {
        let limit = self.settings.invocation_timeout();
        tokio::time::timeout(limit, self.process(source))
            .await
            .map_err(|_| PipelineError::InvocationTimeout(limit))?
    }

    async fn process(&self, source: &SourceObject) -> Result<InvocationOutcome, PipelineError> {
        let status = source_content_type(self.store.as_ref(), source).await?;
        info!(content_type = %status, "Processing transcript object");

        let bytes = self
            .store
            .get(&source.container, &source.key)
            .await
            .map_err(|e| store_error(source, e))?;

        let document: TextDocument = serde_json::from_slice(&bytes).map_err(|e| {
            PipelineError::Shape(format!("{} has no readable `Text` field: {}", source, e))
        })?;

        let findings = self.extractor.analyze(&document.text).await;
        let derived = findings.derive(&source.key);

        let report = self.writer.write_all(&derived.artifacts).await;
        info!(
            written = report.written(),
            failed = report.failed(),
            "Transcript object analyzed"
        );

        if !derived.failures.is_empty() {
            return Err(PipelineError::Analysis {
                failures: derived.failures,
            });
        }

        Ok(InvocationOutcome {
            status,
            job_name: None,
            job_failed: false,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MemoryStore, MockJobService, MockTextAnalytics};
    use crate::core::PollPolicy;

    fn settings() -> PipelineSettings {
        PipelineSettings {
            poll: PollPolicy {
                interval_ms: 1,
                max_attempts: 5,
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_source_object() {
        let store = Arc::new(MemoryStore::new());
        let speech = Arc::new(MockJobService::stuck());
        let handler = AudioHandler::new(store, speech.clone(), settings());

        let err = handler
            .handle(&SourceObject::new("call-audio", "missing.mp3"))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Store { .. }));
        assert!(speech.submitted().await.is_empty());
    }

    #[tokio::test]
    async fn test_media_uri_sent_to_service() {
        let store = Arc::new(MemoryStore::new());
        store.insert("call-audio", "call42.mp3", vec![1u8, 2, 3]).await;
        let speech = Arc::new(MockJobService::stuck());
        let handler = AudioHandler::new(store, speech.clone(), settings());

        let err = handler
            .handle(&SourceObject::new("call-audio", "call42.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::PollTimeout { attempts: 5, .. }));

        let submitted = speech.submitted().await;
        assert_eq!(submitted.len(), 1);
        assert_eq!(
            submitted[0].media_uri,
            "https://s3.us-east-2.amazonaws.com/call-audio/call42.mp3"
        );
        assert_eq!(submitted[0].options.vocabulary_name.as_deref(), Some("Vocab"));
    }

    #[tokio::test]
    async fn test_invocation_timeout() {
        let store = Arc::new(MemoryStore::new());
        store.insert("call-audio", "call42.mp3", vec![0u8]).await;
        let speech = Arc::new(MockJobService::stuck());
        let handler = AudioHandler::new(
            store,
            speech,
            PipelineSettings {
                poll: PollPolicy {
                    interval_ms: 5000,
                    max_attempts: 100,
                },
                invocation_timeout_seconds: 0,
                ..Default::default()
            },
        );

        let err = handler
            .handle(&SourceObject::new("call-audio", "call42.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvocationTimeout(_)));
    }

    #[tokio::test]
    async fn test_text_without_text_field_is_shape_error() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert("transcripts", "abc.json", r#"{"JobName":"abc"}"#)
            .await;
        let analytics = Arc::new(MockTextAnalytics::default());
        let handler = TextHandler::new(store.clone(), analytics.clone(), settings());

        let err = handler
            .handle(&SourceObject::new("transcripts", "abc.json"))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Shape(_)));
        assert_eq!(analytics.calls(), 0);
        assert_eq!(store.keys().await.len(), 1);
    }
}
