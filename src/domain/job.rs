//! Transcription jobs submitted to the speech service.
//!
//! A job is created at submission time, mutated only by status reads while it
//! is polled, and is terminal once it reaches `Completed` or `Failed`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique name of a transcription job (fresh UUID per invocation)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(String);

impl JobName {
    /// Generate a fresh, collision-free job name
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for JobName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a transcription job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Accepted by the service, not yet picked up
    #[serde(alias = "QUEUED")]
    Submitted,

    /// Being transcribed
    InProgress,

    /// Finished; a result reference is available
    Completed,

    /// Finished without a usable result
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Where a completed job's transcript can be read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultReference {
    /// Transcript document behind a URI
    Uri(String),

    /// Transcript document returned with the status itself
    Inline(String),
}

/// Options sent along with a transcription job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechOptions {
    /// BCP-47 language code, e.g. `en-US`
    pub language_code: String,

    /// Media container format, e.g. `mp3`
    pub media_format: String,

    pub speaker_labels_enabled: bool,

    pub max_speakers: u32,

    /// Custom vocabulary registered with the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_name: Option<String>,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            media_format: "mp3".to_string(),
            speaker_labels_enabled: true,
            max_speakers: 2,
            vocabulary_name: Some("Vocab".to_string()),
        }
    }
}

/// One status read of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusReport {
    pub status: JobStatus,

    /// Present once the job completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultReference>,

    /// Service-supplied reason, if the job failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl JobStatusReport {
    pub fn in_progress() -> Self {
        Self {
            status: JobStatus::InProgress,
            result: None,
            failure_reason: None,
        }
    }

    pub fn completed(result: ResultReference) -> Self {
        Self {
            status: JobStatus::Completed,
            result: Some(result),
            failure_reason: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            result: None,
            failure_reason: Some(reason.into()),
        }
    }
}

/// A transcription job owned by a single invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub name: JobName,

    /// URI of the media to transcribe
    pub media_uri: String,

    pub options: SpeechOptions,

    pub status: JobStatus,

    pub submitted_at: DateTime<Utc>,

    /// Number of status reads performed so far
    pub polls: u32,
}

impl AnalysisJob {
    /// Create a freshly-submitted job with a generated name
    pub fn new(media_uri: impl Into<String>, options: SpeechOptions) -> Self {
        Self {
            name: JobName::generate(),
            media_uri: media_uri.into(),
            options,
            status: JobStatus::Submitted,
            submitted_at: Utc::now(),
            polls: 0,
        }
    }

    /// Apply a status read to the job
    pub fn observe(&mut self, report: &JobStatusReport) {
        self.polls += 1;
        self.status = report.status;
    }
}

/// A job that reached `Completed`, with the reference to its result
#[derive(Debug, Clone)]
pub struct TerminalJob {
    pub job: AnalysisJob,
    pub result: ResultReference,
}
