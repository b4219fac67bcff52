//! Pipeline error kinds.
//!
//! Everything except `JobFailed` and `Write` is fatal for the invocation and
//! propagates to the trigger boundary. `JobFailed` is logged by the audio
//! handler; `Write` is contained inside the artifact writer.

use std::time::Duration;

use thiserror::Error;

use crate::adapters::{ServiceError, StoreError};
use crate::domain::{Destination, JobName};

/// Errors that can occur while running the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read source object {container}/{key}: {source}")]
    Store {
        container: String,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to submit transcription job {job_name}: {source}")]
    Submission {
        job_name: JobName,
        #[source]
        source: ServiceError,
    },

    #[error("Failed to read status of job {job_name}: {source}")]
    Poll {
        job_name: JobName,
        #[source]
        source: ServiceError,
    },

    #[error("Job {job_name} did not finish after {attempts} polls")]
    PollTimeout { job_name: JobName, attempts: u32 },

    #[error("Job {job_name} failed: {}", .reason.as_deref().unwrap_or("no reason given"))]
    JobFailed {
        job_name: JobName,
        reason: Option<String>,
    },

    #[error("Failed to fetch result {reference}: {reason}")]
    Fetch { reference: String, reason: String },

    #[error("Unexpected document shape: {0}")]
    Shape(String),

    #[error("Analytics failed: {}", .failures.join("; "))]
    Analysis { failures: Vec<String> },

    #[error("Failed to write {destination}: {source}")]
    Write {
        destination: Destination,
        #[source]
        source: StoreError,
    },

    #[error("Failed to serialize artifact: {0}")]
    Serialize(String),

    #[error("Invocation timed out after {0:?}")]
    InvocationTimeout(Duration),
}

impl PipelineError {
    /// Whether the invocation should fail with this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::JobFailed { .. } | Self::Write { .. })
    }
}
