//! Adapter interfaces for external systems.
//!
//! The pipeline talks to three collaborators: an artifact store, a speech
//! job service and a text-analytics service. Each sits behind a trait so the
//! core logic can run against the HTTP gateway, the local filesystem or the
//! in-memory doubles used in tests.

pub mod gateway;
pub mod local_store;
pub mod memory;

use std::sync::OnceLock;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AnalysisJob, Entity, JobName, JobStatusReport, KeyPhrase, Sentiment};

pub use gateway::HttpGateway;
pub use local_store::LocalStore;
pub use memory::{MemoryStore, MockJobService, MockTextAnalytics};

/// Process-wide HTTP client, built on first use
static HTTP_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get the shared HTTP client handle
pub fn shared_http_client() -> reqwest::Client {
    HTTP_CLIENT.get_or_init(reqwest::Client::new).clone()
}

/// Errors raised by an artifact store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Object not found: {container}/{key}")]
    NotFound { container: String, key: String },

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Store rejected write to {container}: {reason}")]
    Rejected { container: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the speech or analytics service
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed service response: {0}")]
    Decode(String),

    #[error("Service rejected the request: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Byte storage addressed by container and key
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Human-readable store name
    fn name(&self) -> &str;

    /// Content type recorded for an object
    async fn content_type(&self, container: &str, key: &str) -> Result<String, StoreError>;

    /// Read an object's bytes
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Create or replace an object
    async fn put(
        &self,
        container: &str,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;
}

/// Long-running transcription jobs
#[async_trait]
pub trait SpeechJobService: Send + Sync {
    /// Submit a job under its (already generated) name
    async fn start_job(&self, job: &AnalysisJob) -> Result<(), ServiceError>;

    /// Read the current status of a job
    async fn job_status(&self, name: &JobName) -> Result<JobStatusReport, ServiceError>;
}

/// Synchronous text-analytics calls
#[async_trait]
pub trait TextAnalytics: Send + Sync {
    async fn detect_entities(&self, text: &str, language: &str)
        -> Result<Vec<Entity>, ServiceError>;

    async fn detect_sentiment(&self, text: &str, language: &str) -> Result<Sentiment, ServiceError>;

    async fn detect_key_phrases(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Vec<KeyPhrase>, ServiceError>;
}
