//! Best-effort, per-artifact persistence.
//!
//! Every artifact is written on its own. A failed write is logged and
//! recorded in the report; it never aborts sibling writes or the invocation.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info};

use crate::adapters::ArtifactStore;
use crate::domain::{DerivedArtifact, Destination};

use super::error::PipelineError;

/// Outcome of writing one artifact
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub destination: Destination,
    pub size_bytes: u64,
    /// Error message if the write failed
    pub error: Option<String>,
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes of a batch of writes, in the order the artifacts were given
#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub outcomes: Vec<WriteOutcome>,
}

impl WriteReport {
    pub fn written(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.written()
    }
}

/// Persists derived artifacts into an artifact store
pub struct ArtifactWriter {
    store: Arc<dyn ArtifactStore>,
}

impl ArtifactWriter {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    /// Write a single artifact
    pub async fn write(&self, artifact: &DerivedArtifact) -> Result<(), PipelineError> {
        let destination = &artifact.destination;
        self.store
            .put(
                &destination.container,
                &destination.key,
                artifact.content.clone(),
                artifact.kind.mime_type(),
            )
            .await
            .map_err(|source| PipelineError::Write {
                destination: destination.clone(),
                source,
            })
    }

    /// Write every artifact concurrently, isolating failures
    pub async fn write_all(&self, artifacts: &[DerivedArtifact]) -> WriteReport {
        let writes = artifacts.iter().map(|artifact| async move {
            let result = self.write(artifact).await;
            let outcome = WriteOutcome {
                destination: artifact.destination.clone(),
                size_bytes: artifact.size_bytes(),
                error: result.as_ref().err().map(|e| e.to_string()),
            };

            match result {
                Ok(()) => info!(
                    store = self.store.name(),
                    destination = %outcome.destination,
                    bytes = outcome.size_bytes,
                    "Artifact written"
                ),
                Err(e) => error!(
                    store = self.store.name(),
                    destination = %outcome.destination,
                    error = %e,
                    "Artifact write failed"
                ),
            }

            outcome
        });

        WriteReport {
            outcomes: join_all(writes).await,
        }
    }
}
