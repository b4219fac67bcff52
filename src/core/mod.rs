//! Core pipeline logic.
//!
//! This module contains:
//! - Poller: Job submission and bounded polling
//! - Fetcher: Result document retrieval
//! - Transcript: Transcript document → normalized + raw artifacts
//! - Analytics: Text analytics fan-out → key-phrase table + sentiment record
//! - Writer: Isolated per-artifact writes
//! - Handler: Audio and text invocation handlers

pub mod analytics;
pub mod error;
pub mod fetcher;
pub mod handler;
pub mod poller;
pub mod transcript;
pub mod writer;

// Re-export commonly used types
pub use analytics::{AnalysisFindings, AnalyticsExtractor, DerivedFindings};
pub use error::PipelineError;
pub use fetcher::ResultFetcher;
pub use handler::{AudioHandler, InvocationOutcome, TextHandler};
pub use poller::{JobPoller, PollPolicy};
pub use transcript::TranscriptArtifacts;
pub use writer::{ArtifactWriter, WriteOutcome, WriteReport};
