//! Domain types for the callflow pipeline.
//!
//! This module contains the core data structures:
//! - Job: Transcription jobs and their lifecycle
//! - Transcript: Raw transcript documents and normalized records
//! - Findings: Text-analytics results and the records derived from them
//! - Artifact: Derived artifacts and their destinations
//! - Source: The stored object a run was triggered for

pub mod artifact;
pub mod findings;
pub mod job;
pub mod source;
pub mod transcript;

// Re-export commonly used types
pub use artifact::{key_without_extension, ContentKind, DerivedArtifact, Destination};
pub use findings::{
    Entity, KeyPhrase, KeyPhraseRow, Sentiment, SentimentLabel, SentimentRecord, SentimentScore,
};
pub use job::{
    AnalysisJob, JobName, JobStatus, JobStatusReport, ResultReference, SpeechOptions, TerminalJob,
};
pub use source::{SourceObject, StorageEvent};
pub use transcript::{NormalizedTranscript, TranscriptResult};
