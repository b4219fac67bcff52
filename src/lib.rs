//! callflow - Transcription and text-analytics pipeline for stored calls
//!
//! Reacts to a newly stored audio or transcript object and fans the results
//! out to several storage locations in query-friendly shapes.
//!
//! # Paths
//!
//! - **Audio**: submit a transcription job, poll it to completion, fetch the
//!   transcript document, then write the raw document to `raw-transcripts/`
//!   and a normalized `{JobName, Text}` record to `transcripts/`.
//! - **Text**: read a normalized transcript, run entity, sentiment and
//!   key-phrase detection, then write a key-phrase table to
//!   `athena-data/key-phrases/` and a sentiment record to
//!   `athena-data/sentiment/`.
//!
//! # Modules
//!
//! - `adapters`: External collaborators (artifact store, speech and analytics services)
//! - `core`: Pipeline logic (JobPoller, ResultFetcher, transforms, ArtifactWriter, handlers)
//! - `domain`: Data structures (AnalysisJob, transcripts, findings, DerivedArtifact)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Transcribe an audio object
//! callflow audio call-audio call42.mp3
//!
//! # Analyze a normalized transcript
//! callflow text transcripts 2b1f0c9e.json
//!
//! # Replay a storage event
//! callflow event event.json --path text
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::core::{AudioHandler, InvocationOutcome, PipelineError, TextHandler};
pub use crate::domain::{DerivedArtifact, Destination, JobName, SourceObject};
