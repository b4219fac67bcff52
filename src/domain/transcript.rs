//! Transcript documents and their normalized form.

use serde::{Deserialize, Serialize};

/// Minimal record extracted from a transcript document, queried downstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTranscript {
    #[serde(rename = "JobName")]
    pub job_name: String,

    #[serde(rename = "Text")]
    pub text: String,
}

/// A fetched transcript document together with its normalized record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptResult {
    /// Document exactly as returned by the speech service
    pub raw: String,

    pub normalized: NormalizedTranscript,
}
