//! Turn a transcript document into its derived artifacts.
//!
//! Two artifacts come out of one document: the normalized `{JobName, Text}`
//! record for `transcripts/<job>.json`, and the document itself, byte for
//! byte, for `raw-transcripts/<job>.json`.

use serde::Deserialize;

use crate::domain::artifact::{RAW_TRANSCRIPTS, TRANSCRIPTS};
use crate::domain::{
    ContentKind, DerivedArtifact, Destination, JobName, NormalizedTranscript, TranscriptResult,
};

use super::error::PipelineError;

/// The parts of the speech service's transcript document we read
#[derive(Debug, Deserialize)]
struct TranscriptDocument {
    #[serde(rename = "jobName", default)]
    job_name: Option<String>,
    #[serde(default)]
    results: Option<TranscriptResults>,
}

#[derive(Debug, Deserialize)]
struct TranscriptResults {
    #[serde(default)]
    transcripts: Option<Vec<TranscriptAlternative>>,
}

#[derive(Debug, Deserialize)]
struct TranscriptAlternative {
    #[serde(default)]
    transcript: Option<String>,
}

/// Artifacts derived from one transcript document
#[derive(Debug, Clone)]
pub struct TranscriptArtifacts {
    pub result: TranscriptResult,
    pub normalized: DerivedArtifact,
    pub raw: DerivedArtifact,
}

impl TranscriptArtifacts {
    /// Normalized record first, then the raw document
    pub fn into_vec(self) -> Vec<DerivedArtifact> {
        vec![self.normalized, self.raw]
    }
}

/// Extract the normalized record from a transcript document
///
/// The text is the first alternative under `results.transcripts`. The job
/// name comes from the document's `jobName`, falling back to `job_name`.
pub fn extract(raw: &str, job_name: &JobName) -> Result<TranscriptResult, PipelineError> {
    let document: TranscriptDocument = serde_json::from_str(raw)
        .map_err(|e| PipelineError::Shape(format!("transcript is not a JSON object: {}", e)))?;

    let results = document
        .results
        .ok_or_else(|| PipelineError::Shape("transcript has no `results`".to_string()))?;
    let transcripts = results.transcripts.ok_or_else(|| {
        PipelineError::Shape("transcript has no `results.transcripts`".to_string())
    })?;
    let text = transcripts
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::Shape("`results.transcripts` is empty".to_string()))?
        .transcript
        .ok_or_else(|| {
            PipelineError::Shape("`results.transcripts[0]` has no `transcript`".to_string())
        })?;

    Ok(TranscriptResult {
        raw: raw.to_string(),
        normalized: NormalizedTranscript {
            job_name: document
                .job_name
                .unwrap_or_else(|| job_name.as_str().to_string()),
            text,
        },
    })
}

/// Derive the normalized and raw artifacts for a job's transcript document
pub fn transform(raw: &str, job_name: &JobName) -> Result<TranscriptArtifacts, PipelineError> {
    let result = extract(raw, job_name)?;
    let key = format!("{}.json", job_name);

    let normalized_bytes = serde_json::to_vec(&result.normalized)
        .map_err(|e| PipelineError::Serialize(e.to_string()))?;

    let normalized = DerivedArtifact::new(
        Destination::new(TRANSCRIPTS, key.clone()),
        normalized_bytes,
        ContentKind::Json,
    );
    let raw = DerivedArtifact::new(
        Destination::new(RAW_TRANSCRIPTS, key),
        result.raw.clone().into_bytes(),
        ContentKind::Raw,
    );

    Ok(TranscriptArtifacts {
        result,
        normalized,
        raw,
    })
}
