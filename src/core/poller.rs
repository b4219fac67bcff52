//! Submit a transcription job and wait for it to finish.
//!
//! The first status read happens right after submission; subsequent reads are
//! spaced by a fixed interval. The wait is bounded by a maximum number of
//! reads, after which the job is abandoned with `PollTimeout` (the job itself
//! keeps running on the service side; there is no cancellation).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::adapters::SpeechJobService;
use crate::domain::{AnalysisJob, JobStatus, SpeechOptions, TerminalJob};

use super::error::PipelineError;

/// How a submitted job is polled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Delay between status reads in milliseconds (default: 5000)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Maximum number of status reads (default: 180, i.e. 15 minutes)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_interval_ms() -> u64 {
    5000
}
fn default_max_attempts() -> u32 {
    180
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl PollPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Number of status reads to perform; at least one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Longest time spent sleeping before giving up
    pub fn max_wait(&self) -> Duration {
        self.interval() * (self.attempts() - 1)
    }
}

/// Drives one transcription job to a terminal state
pub struct JobPoller {
    service: Arc<dyn SpeechJobService>,
    policy: PollPolicy,
}

impl JobPoller {
    pub fn new(service: Arc<dyn SpeechJobService>, policy: PollPolicy) -> Self {
        Self { service, policy }
    }

    /// Submit a job for `media_uri` and poll it until it completes
    ///
    /// Returns the completed job with its result reference. A job the service
    /// reports as `Failed` yields `PipelineError::JobFailed` and is never
    /// resubmitted.
    pub async fn submit_and_await(
        &self,
        media_uri: &str,
        options: SpeechOptions,
    ) -> Result<TerminalJob, PipelineError> {
        let mut job = AnalysisJob::new(media_uri, options);

        self.service
            .start_job(&job)
            .await
            .map_err(|source| PipelineError::Submission {
                job_name: job.name.clone(),
                source,
            })?;
        info!(
            job_name = %job.name,
            %media_uri,
            max_wait_secs = self.policy.max_wait().as_secs(),
            "Submitted transcription job"
        );

        let max_attempts = self.policy.attempts();

        for attempt in 1..=max_attempts {
            let report = self
                .service
                .job_status(&job.name)
                .await
                .map_err(|source| PipelineError::Poll {
                    job_name: job.name.clone(),
                    source,
                })?;
            job.observe(&report);

            if !report.status.is_terminal() {
                debug!(job_name = %job.name, attempt, status = ?report.status, "Job not finished");
                if attempt < max_attempts {
                    tokio::time::sleep(self.policy.interval()).await;
                }
                continue;
            }

            if report.status == JobStatus::Failed {
                // Logged by the caller
                return Err(PipelineError::JobFailed {
                    job_name: job.name,
                    reason: report.failure_reason,
                });
            }

            let result = report.result.ok_or_else(|| {
                PipelineError::Shape(format!(
                    "job {} completed without a result reference",
                    job.name
                ))
            })?;
            let elapsed = Utc::now() - job.submitted_at;
            info!(
                job_name = %job.name,
                attempt,
                elapsed_secs = elapsed.num_seconds(),
                "Transcription job completed"
            );
            return Ok(TerminalJob { job, result });
        }

        warn!(job_name = %job.name, attempts = max_attempts, "Gave up waiting for transcription job");
        Err(PipelineError::PollTimeout {
            job_name: job.name,
            attempts: max_attempts,
        })
    }
}
