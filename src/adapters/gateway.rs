//! JSON-over-HTTP client for the analysis gateway.
//!
//! The gateway fronts both the speech service (asynchronous transcription
//! jobs) and the text-analytics service (synchronous detect calls):
//!
//! | Call | Method | Path |
//! |------|--------|------|
//! | start job | POST | `/transcription-jobs` |
//! | job status | GET | `/transcription-jobs/{name}` |
//! | entities | POST | `/entities` |
//! | sentiment | POST | `/sentiment` |
//! | key phrases | POST | `/key-phrases` |

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    AnalysisJob, Entity, JobName, JobStatus, JobStatusReport, KeyPhrase, ResultReference,
    Sentiment, SentimentLabel, SentimentScore,
};

use super::{shared_http_client, ServiceError, SpeechJobService, TextAnalytics};

/// HTTP client for the analysis gateway
pub struct HttpGateway {
    /// Base URL, without trailing slash
    base_url: String,
    /// Shared HTTP client
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartJobRequest<'a> {
    job_name: &'a str,
    media_uri: &'a str,
    language_code: &'a str,
    media_format: &'a str,
    settings: JobSettings<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobSettings<'a> {
    show_speaker_labels: bool,
    max_speaker_labels: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    vocabulary_name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatusResponse {
    status: JobStatus,
    #[serde(default)]
    transcript_uri: Option<String>,
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    failure_reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectRequest<'a> {
    text: &'a str,
    language_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct EntitiesResponse {
    entities: Vec<Entity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentResponse {
    sentiment: SentimentLabel,
    sentiment_score: SentimentScore,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyPhrasesResponse {
    key_phrases: Vec<KeyPhrase>,
}

impl HttpGateway {
    /// Create a gateway client using the shared HTTP client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, shared_http_client())
    }

    /// Create a gateway client with an explicit HTTP client
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    /// Build API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn post_detect<T: DeserializeOwned>(
        &self,
        path: &str,
        text: &str,
        language: &str,
    ) -> Result<T, ServiceError> {
        let url = self.api_url(path);
        debug!(%url, bytes = text.len(), "Calling analytics");

        let response = self
            .client
            .post(&url)
            .json(&DetectRequest {
                text,
                language_code: language,
            })
            .send()
            .await?;

        Self::read_json(response).await
    }
}

impl From<JobStatusResponse> for JobStatusReport {
    fn from(response: JobStatusResponse) -> Self {
        let result = match (response.transcript_uri, response.transcript) {
            (Some(uri), _) => Some(ResultReference::Uri(uri)),
            (None, Some(inline)) => Some(ResultReference::Inline(inline)),
            (None, None) => None,
        };

        Self {
            status: response.status,
            result,
            failure_reason: response.failure_reason,
        }
    }
}

#[async_trait]
impl SpeechJobService for HttpGateway {
    async fn start_job(&self, job: &AnalysisJob) -> Result<(), ServiceError> {
        let url = self.api_url("transcription-jobs");
        let request = StartJobRequest {
            job_name: job.name.as_str(),
            media_uri: &job.media_uri,
            language_code: &job.options.language_code,
            media_format: &job.options.media_format,
            settings: JobSettings {
                show_speaker_labels: job.options.speaker_labels_enabled,
                max_speaker_labels: job.options.max_speakers,
                vocabulary_name: job.options.vocabulary_name.as_deref(),
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        Ok(())
    }

    async fn job_status(&self, name: &JobName) -> Result<JobStatusReport, ServiceError> {
        let url = self.api_url(&format!("transcription-jobs/{}", name));
        let response = self.client.get(&url).send().await?;
        let status: JobStatusResponse = Self::read_json(response).await?;
        Ok(status.into())
    }
}

#[async_trait]
impl TextAnalytics for HttpGateway {
    async fn detect_entities(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Vec<Entity>, ServiceError> {
        let response: EntitiesResponse = self.post_detect("entities", text, language).await?;
        Ok(response.entities)
    }

    async fn detect_sentiment(&self, text: &str, language: &str) -> Result<Sentiment, ServiceError> {
        let response: SentimentResponse = self.post_detect("sentiment", text, language).await?;
        Ok(Sentiment {
            label: response.sentiment,
            scores: response.sentiment_score,
        })
    }

    async fn detect_key_phrases(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Vec<KeyPhrase>, ServiceError> {
        let response: KeyPhrasesResponse = self.post_detect("key-phrases", text, language).await?;
        Ok(response.key_phrases)
    }
}
