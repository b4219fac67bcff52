//! Retrieve the transcript document of a completed job.
//!
//! A fetch failure is fatal: the job already succeeded upstream, so there is
//! nothing to retry here.

use reqwest::Url;
use tracing::{debug, instrument};

use crate::adapters::shared_http_client;
use crate::domain::ResultReference;

use super::error::PipelineError;

/// Reads result documents by URI (http, https, file) or inline
pub struct ResultFetcher {
    client: reqwest::Client,
}

impl Default for ResultFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFetcher {
    /// Create a fetcher using the shared HTTP client
    pub fn new() -> Self {
        Self::with_client(shared_http_client())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch the document as UTF-8 text
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, reference: &ResultReference) -> Result<String, PipelineError> {
        match reference {
            ResultReference::Inline(text) => Ok(text.clone()),
            ResultReference::Uri(uri) => {
                let bytes = self.fetch_uri(uri).await?;
                debug!(%uri, bytes = bytes.len(), "Fetched result document");
                String::from_utf8(bytes).map_err(|e| PipelineError::Fetch {
                    reference: uri.clone(),
                    reason: format!("result is not valid UTF-8: {}", e),
                })
            }
        }
    }

    async fn fetch_uri(&self, uri: &str) -> Result<Vec<u8>, PipelineError> {
        let fetch_error = |reason: String| PipelineError::Fetch {
            reference: uri.to_string(),
            reason,
        };

        let url = Url::parse(uri).map_err(|e| fetch_error(format!("invalid URI: {}", e)))?;

        match url.scheme() {
            "http" | "https" => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| fetch_error(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(fetch_error(format!("server returned {}", status)));
                }

                let body = response
                    .bytes()
                    .await
                    .map_err(|e| fetch_error(e.to_string()))?;
                Ok(body.to_vec())
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| fetch_error("not a local file path".to_string()))?;
                tokio::fs::read(&path)
                    .await
                    .map_err(|e| fetch_error(e.to_string()))
            }
            other => Err(fetch_error(format!("unsupported scheme '{}'", other))),
        }
    }
}
