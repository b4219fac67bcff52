//! In-memory collaborators for tests and dry runs.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    AnalysisJob, Entity, JobName, JobStatusReport, KeyPhrase, Sentiment, SentimentLabel,
    SentimentScore,
};

use super::local_store::content_type_for_key;
use super::{ArtifactStore, ServiceError, SpeechJobService, StoreError, TextAnalytics};

#[derive(Debug, Clone)]
struct StoredObject {
    content: Vec<u8>,
    content_type: String,
}

/// Artifact store backed by a map
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    failing_containers: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object; content type is derived from the key
    pub async fn insert(&self, container: &str, key: &str, content: impl Into<Vec<u8>>) {
        self.objects.lock().await.insert(
            (container.to_string(), key.to_string()),
            StoredObject {
                content: content.into(),
                content_type: content_type_for_key(key).to_string(),
            },
        );
    }

    /// Make every write into `container` fail
    pub async fn fail_writes_to(&self, container: &str) {
        self.failing_containers
            .lock()
            .await
            .insert(container.to_string());
    }

    /// Read an object without going through the trait
    pub async fn object(&self, container: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .await
            .get(&(container.to_string(), key.to_string()))
            .map(|o| o.content.clone())
    }

    /// All `(container, key)` pairs currently stored, sorted
    pub async fn keys(&self) -> Vec<(String, String)> {
        let mut keys: Vec<_> = self.objects.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn content_type(&self, container: &str, key: &str) -> Result<String, StoreError> {
        self.objects
            .lock()
            .await
            .get(&(container.to_string(), key.to_string()))
            .map(|o| o.content_type.clone())
            .ok_or_else(|| StoreError::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            })
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.object(container, key)
            .await
            .ok_or_else(|| StoreError::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            })
    }

    async fn put(
        &self,
        container: &str,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        if self.failing_containers.lock().await.contains(container) {
            return Err(StoreError::Rejected {
                container: container.to_string(),
                reason: "writes disabled".to_string(),
            });
        }

        self.objects.lock().await.insert(
            (container.to_string(), key.to_string()),
            StoredObject {
                content,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}

/// Speech service that replays a scripted sequence of status reports
///
/// Once the script is exhausted the last report is repeated.
pub struct MockJobService {
    script: Mutex<VecDeque<JobStatusReport>>,
    last: Mutex<Option<JobStatusReport>>,
    submitted: Mutex<Vec<AnalysisJob>>,
    submission_error: Option<ServiceError>,
    polls: AtomicU32,
}

impl MockJobService {
    pub fn new(script: Vec<JobStatusReport>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
            submission_error: None,
            polls: AtomicU32::new(0),
        }
    }

    /// A service whose jobs never leave `InProgress`
    pub fn stuck() -> Self {
        Self::new(vec![JobStatusReport::in_progress()])
    }

    /// A service that refuses every submission
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            submission_error: Some(ServiceError::Rejected(reason.into())),
            ..Self::new(Vec::new())
        }
    }

    /// Number of status reads served
    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    /// Jobs submitted so far
    pub async fn submitted(&self) -> Vec<AnalysisJob> {
        self.submitted.lock().await.clone()
    }
}

#[async_trait]
impl SpeechJobService for MockJobService {
    async fn start_job(&self, job: &AnalysisJob) -> Result<(), ServiceError> {
        if let Some(err) = &self.submission_error {
            return Err(err.clone());
        }
        self.submitted.lock().await.push(job.clone());
        Ok(())
    }

    async fn job_status(&self, name: &JobName) -> Result<JobStatusReport, ServiceError> {
        let known = self
            .submitted
            .lock()
            .await
            .iter()
            .any(|job| &job.name == name);
        if !known {
            return Err(ServiceError::Rejected(format!("unknown job {}", name)));
        }

        self.polls.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().await.pop_front();
        let mut last = self.last.lock().await;
        match next {
            Some(report) => {
                *last = Some(report.clone());
                Ok(report)
            }
            None => last
                .clone()
                .ok_or_else(|| ServiceError::Decode("empty status script".to_string())),
        }
    }
}

/// Text analytics with canned responses
pub struct MockTextAnalytics {
    pub entities: Result<Vec<Entity>, ServiceError>,
    pub sentiment: Result<Sentiment, ServiceError>,
    pub key_phrases: Result<Vec<KeyPhrase>, ServiceError>,
    calls: AtomicU32,
}

impl Default for MockTextAnalytics {
    fn default() -> Self {
        Self::new(
            Vec::new(),
            Sentiment {
                label: SentimentLabel::Neutral,
                scores: SentimentScore {
                    mixed: 0.0,
                    negative: 0.0,
                    neutral: 1.0,
                    positive: 0.0,
                },
            },
            Vec::new(),
        )
    }
}

impl MockTextAnalytics {
    pub fn new(entities: Vec<Entity>, sentiment: Sentiment, key_phrases: Vec<KeyPhrase>) -> Self {
        Self {
            entities: Ok(entities),
            sentiment: Ok(sentiment),
            key_phrases: Ok(key_phrases),
            calls: AtomicU32::new(0),
        }
    }

    /// Total detect calls served
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextAnalytics for MockTextAnalytics {
    async fn detect_entities(
        &self,
        _text: &str,
        _language: &str,
    ) -> Result<Vec<Entity>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entities.clone()
    }

    async fn detect_sentiment(
        &self,
        _text: &str,
        _language: &str,
    ) -> Result<Sentiment, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sentiment.clone()
    }

    async fn detect_key_phrases(
        &self,
        _text: &str,
        _language: &str,
    ) -> Result<Vec<KeyPhrase>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.key_phrases.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JobStatus, ResultReference, SpeechOptions};

    #[test]
    fn test_store_names() {
        assert_eq!(MemoryStore::new().name(), "memory");
        assert_eq!(crate::adapters::LocalStore::new("/tmp").name(), "local");
    }

    #[tokio::test]
    async fn test_memory_store_failing_container() {
        let store = MemoryStore::new();
        store.fail_writes_to("transcripts").await;

        let err = store
            .put("transcripts", "a.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));

        store
            .put("raw-transcripts", "a.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();
        assert_eq!(
            store.keys().await,
            vec![("raw-transcripts".to_string(), "a.json".to_string())]
        );
    }

    #[tokio::test]
    async fn test_mock_job_service_repeats_last_report() {
        let service = MockJobService::new(vec![
            JobStatusReport::in_progress(),
            JobStatusReport::completed(ResultReference::Inline("{}".to_string())),
        ]);
        let job = AnalysisJob::new("https://media/a.mp3", SpeechOptions::default());
        service.start_job(&job).await.unwrap();

        assert_eq!(
            service.job_status(&job.name).await.unwrap().status,
            JobStatus::InProgress
        );
        assert_eq!(
            service.job_status(&job.name).await.unwrap().status,
            JobStatus::Completed
        );
        assert_eq!(
            service.job_status(&job.name).await.unwrap().status,
            JobStatus::Completed
        );
        assert_eq!(service.polls(), 3);
    }

    #[tokio::test]
    async fn test_mock_job_service_unknown_job() {
        let service = MockJobService::stuck();
        let err = service.job_status(&JobName::from("ghost")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Rejected(_)));
        assert_eq!(service.polls(), 0);
    }
}
