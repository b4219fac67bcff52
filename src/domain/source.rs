//! Source objects that trigger a pipeline run.

use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The stored object a run was triggered for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceObject {
    pub container: String,

    /// Object key, used as given. Keys taken from a storage event are not
    /// URL-decoded, so `my+call.mp3` stays `my+call.mp3`.
    pub key: String,
}

impl SourceObject {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }

    /// URI the speech service reads the media from
    pub fn media_uri(&self, base: &str) -> String {
        format!("{}/{}/{}", base.trim_end_matches('/'), self.container, self.key)
    }
}

impl fmt::Display for SourceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// Storage notification document (`Records[].s3.bucket.name` / `.object.key`)
#[derive(Debug, Clone, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageEventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageEventRecord {
    pub s3: StorageEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageEntity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEntity {
    pub key: String,
}

impl StorageEvent {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse storage event")
    }

    /// The object named by the first record; `None` when the event is empty
    pub fn source(&self) -> Option<SourceObject> {
        self.records
            .first()
            .map(|r| SourceObject::new(r.s3.bucket.name.clone(), r.s3.object.key.clone()))
    }
}
