//! Filesystem-backed artifact store.
//!
//! Objects live at `<root>/<container>/<key>`. Containers may contain `/`
//! (e.g. `athena-data/key-phrases`), which simply nests directories.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{ArtifactStore, StoreError};

/// Artifact store rooted at a local directory
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve container and key to a path under the root
    fn object_path(&self, container: &str, key: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.root.clone();
        for part in [container, key] {
            let relative = Path::new(part);
            let is_plain = !part.is_empty()
                && relative
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)));
            if !is_plain {
                return Err(StoreError::InvalidKey(format!("{}/{}", container, key)));
            }
            path.push(relative);
        }
        Ok(path)
    }
}

/// Content type for a key, from its extension
pub fn content_type_for_key(key: &str) -> &'static str {
    let extension = Path::new(key)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("mp4") | Some("m4a") => "audio/mp4",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl ArtifactStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn content_type(&self, container: &str, key: &str) -> Result<String, StoreError> {
        let path = self.object_path(container, key)?;
        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            });
        }
        Ok(content_type_for_key(key).to_string())
    }

    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(container, key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn put(
        &self,
        container: &str,
        key: &str,
        content: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StoreError> {
        let path = self.object_path(container, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;
        Ok(())
    }
}
