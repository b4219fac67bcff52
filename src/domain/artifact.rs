//! Artifacts derived from a transcript or from analytics findings.
//!
//! Each artifact carries its own destination and is written independently of
//! its siblings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Container for transcript documents exactly as the speech service returned them
pub const RAW_TRANSCRIPTS: &str = "raw-transcripts";

/// Container for normalized `{JobName, Text}` records
pub const TRANSCRIPTS: &str = "transcripts";

/// Container for key-phrase tables
pub const KEY_PHRASES: &str = "athena-data/key-phrases";

/// Container for sentiment records
pub const SENTIMENT: &str = "athena-data/sentiment";

/// A storage location: container plus key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    pub container: String,
    pub key: String,
}

impl Destination {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// Serialization format of an artifact's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Compact JSON record
    Json,

    /// Comma-separated table with a header row
    Csv,

    /// Untouched service payload
    Raw,
}

impl ContentKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Json | Self::Raw => "application/json",
            Self::Csv => "text/csv",
        }
    }
}

/// An artifact ready to be handed to the writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedArtifact {
    pub destination: Destination,

    pub content: Vec<u8>,

    pub kind: ContentKind,
}

impl DerivedArtifact {
    pub fn new(destination: Destination, content: Vec<u8>, kind: ContentKind) -> Self {
        Self {
            destination,
            content,
            kind,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Strip the final extension from an object key, keeping any prefix
///
/// `convos/call42.json` becomes `convos/call42`; a dot inside a prefix
/// segment is not treated as an extension.
pub fn key_without_extension(key: &str) -> &str {
    let name_start = key.rfind('/').map(|i| i + 1).unwrap_or(0);
    match key[name_start..].rfind('.') {
        Some(0) | None => key,
        Some(dot) => &key[..name_start + dot],
    }
}
