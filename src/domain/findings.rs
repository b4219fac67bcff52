//! Text-analytics findings and the flat records derived from them.
//!
//! Scores are carried exactly as the analytics service reports them; nothing
//! here re-normalizes or re-sorts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named entity detected in the text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub text: String,

    #[serde(rename = "type")]
    pub entity_type: String,

    pub score: f64,

    #[serde(default)]
    pub begin_offset: Option<u32>,

    #[serde(default)]
    pub end_offset: Option<u32>,
}

/// Overall sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
            Self::Mixed => "MIXED",
        };
        f.write_str(label)
    }
}

/// Per-label confidence scores (not guaranteed to sum to 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub mixed: f64,
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

/// Result of sentiment detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub scores: SentimentScore,
}

/// A key phrase with its confidence score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPhrase {
    pub text: String,
    pub score: f64,
}

/// One row of the key-phrase table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPhraseRow {
    #[serde(rename = "Id")]
    pub id: String,

    #[serde(rename = "Score")]
    pub score: f64,

    #[serde(rename = "Text")]
    pub text: String,
}

/// Flat sentiment record written for a source object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    #[serde(rename = "Id")]
    pub id: String,

    #[serde(rename = "Sentiment")]
    pub sentiment: SentimentLabel,

    #[serde(rename = "MixedScore")]
    pub mixed_score: f64,

    #[serde(rename = "NegativeScore")]
    pub negative_score: f64,

    #[serde(rename = "NeutralScore")]
    pub neutral_score: f64,

    #[serde(rename = "PositiveScore")]
    pub positive_score: f64,
}

impl SentimentRecord {
    pub fn new(id: impl Into<String>, sentiment: &Sentiment) -> Self {
        Self {
            id: id.into(),
            sentiment: sentiment.label,
            mixed_score: sentiment.scores.mixed,
            negative_score: sentiment.scores.negative,
            neutral_score: sentiment.scores.neutral,
            positive_score: sentiment.scores.positive,
        }
    }
}
