// Sentiment classifier trait: the seam between the pipeline and the model.
//
// The default implementation runs a local ONNX transformer. A lexicon
// classifier is available for setups without model files. The analyzer only
// ever sees `Arc<dyn SentimentClassifier>`, so tests inject their own.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Categorical sentiment class. Serialized lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Negative,
    Neutral,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "positive",
            Label::Negative => "negative",
            Label::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    /// Parse a model's label name. Case-insensitive, accepts common abbreviations.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "pos" => Ok(Label::Positive),
            "negative" | "neg" => Ok(Label::Negative),
            "neutral" | "neu" => Ok(Label::Neutral),
            other => Err(format!("unknown sentiment label '{other}'")),
        }
    }
}

/// The classifier's verdict for one text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: Label,
    /// Confidence of the winning label, in [0, 1], rounded to 4 decimals
    pub score: f64,
}

impl SentimentResult {
    /// Build a result, clamping the score into [0, 1] and rounding it.
    pub fn new(label: Label, score: f64) -> Self {
        Self {
            label,
            score: round_score(score.clamp(0.0, 1.0)),
        }
    }
}

/// Round a score to 4 decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

/// Trait for classifying preprocessed text. Implementations are loaded once
/// and must be safe to share across concurrent requests.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Identifier reported by the health endpoint.
    fn model_name(&self) -> &str;

    /// Classify a single (already preprocessed) text.
    async fn classify(&self, text: &str) -> Result<SentimentResult>;

    /// Classify several texts, returning results in the same order.
    /// Default implementation calls classify sequentially.
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<SentimentResult>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.classify(text).await?);
        }
        Ok(results)
    }
}
