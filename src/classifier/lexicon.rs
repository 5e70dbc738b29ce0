// Lexicon-based sentiment classifier.
//
// Counts polarity words in already-preprocessed (lowercased, lemmatized)
// text. No model files, no inference runtime. Useful for deployments that
// can't ship the ONNX model and as a deterministic backend in tests.
//
// Scoring: with p positive and n negative hits, the winner's confidence is
// (max(p, n) + 1) / (p + n + 2). A tie, including no hits at all, is neutral
// with confidence 1 / (1 + p + n).

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use super::traits::{Label, SentimentClassifier, SentimentResult};
use crate::error::Result;

/// Lemma forms, so "loved", "loving" and "loves" all hit "love".
const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "love", "like", "enjoy", "amazing", "wonderful", "happy",
    "fantastic", "awesome", "beautiful", "nice", "perfect", "brilliant", "delight",
    "delightful", "glad", "win", "success", "successful", "recommend", "please", "fun",
    "exciting", "impressive", "superb", "thank", "thanks", "helpful", "positive", "best",
    "favorite", "charming", "stunning", "outstanding", "inspiring", "caring", "loving",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "horrible", "sad", "angry", "disappoint",
    "disappointing", "poor", "fail", "failure", "ugly", "wrong", "broken", "problem",
    "annoy", "annoying", "pain", "painful", "lose", "boring", "bore", "worse", "worst",
    "disgusting", "frustrate", "frustrating", "useless", "negative", "never", "sorry",
    "upset", "scary", "dislike", "waste",
];

pub const LEXICON_MODEL_NAME: &str = "lexicon";

pub struct LexiconClassifier {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new(
            POSITIVE_WORDS.iter().map(|w| w.to_string()),
            NEGATIVE_WORDS.iter().map(|w| w.to_string()),
        )
    }
}

impl LexiconClassifier {
    pub fn new(
        positive: impl IntoIterator<Item = String>,
        negative: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            positive: positive.into_iter().collect(),
            negative: negative.into_iter().collect(),
        }
    }

    /// Score text synchronously. Tokens are whitespace-separated.
    pub fn score(&self, text: &str) -> SentimentResult {
        let (mut pos, mut neg) = (0u32, 0u32);
        for token in text.split_whitespace() {
            if self.positive.contains(token) {
                pos += 1;
            } else if self.negative.contains(token) {
                neg += 1;
            }
        }

        let total = (pos + neg) as f64;
        let result = if pos == neg {
            SentimentResult::new(Label::Neutral, 1.0 / (1.0 + total))
        } else {
            let label = if pos > neg { Label::Positive } else { Label::Negative };
            SentimentResult::new(label, (pos.max(neg) as f64 + 1.0) / (total + 2.0))
        };

        debug!(positive_hits = pos, negative_hits = neg, label = %result.label, "Lexicon scored text");
        result
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    fn model_name(&self) -> &str {
        LEXICON_MODEL_NAME
    }

    async fn classify(&self, text: &str) -> Result<SentimentResult> {
        Ok(self.score(text))
    }
}
