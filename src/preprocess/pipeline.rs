// Preprocessing pipeline: normalize → remove stopwords → lemmatize.
//
// This is the single entry point used before classification. Each stage
// degrades to pass-through on its own, so a bad input never aborts the chain.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::lemmatizer::Lemmatizer;
use super::normalizer::{normalize, CleaningConfig};
use super::stopwords::{Language, StopwordFilter};
use crate::error::Result;

/// The three stages plus their configuration. Built once at startup and
/// shared (read-only) by every request.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    cleaning: CleaningConfig,
    stopwords: StopwordFilter,
    lemmatizer: Lemmatizer,
}

/// Intermediate output of every stage, for inspection and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreprocessTrace {
    pub normalized: String,
    pub without_stopwords: String,
    pub lemmatized: String,
}

impl Preprocessor {
    pub fn new(cleaning: CleaningConfig, stopwords: StopwordFilter, lemmatizer: Lemmatizer) -> Self {
        Self {
            cleaning,
            stopwords,
            lemmatizer,
        }
    }

    /// Build the standard pipeline for `language`, loading the lemma table if given.
    pub fn load(
        cleaning: CleaningConfig,
        language: Language,
        lemma_table: Option<&Path>,
    ) -> Result<Self> {
        Ok(Self::new(
            cleaning,
            StopwordFilter::for_language(language),
            Lemmatizer::load(language, lemma_table)?,
        ))
    }

    pub fn cleaning(&self) -> &CleaningConfig {
        &self.cleaning
    }

    pub fn language(&self) -> Language {
        self.lemmatizer.language()
    }

    /// Run all three stages. Absent input yields an empty string.
    pub fn preprocess(&self, text: Option<&str>) -> String {
        let normalized = normalize(text, &self.cleaning);
        let filtered = self.stopwords.filter(&normalized);
        self.lemmatizer.lemmatize(&filtered)
    }

    /// Preprocess an untyped JSON value. Anything but a string counts as empty.
    pub fn preprocess_value(&self, value: &Value) -> String {
        self.preprocess(value.as_str())
    }

    /// Like `preprocess`, but keep every intermediate stage.
    pub fn trace(&self, text: Option<&str>) -> PreprocessTrace {
        let normalized = normalize(text, &self.cleaning);
        let without_stopwords = self.stopwords.filter(&normalized);
        let lemmatized = self.lemmatizer.lemmatize(&without_stopwords);
        PreprocessTrace {
            normalized,
            without_stopwords,
            lemmatized,
        }
    }
}
