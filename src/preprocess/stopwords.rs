// Stopword filtering: the second preprocessing stage.
//
// Runs on normalizer output, so tokens are already lowercase and free of
// punctuation. Tokenization is plain whitespace splitting.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use stop_words::{get, LANGUAGE};

/// Languages the stopword and lemmatizer stages know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    French,
    German,
    Spanish,
    Italian,
    Portuguese,
    Dutch,
}

impl Language {
    /// ISO 639-1 tag, as used in configuration.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
            Language::German => "de",
            Language::Spanish => "es",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Dutch => "nl",
        }
    }

    fn stop_words_language(&self) -> LANGUAGE {
        match self {
            Language::English => LANGUAGE::English,
            Language::French => LANGUAGE::French,
            Language::German => LANGUAGE::German,
            Language::Spanish => LANGUAGE::Spanish,
            Language::Italian => LANGUAGE::Italian,
            Language::Portuguese => LANGUAGE::Portuguese,
            Language::Dutch => LANGUAGE::Dutch,
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "fr" | "french" => Ok(Language::French),
            "de" | "german" => Ok(Language::German),
            "es" | "spanish" => Ok(Language::Spanish),
            "it" | "italian" => Ok(Language::Italian),
            "pt" | "portuguese" => Ok(Language::Portuguese),
            "nl" | "dutch" => Ok(Language::Dutch),
            other => Err(format!(
                "unsupported language '{other}' (expected one of: en, fr, de, es, it, pt, nl)"
            )),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A loaded stopword set for one language.
#[derive(Debug, Clone)]
pub struct StopwordFilter {
    stopwords: HashSet<String>,
}

impl StopwordFilter {
    pub fn new(stopwords: HashSet<String>) -> Self {
        Self { stopwords }
    }

    /// Load the stopword list for `language` from the stop-words crate.
    pub fn for_language(language: Language) -> Self {
        let words: Vec<String> = get(language.stop_words_language());
        Self::new(words.into_iter().map(|w| w.to_lowercase()).collect())
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }

    pub fn filter(&self, text: &str) -> String {
        remove_stopwords(text, &self.stopwords)
    }
}

/// Drop every whitespace-separated token found in `stopwords`.
///
/// Matching is case-sensitive. Surviving tokens keep their relative order
/// and are rejoined with single spaces.
pub fn remove_stopwords(text: &str, stopwords: &HashSet<String>) -> String {
    text.split_whitespace()
        .filter(|token| !stopwords.contains(*token))
        .collect::<Vec<_>>()
        .join(" ")
}
