use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::classifier::download::{default_model_dir, model_files_present, DEFAULT_MODEL};
use crate::preprocess::{CleaningConfig, Language};

/// Which sentiment classifier backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierBackend {
    /// Local ONNX transformer model (default)
    Onnx,
    /// Word-list classifier, no model files needed
    Lexicon,
}

/// Central configuration loaded from environment variables.
///
/// The API key comes from the environment only (never hardcoded). The .env
/// file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which classifier to use (default: Onnx)
    pub classifier_backend: ClassifierBackend,
    /// HuggingFace model id, used for download and reported by /health
    pub model: String,
    /// Directory containing model.onnx, tokenizer.json and config.json
    pub model_dir: PathBuf,
    /// Language tag passed to the stopword filter and lemmatizer
    pub language: Language,
    /// Optional JSON lemma lookup table ({"form": "lemma"})
    pub lemma_table: Option<PathBuf>,
    pub cleaning: CleaningConfig,
    /// Max characters accepted per text by the HTTP API
    pub max_text_length: usize,
    /// Node texts per classifier call during graph analysis
    pub batch_size: usize,
    /// Node batches classified at once during graph analysis
    pub concurrency: usize,
    /// Shared key expected in the X-API-Key header (MOODGRAPH_API_KEY)
    #[cfg(feature = "web")]
    pub api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier_backend: ClassifierBackend::Onnx,
            model: DEFAULT_MODEL.to_string(),
            model_dir: default_model_dir(DEFAULT_MODEL),
            language: Language::English,
            lemma_table: None,
            cleaning: CleaningConfig::default(),
            max_text_length: 1000,
            batch_size: 16,
            concurrency: 4,
            #[cfg(feature = "web")]
            api_key: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the API key, which only `serve` needs.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let classifier_backend = match env::var("MOODGRAPH_CLASSIFIER").as_deref() {
            Ok("lexicon") => ClassifierBackend::Lexicon,
            Ok("onnx") | Err(_) => ClassifierBackend::Onnx,
            Ok(other) => anyhow::bail!(
                "Unknown MOODGRAPH_CLASSIFIER '{other}'. Expected 'onnx' or 'lexicon'."
            ),
        };

        let model = env::var("MOODGRAPH_MODEL").unwrap_or(defaults.model);
        let model_dir = env::var("MOODGRAPH_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_model_dir(&model));

        let language = match env::var("MOODGRAPH_LANGUAGE") {
            Ok(tag) => tag
                .parse::<Language>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("Invalid MOODGRAPH_LANGUAGE")?,
            Err(_) => defaults.language,
        };

        let cleaning = CleaningConfig {
            remove_urls: env_bool("MOODGRAPH_REMOVE_URLS", defaults.cleaning.remove_urls)?,
            remove_mentions: env_bool("MOODGRAPH_REMOVE_MENTIONS", defaults.cleaning.remove_mentions)?,
            remove_hashtags: env_bool("MOODGRAPH_REMOVE_HASHTAGS", defaults.cleaning.remove_hashtags)?,
            remove_special_chars: env_bool(
                "MOODGRAPH_REMOVE_SPECIAL_CHARS",
                defaults.cleaning.remove_special_chars,
            )?,
            to_lowercase: env_bool("MOODGRAPH_LOWERCASE", defaults.cleaning.to_lowercase)?,
            remove_retweet_markers: env_bool(
                "MOODGRAPH_REMOVE_RETWEETS",
                defaults.cleaning.remove_retweet_markers,
            )?,
        };

        Ok(Self {
            classifier_backend,
            model,
            model_dir,
            language,
            lemma_table: env::var("MOODGRAPH_LEMMA_TABLE").ok().map(PathBuf::from),
            cleaning,
            max_text_length: env_usize("MOODGRAPH_MAX_TEXT_LENGTH", defaults.max_text_length)?,
            batch_size: env_usize("MOODGRAPH_BATCH_SIZE", defaults.batch_size)?.max(1),
            concurrency: env_usize("MOODGRAPH_CONCURRENCY", defaults.concurrency)?.max(1),
            #[cfg(feature = "web")]
            api_key: env::var("MOODGRAPH_API_KEY").unwrap_or_default(),
        })
    }

    /// Check that the API key is configured.
    /// Call this before starting the HTTP server.
    #[cfg(feature = "web")]
    pub fn require_api_key(&self) -> Result<()> {
        if self.api_key.is_empty() {
            anyhow::bail!(
                "MOODGRAPH_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }

    /// Validate that the chosen classifier backend has what it needs.
    /// For ONNX: model files must exist (or user should run download-model).
    pub fn require_classifier(&self) -> Result<()> {
        match self.classifier_backend {
            ClassifierBackend::Onnx => {
                if !model_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "ONNX model files not found in {}\n\
                         Run `moodgraph download-model` to download them.\n\
                         Or set MOODGRAPH_CLASSIFIER=lexicon to use the word-list classifier instead.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
            ClassifierBackend::Lexicon => Ok(()),
        }
    }
}

fn env_bool(key: &str, default: bool) -> Result<bool> {
    match env::var(key) {
        Ok(value) => parse_bool(&value).with_context(|| format!("Invalid {key}")),
        Err(_) => Ok(default),
    }
}

fn env_usize(key: &str, default: usize) -> Result<usize> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<usize>()
            .with_context(|| format!("Invalid {key}: expected a positive integer, got '{value}'")),
        Err(_) => Ok(default),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected true/false, got '{other}'"),
    }
}
