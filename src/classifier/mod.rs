// Sentiment classification: trait-based abstraction for swappable backends.
//
// The SentimentClassifier trait defines the interface. OnnxSentimentClassifier
// runs a local transformer model; LexiconClassifier needs no model files.

pub mod download;
pub mod lexicon;
pub mod onnx;
pub mod traits;

pub use lexicon::LexiconClassifier;
pub use onnx::OnnxSentimentClassifier;
pub use traits::{round_score, Label, SentimentClassifier, SentimentResult};

use std::sync::Arc;

use tracing::info;

use crate::config::{ClassifierBackend, Config};
use crate::error::Result;

/// Create a sentiment classifier based on the configured backend.
/// A missing or broken model is a `ModelLoad` error.
pub fn create_classifier(config: &Config) -> Result<Arc<dyn SentimentClassifier>> {
    match config.classifier_backend {
        ClassifierBackend::Onnx => {
            info!(model = %config.model, "Using local ONNX sentiment classifier");
            let classifier = OnnxSentimentClassifier::load(&config.model_dir, &config.model)?;
            Ok(Arc::new(classifier))
        }
        ClassifierBackend::Lexicon => {
            info!("Using lexicon sentiment classifier");
            Ok(Arc::new(LexiconClassifier::default()))
        }
    }
}
