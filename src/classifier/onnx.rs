// Local ONNX sentiment classifier.
//
// Runs a HuggingFace sequence-classification model exported to ONNX
// (default: distilbert-base-uncased-finetuned-sst-2-english) entirely on the
// local CPU. The label names come from the model's own config.json, so any
// binary or ternary sentiment model with positive/negative(/neutral) labels
// can be dropped in.
//
// Output: one logit per label; softmax gives the confidence of the top label.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::debug;

use super::download::{MODEL_CONFIG_FILE, MODEL_FILE, TOKENIZER_FILE};
use super::traits::{Label, SentimentClassifier, SentimentResult};
use crate::error::{Result, SentimentError};

/// Longest token sequence the transformer accepts (including special tokens).
const MAX_SEQUENCE_LEN: usize = 512;

/// The slice of a HuggingFace config.json we need.
#[derive(Debug, Deserialize)]
struct ModelConfig {
    id2label: HashMap<String, String>,
}

/// Local ONNX-based sentiment classifier. Session and tokenizer sit behind
/// Arc so inference can move onto spawn_blocking; the session also needs a
/// Mutex because `Session::run` takes `&mut self`.
pub struct OnnxSentimentClassifier {
    name: String,
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    labels: Arc<Vec<Label>>,
    pad_id: i64,
}

impl OnnxSentimentClassifier {
    /// Load the model, tokenizer and label map from `model_dir`.
    ///
    /// Any missing file or unreadable artifact is a `ModelLoad` error: the
    /// classifier can't serve anything without all three.
    pub fn load(model_dir: &Path, name: &str) -> Result<Self> {
        Self::load_inner(model_dir, name).map_err(|e| SentimentError::model_load(format!("{e:#}")))
    }

    fn load_inner(model_dir: &Path, name: &str) -> anyhow::Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);
        let config_path = model_dir.join(MODEL_CONFIG_FILE);

        for path in [&model_path, &tokenizer_path, &config_path] {
            if !path.exists() {
                anyhow::bail!(
                    "Model file not found: {}\nRun `moodgraph download-model` to download it.",
                    path.display()
                );
            }
        }

        let labels = read_labels(&config_path)?;

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0) as i64;

        debug!(
            labels = ?labels,
            "Loaded ONNX sentiment model from {}",
            model_dir.display()
        );

        Ok(Self {
            name: name.to_string(),
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            labels: Arc::new(labels),
            pad_id,
        })
    }
}

/// Read `id2label` from config.json into index order.
fn read_labels(config_path: &Path) -> anyhow::Result<Vec<Label>> {
    let raw = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config: ModelConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;
    labels_from_id2label(&config.id2label)
}

fn labels_from_id2label(id2label: &HashMap<String, String>) -> anyhow::Result<Vec<Label>> {
    let mut indexed: Vec<(usize, Label)> = id2label
        .iter()
        .map(|(id, name)| -> anyhow::Result<(usize, Label)> {
            let index: usize = id
                .parse()
                .with_context(|| format!("id2label key '{id}' is not an index"))?;
            let label = name.parse::<Label>().map_err(|e| anyhow::anyhow!(e))?;
            Ok((index, label))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if indexed.len() < 2 {
        anyhow::bail!("Model config must define at least two labels, found {}", indexed.len());
    }

    indexed.sort_by_key(|(index, _)| *index);
    if indexed.iter().enumerate().any(|(i, (index, _))| i != *index) {
        anyhow::bail!("id2label indices must be contiguous from 0");
    }

    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}

#[async_trait]
impl SentimentClassifier for OnnxSentimentClassifier {
    fn model_name(&self) -> &str {
        &self.name
    }

    async fn classify(&self, text: &str) -> Result<SentimentResult> {
        let mut results = self.classify_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| SentimentError::inference("model returned no result"))
    }

    /// Batch inference: tokenize all texts, run one forward pass, softmax
    /// each row and keep the top label.
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<SentimentResult>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let labels = Arc::clone(&self.labels);
        let pad_id = self.pad_id;
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            classify_sync(&session, &tokenizer, &labels, pad_id, &texts)
        })
        .await
        .map_err(|e| SentimentError::inference(format!("spawn_blocking panicked: {e}")))?
        .map_err(|e| SentimentError::inference(format!("{e:#}")))
    }
}

/// Synchronous tokenization + inference, run on a blocking thread.
fn classify_sync(
    session: &Mutex<Session>,
    tokenizer: &Tokenizer,
    labels: &[Label],
    pad_id: i64,
    texts: &[String],
) -> anyhow::Result<Vec<SentimentResult>> {
    let encodings: Vec<_> = texts
        .iter()
        .map(|t| {
            tokenizer
                .encode(t.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let sequences: Vec<(Vec<i64>, Vec<i64>)> = encodings
        .iter()
        .map(|enc| {
            truncate_sequence(
                enc.get_ids().iter().map(|&id| id as i64).collect(),
                enc.get_attention_mask().iter().map(|&m| m as i64).collect(),
            )
        })
        .collect();

    let batch_size = sequences.len();
    let max_len = sequences.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0);

    // Right-pad every sequence to max_len. Shape: [batch_size, max_len]
    let mut input_ids_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);
    let mut attention_mask_flat: Vec<i64> = Vec::with_capacity(batch_size * max_len);

    for (ids, mask) in &sequences {
        let pad_len = max_len - ids.len();
        input_ids_flat.extend_from_slice(ids);
        attention_mask_flat.extend_from_slice(mask);
        input_ids_flat.extend(std::iter::repeat_n(pad_id, pad_len));
        attention_mask_flat.extend(std::iter::repeat_n(0i64, pad_len));
    }

    let shape = [batch_size as i64, max_len as i64];

    let input_ids_tensor = Tensor::from_array((shape, input_ids_flat))
        .context("Failed to create input_ids tensor")?;
    let attention_mask_tensor = Tensor::from_array((shape, attention_mask_flat))
        .context("Failed to create attention_mask tensor")?;

    let logits = {
        let mut session = session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

        let outputs = session
            .run(ort::inputs! {
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor
            })
            .context("ONNX inference failed")?;

        // Output shape: [batch_size, num_labels]
        let (_out_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Failed to extract output tensor")?;

        data.to_vec()
    };

    if logits.len() != batch_size * labels.len() {
        anyhow::bail!(
            "Model returned {} logits for {} texts and {} labels",
            logits.len(),
            batch_size,
            labels.len()
        );
    }

    let mut results = Vec::with_capacity(batch_size);
    for (i, text) in texts.iter().enumerate() {
        let row = &logits[i * labels.len()..(i + 1) * labels.len()];
        let result = top_label(row, labels);

        debug!(
            label = %result.label,
            score = result.score,
            text_preview = %crate::output::truncate_chars(text, 50),
            "ONNX classified text"
        );

        results.push(result);
    }

    Ok(results)
}

/// Cap a sequence at MAX_SEQUENCE_LEN, keeping its final special token.
fn truncate_sequence(mut ids: Vec<i64>, mut mask: Vec<i64>) -> (Vec<i64>, Vec<i64>) {
    if ids.len() > MAX_SEQUENCE_LEN {
        let last_id = ids[ids.len() - 1];
        let last_mask = mask[mask.len() - 1];
        ids.truncate(MAX_SEQUENCE_LEN - 1);
        mask.truncate(MAX_SEQUENCE_LEN - 1);
        ids.push(last_id);
        mask.push(last_mask);
    }
    (ids, mask)
}

/// Numerically stable softmax.
fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&l| (l as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Pick the highest-probability label from one row of logits.
fn top_label(row: &[f32], labels: &[Label]) -> SentimentResult {
    let probs = softmax(row);
    let (best, prob) = probs
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |acc, (i, p)| if p > acc.1 { (i, p) } else { acc });
    SentimentResult::new(labels[best], prob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-10);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_equal_logits() {
        let probs = softmax(&[0.0, 0.0]);
        assert!((probs[0] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_softmax_large_logits_do_not_overflow() {
        let probs = softmax(&[1000.0, 0.0]);
        assert!((probs[0] - 1.0).abs() < 1e-10);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_top_label_picks_max_and_rounds() {
        let labels = [Label::Negative, Label::Positive];
        let result = top_label(&[-2.0, 2.0], &labels);
        assert_eq!(result.label, Label::Positive);
        // softmax([-2, 2])[1] = 1 / (1 + e^-4) ≈ 0.98201
        assert!((result.score - 0.982).abs() < 1e-9);
    }

    #[test]
    fn test_labels_from_sst2_config() {
        let id2label: HashMap<String, String> = [
            ("0".to_string(), "NEGATIVE".to_string()),
            ("1".to_string(), "POSITIVE".to_string()),
        ]
        .into_iter()
        .collect();
        let labels = labels_from_id2label(&id2label).unwrap();
        assert_eq!(labels, vec![Label::Negative, Label::Positive]);
    }

    #[test]
    fn test_labels_reject_unknown_names() {
        let id2label: HashMap<String, String> = [
            ("0".to_string(), "LABEL_0".to_string()),
            ("1".to_string(), "LABEL_1".to_string()),
        ]
        .into_iter()
        .collect();
        assert!(labels_from_id2label(&id2label).is_err());
    }

    #[test]
    fn test_labels_reject_gaps() {
        let id2label: HashMap<String, String> = [
            ("0".to_string(), "negative".to_string()),
            ("2".to_string(), "positive".to_string()),
        ]
        .into_iter()
        .collect();
        assert!(labels_from_id2label(&id2label).is_err());
    }

    #[test]
    fn test_truncate_keeps_final_token() {
        let ids: Vec<i64> = (0..600).collect();
        let mask = vec![1; 600];
        let (ids, mask) = truncate_sequence(ids, mask);
        assert_eq!(ids.len(), MAX_SEQUENCE_LEN);
        assert_eq!(mask.len(), MAX_SEQUENCE_LEN);
        assert_eq!(*ids.last().unwrap(), 599);
    }

    #[test]
    fn test_load_missing_dir_is_model_load_error() {
        let dir = std::env::temp_dir().join("moodgraph-test-nonexistent-model");
        let err = OnnxSentimentClassifier::load(&dir, "test-model").err().unwrap();
        assert!(matches!(err, SentimentError::ModelLoad(_)));
    }
}
