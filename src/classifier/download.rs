// Model download helper for the ONNX sentiment classifier.
//
// Downloads three files for the configured HuggingFace model id:
//   onnx/model.onnx  → model.onnx      (the exported network, ~260MB for DistilBERT)
//   tokenizer.json   → tokenizer.json
//   config.json      → config.json     (id2label mapping)
//
// Files are stored in a platform-appropriate directory
// (~/.local/share/moodgraph/models/<model>/ on Linux) so they persist across runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Default sentiment model: binary SST-2 DistilBERT.
pub const DEFAULT_MODEL: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";

const HF_BASE_URL: &str = "https://huggingface.co";

/// Local file names inside the model directory.
pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const MODEL_CONFIG_FILE: &str = "config.json";

/// (remote path in the HF repo, local file name, show progress bar)
const MODEL_FILES: [(&str, &str, bool); 3] = [
    ("config.json", MODEL_CONFIG_FILE, false),
    ("tokenizer.json", TOKENIZER_FILE, false),
    ("onnx/model.onnx", MODEL_FILE, true),
];

/// Returns the default directory for a model's files.
/// Uses the platform data directory: ~/.local/share/moodgraph/models/<model>/ on Linux.
pub fn default_model_dir(model: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("moodgraph")
        .join("models")
        .join(model_dir_name(model))
}

/// Turn a HF model id ("org/name") into a single path component.
fn model_dir_name(model: &str) -> String {
    model.replace(['/', '\\', ':'], "--")
}

/// Check whether all required model files exist.
pub fn model_files_present(dir: &Path) -> bool {
    [MODEL_FILE, TOKENIZER_FILE, MODEL_CONFIG_FILE]
        .iter()
        .all(|f| dir.join(f).exists())
}

/// Download the model files for `model` into `dir`.
///
/// Shows a progress bar for the network file. Skips files that already exist.
pub async fn download_model(model: &str, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    println!("\nSentiment model ({model}):");

    for (remote, local, show_progress) in MODEL_FILES {
        let dest = dir.join(local);
        if dest.exists() {
            info!(file = local, "Model file already exists, skipping");
            println!("  {local} (already exists)");
            continue;
        }

        println!("  Downloading {remote}...");
        download_file(&format!("{HF_BASE_URL}/{model}/resolve/main/{remote}"), &dest, show_progress)
            .await?;
    }

    Ok(())
}

/// Download a single file from a URL to a local path.
/// If `show_progress` is true, display a progress bar.
async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let pb = if show_progress {
        let pb = match response.content_length() {
            Some(size) => {
                let pb = ProgressBar::new(size);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                        .context("Invalid progress bar template")?
                        .progress_chars("=> "),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("    {spinner} {bytes}")
                        .context("Invalid progress spinner template")?,
                );
                pb
            }
        };
        Some(pb)
    } else {
        None
    };

    // Stream chunks into memory so the bar advances, then write once; a
    // partially downloaded file never lands in the model directory.
    let mut bytes = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    while let Some(chunk) = response
        .chunk()
        .await
        .context("Failed to read response body")?
    {
        bytes.extend_from_slice(&chunk);
        if let Some(ref pb) = pb {
            pb.set_position(bytes.len() as u64);
        }
    }

    std::fs::write(dest, &bytes).with_context(|| format!("Failed to write {}", dest.display()))?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!("Downloaded {} to {}", url, dest.display());
    Ok(())
}
