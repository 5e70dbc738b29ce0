// System status display: classifier backend, model files, preprocessing settings.

use anyhow::Result;
use std::path::Path;

use crate::classifier::download::{MODEL_CONFIG_FILE, MODEL_FILE, TOKENIZER_FILE};
use crate::config::{ClassifierBackend, Config};

/// Display system status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    match config.classifier_backend {
        ClassifierBackend::Onnx => {
            println!("Classifier: onnx ({})", config.model);
            println!("Model directory: {}", config.model_dir.display());
            let mut missing = false;
            for file in [MODEL_FILE, TOKENIZER_FILE, MODEL_CONFIG_FILE] {
                let path = config.model_dir.join(file);
                match std::fs::metadata(&path) {
                    Ok(meta) => println!("  {file}: {}", format_bytes(meta.len())),
                    Err(_) => {
                        println!("  {file}: missing");
                        missing = true;
                    }
                }
            }
            if missing {
                println!("  Run `moodgraph download-model` to fetch the model files");
            }
        }
        ClassifierBackend::Lexicon => {
            println!("Classifier: lexicon (no model files needed)");
        }
    }

    println!("Language: {}", config.language);
    match config.lemma_table.as_deref() {
        Some(path) => println!("Lemma table: {}", describe_file(path)),
        None => println!("Lemma table: built-in rules only"),
    }

    let c = &config.cleaning;
    println!(
        "Cleaning: urls={} mentions={} hashtags={} special_chars={} lowercase={} retweets={}",
        c.remove_urls,
        c.remove_mentions,
        c.remove_hashtags,
        c.remove_special_chars,
        c.to_lowercase,
        c.remove_retweet_markers
    );
    println!(
        "Limits: {} chars per text, batches of {} x {} concurrent",
        config.max_text_length, config.batch_size, config.concurrency
    );

    #[cfg(feature = "web")]
    {
        if config.api_key.is_empty() {
            println!("API key: not set (required by `moodgraph serve`)");
        } else {
            println!("API key: set");
        }
    }

    Ok(())
}

fn describe_file(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(meta) => format!("{} ({})", path.display(), format_bytes(meta.len())),
        Err(_) => format!("{} (not found)", path.display()),
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(265 * 1024 * 1024), "265.0 MB");
    }
}
