use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use moodgraph::config::Config;
use moodgraph::graph::{Edge, Node, SentimentAnalyzer};
use moodgraph::preprocess::Preprocessor;

/// moodgraph: sentiment analysis for text and graphs.
///
/// Cleans text (URLs, mentions, hashtags, stopwords, inflections), classifies
/// it with a local transformer model, and aggregates node sentiment into
/// edge and graph metrics.
#[derive(Parser)]
#[command(name = "moodgraph", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP inference API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Classify the sentiment of a single text
    Analyze {
        /// The text to analyze
        text: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a graph from a JSON file ({"nodes": [...], "edges": [...]})
    Graph {
        /// Path to the graph JSON file
        file: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what each preprocessing stage does to a text (no model needed)
    Preprocess {
        /// The text to preprocess
        text: String,

        /// Print the stages as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download the ONNX sentiment model (~260 MB)
    DownloadModel,

    /// Show configuration and model file status
    Status,
}

#[derive(serde::Deserialize)]
struct GraphFile {
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("moodgraph=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_api_key()?;
            config.require_classifier()?;

            let analyzer = std::sync::Arc::new(load_analyzer(&config)?);
            moodgraph::web::run_server(config, analyzer, port, &bind).await?;
        }

        Commands::Analyze { text, json } => {
            let config = Config::load()?;
            config.require_classifier()?;
            let analyzer = load_analyzer(&config)?;

            let result = analyzer.analyze_text(Some(&text)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                moodgraph::output::terminal::display_sentiment(&text, &result);
            }
        }

        Commands::Graph { file, json } => {
            let config = Config::load()?;
            config.require_classifier()?;

            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read graph file {}", file.display()))?;
            let graph: GraphFile = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid graph JSON in {}", file.display()))?;
            moodgraph::graph::validate_graph(&graph.nodes, config.max_text_length)?;

            let analyzer = load_analyzer(&config)?;
            let analysis = analyzer.analyze_graph(&graph.nodes, &graph.edges).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                moodgraph::output::terminal::display_graph_analysis(&analysis);
                let skipped = graph.edges.len() - analysis.edges.len();
                if skipped > 0 {
                    println!(
                        "  {}",
                        format!("{skipped} edge(s) skipped: endpoint not among the nodes").yellow()
                    );
                }
            }
        }

        Commands::Preprocess { text, json } => {
            let config = Config::load()?;
            let preprocessor = Preprocessor::load(
                config.cleaning,
                config.language,
                config.lemma_table.as_deref(),
            )?;

            let trace = preprocessor.trace(Some(&text));
            if json {
                println!("{}", serde_json::to_string_pretty(&trace)?);
            } else {
                moodgraph::output::terminal::display_trace(&text, &trace);
            }
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading ONNX sentiment model...");
            println!("  Destination: {}", model_dir.display());

            moodgraph::classifier::download::download_model(&config.model, model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `moodgraph analyze \"some text\"` or `moodgraph serve`.");
        }

        Commands::Status => {
            let config = Config::load()?;
            moodgraph::status::show(&config)?;
        }
    }

    Ok(())
}

/// Build the analyzer once; every command and request shares this instance.
fn load_analyzer(config: &Config) -> Result<SentimentAnalyzer> {
    info!(backend = ?config.classifier_backend, "Loading sentiment analyzer");
    let analyzer = SentimentAnalyzer::from_config(config)?;
    Ok(analyzer)
}
