// Colored terminal output for sentiment results, graph analyses and
// preprocessing traces. The main.rs command handlers delegate here.

use colored::{ColoredString, Colorize};

use crate::classifier::{Label, SentimentResult};
use crate::graph::GraphAnalysis;
use crate::preprocess::PreprocessTrace;

use super::truncate_chars;

/// Display the verdict for a single text.
pub fn display_sentiment(text: &str, result: &SentimentResult) {
    println!("\n{}", "=== Sentiment ===".bold());
    println!("  Text:  {}", truncate_chars(text, 80).dimmed());
    println!(
        "  Label: {}  (score {:.4})",
        colorize_label(result.label),
        result.score
    );
}

/// Display per-node and per-edge results followed by the graph metrics.
pub fn display_graph_analysis(analysis: &GraphAnalysis) {
    println!(
        "\n{}",
        format!(
            "=== Graph Sentiment ({} nodes, {} edges) ===",
            analysis.nodes.len(),
            analysis.edges.len()
        )
        .bold()
    );

    if !analysis.nodes.is_empty() {
        println!();
        println!(
            "  {:<24} {:<10} {:>7}",
            "Node".dimmed(),
            "Label".dimmed(),
            "Score".dimmed()
        );
        println!("  {}", "-".repeat(43).dimmed());
        for node in &analysis.nodes {
            println!(
                "  {:<24} {:<10} {:>7.4}",
                truncate_chars(&node.node_id, 24),
                colorize_label(node.sentiment.label),
                node.sentiment.score
            );
        }
    }

    if !analysis.edges.is_empty() {
        println!();
        println!(
            "  {:<24} {:<24} {:<10} {:>7}",
            "Edge".dimmed(),
            "Connects".dimmed(),
            "Label".dimmed(),
            "Score".dimmed()
        );
        println!("  {}", "-".repeat(68).dimmed());
        for edge in &analysis.edges {
            println!(
                "  {:<24} {:<24} {:<10} {:>7.4}",
                truncate_chars(&edge.edge_id, 24),
                truncate_chars(&edge.connected_nodes.join(" -> "), 24),
                colorize_label(edge.sentiment.label),
                edge.sentiment.score
            );
        }
    }

    let metrics = &analysis.metrics;
    let dist = &metrics.sentiment_distribution;
    println!();
    println!(
        "  Average node sentiment: {:.4}",
        metrics.average_node_sentiment
    );
    println!(
        "  Average edge sentiment: {:.4}",
        metrics.average_edge_sentiment
    );
    println!(
        "  Nodes: {} positive, {} negative, {} neutral",
        dist.positive_nodes.to_string().green(),
        dist.negative_nodes.to_string().red(),
        dist.neutral_nodes.to_string().yellow()
    );
    println!(
        "  Edges: {} positive, {} negative",
        dist.positive_edges.to_string().green(),
        dist.negative_edges.to_string().red()
    );
}

/// Show each preprocessing stage for a text.
pub fn display_trace(text: &str, trace: &PreprocessTrace) {
    println!("\n{}", "=== Preprocessing ===".bold());
    println!("  {:<18} {}", "Input:".dimmed(), text);
    println!("  {:<18} {}", "Normalized:".dimmed(), trace.normalized);
    println!("  {:<18} {}", "Stopwords removed:".dimmed(), trace.without_stopwords);
    println!("  {:<18} {}", "Lemmatized:".dimmed(), trace.lemmatized.bold());
}

fn colorize_label(label: Label) -> ColoredString {
    match label {
        Label::Positive => label.as_str().green().bold(),
        Label::Negative => label.as_str().red().bold(),
        Label::Neutral => label.as_str().yellow(),
    }
}
