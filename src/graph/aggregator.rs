// Graph sentiment aggregation.
//
// Node texts run through the full preprocessing pipeline and the classifier.
// Edge sentiment is the mean of its endpoint scores with a two-way threshold:
// positive iff the mean is above 0.5, otherwise negative. Edges never come out
// neutral even though nodes can.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::Value;
use tracing::{debug, info};

use super::models::{mean_score, Edge, EdgeResult, GraphAnalysis, Metadata, Node, NodeResult};
use crate::classifier::{create_classifier, Label, SentimentClassifier, SentimentResult};
use crate::config::Config;
use crate::error::{Result, SentimentError};
use crate::preprocess::Preprocessor;

/// Node id used by single-text analysis when the caller gives none.
pub const TEMP_NODE_ID: &str = "temp_node";

const DEFAULT_BATCH_SIZE: usize = 16;
const DEFAULT_CONCURRENCY: usize = 4;

/// Edge threshold: mean endpoint score strictly above this is positive.
const EDGE_POSITIVE_THRESHOLD: f64 = 0.5;

/// Runs the preprocessing pipeline and classifier over texts, nodes, edges
/// and whole graphs. Cheap to share: both halves sit behind `Arc`.
pub struct SentimentAnalyzer {
    preprocessor: Arc<Preprocessor>,
    classifier: Arc<dyn SentimentClassifier>,
    batch_size: usize,
    concurrency: usize,
}

impl SentimentAnalyzer {
    pub fn new(preprocessor: Arc<Preprocessor>, classifier: Arc<dyn SentimentClassifier>) -> Self {
        Self {
            preprocessor,
            classifier,
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set how many node texts go into one classifier call and how many of
    /// those calls may be in flight at once. Zero is treated as one.
    pub fn with_batching(mut self, batch_size: usize, concurrency: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self.concurrency = concurrency.max(1);
        self
    }

    /// Build the preprocessor and classifier described by `config`.
    ///
    /// Fails with `ModelLoad` if the classifier or lemma table can't be
    /// loaded; no analyzer exists in that case.
    pub fn from_config(config: &Config) -> Result<Self> {
        let preprocessor = Preprocessor::load(
            config.cleaning,
            config.language,
            config.lemma_table.as_deref(),
        )?;
        let classifier = create_classifier(config)?;
        info!(
            model = classifier.model_name(),
            language = %config.language,
            "Sentiment analyzer ready"
        );
        Ok(Self::new(Arc::new(preprocessor), classifier)
            .with_batching(config.batch_size, config.concurrency))
    }

    pub fn model_name(&self) -> &str {
        self.classifier.model_name()
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// Preprocess and classify one text. Absent text is classified as empty.
    pub async fn analyze_text(&self, text: Option<&str>) -> Result<SentimentResult> {
        let cleaned = self.preprocessor.preprocess(text);
        debug!(cleaned = %crate::output::truncate_chars(&cleaned, 50), "Classifying text");
        self.classifier.classify(&cleaned).await
    }

    pub async fn analyze_node(&self, node: &Node) -> Result<NodeResult> {
        let sentiment = self.analyze_text(Some(&node.text)).await?;
        Ok(NodeResult {
            node_id: node.id.clone(),
            sentiment,
            metadata: node.metadata.clone(),
        })
    }

    /// Classify each connected node afresh and aggregate their scores.
    pub async fn analyze_edge(&self, edge: &Edge, connected: &[&Node]) -> Result<EdgeResult> {
        let mut scores = Vec::with_capacity(connected.len());
        for node in connected {
            scores.push(self.analyze_text(Some(&node.text)).await?.score);
        }
        let ids = connected.iter().map(|n| n.id.clone()).collect();
        Ok(edge_result(edge, ids, scores))
    }

    /// Analyze every node, then every edge whose endpoints both resolve.
    ///
    /// Node texts are classified in batches with bounded concurrency; results
    /// keep input order. Edge sentiment reuses the node results of this pass
    /// rather than classifying endpoint texts again.
    pub async fn analyze_graph(&self, nodes: &[Node], edges: &[Edge]) -> Result<GraphAnalysis> {
        info!(nodes = nodes.len(), edges = edges.len(), "Analyzing graph");

        let texts: Vec<String> = nodes
            .iter()
            .map(|n| self.preprocessor.preprocess(Some(&n.text)))
            .collect();

        // Owned chunks keep the stream's futures Send for spawned callers
        let chunks: Vec<Vec<String>> = texts
            .chunks(self.batch_size)
            .map(<[String]>::to_vec)
            .collect();
        let batches: Vec<Vec<SentimentResult>> = stream::iter(chunks)
            .map(|chunk| {
                let classifier = Arc::clone(&self.classifier);
                async move { classifier.classify_batch(&chunk).await }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;
        let sentiments: Vec<SentimentResult> = batches.into_iter().flatten().collect();

        if sentiments.len() != nodes.len() {
            return Err(SentimentError::inference(format!(
                "classifier returned {} results for {} nodes",
                sentiments.len(),
                nodes.len()
            )));
        }

        let node_results: Vec<NodeResult> = nodes
            .iter()
            .zip(sentiments)
            .map(|(node, sentiment)| NodeResult {
                node_id: node.id.clone(),
                sentiment,
                metadata: node.metadata.clone(),
            })
            .collect();

        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let mut edge_results = Vec::with_capacity(edges.len());
        for edge in edges {
            let (Some(&s), Some(&t)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                debug!(
                    edge = %edge.id,
                    source = %edge.source,
                    target = %edge.target,
                    "Skipping edge with unresolved endpoint"
                );
                continue;
            };
            let ids = vec![nodes[s].id.clone(), nodes[t].id.clone()];
            let scores = vec![
                node_results[s].sentiment.score,
                node_results[t].sentiment.score,
            ];
            edge_results.push(edge_result(edge, ids, scores));
        }

        let analysis = GraphAnalysis::new(node_results, edge_results);
        info!(
            edges_analyzed = analysis.edges.len(),
            average_node_sentiment = analysis.metrics.average_node_sentiment,
            average_edge_sentiment = analysis.metrics.average_edge_sentiment,
            "Graph analysis complete"
        );
        Ok(analysis)
    }

    /// Analyze one text and wrap it as a one-node, zero-edge graph.
    ///
    /// The node carries `context` and an `inference_type` of
    /// `node_sentiment` (when `node_id` is given) or `text_sentiment`, merged
    /// over any caller metadata.
    pub async fn analyze_single(
        &self,
        text: &str,
        node_id: Option<&str>,
        context: Option<&str>,
        metadata: Option<Metadata>,
    ) -> Result<GraphAnalysis> {
        let inference_type = if node_id.is_some() {
            "node_sentiment"
        } else {
            "text_sentiment"
        };

        let mut metadata = metadata.unwrap_or_default();
        metadata.insert(
            "context".to_string(),
            context.map_or(Value::Null, |c| Value::String(c.to_string())),
        );
        metadata.insert(
            "inference_type".to_string(),
            Value::String(inference_type.to_string()),
        );

        let node = Node::new(node_id.unwrap_or(TEMP_NODE_ID), text).with_metadata(metadata);
        let result = self.analyze_node(&node).await?;
        Ok(GraphAnalysis::new(vec![result], Vec::new()))
    }
}

fn edge_result(edge: &Edge, connected_nodes: Vec<String>, scores: Vec<f64>) -> EdgeResult {
    let mean = mean_score(scores);
    let label = if mean > EDGE_POSITIVE_THRESHOLD {
        Label::Positive
    } else {
        Label::Negative
    };
    EdgeResult {
        edge_id: edge.id.clone(),
        sentiment: SentimentResult::new(label, mean),
        connected_nodes,
        metadata: edge.metadata.clone(),
    }
}

/// Check a single text against the API's length limits (1..=max chars).
pub fn validate_text(text: &str, max_chars: usize) -> Result<()> {
    let len = text.chars().count();
    if len == 0 {
        return Err(SentimentError::invalid_input("text must not be empty"));
    }
    if len > max_chars {
        return Err(SentimentError::invalid_input(format!(
            "text is {len} characters, maximum is {max_chars}"
        )));
    }
    Ok(())
}

/// Check a graph request: node ids unique, node texts within `max_chars`.
/// Empty node texts are allowed; they classify as empty input.
pub fn validate_graph(nodes: &[Node], max_chars: usize) -> Result<()> {
    let mut seen = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(SentimentError::invalid_input(format!(
                "duplicate node id '{}'",
                node.id
            )));
        }
        let len = node.text.chars().count();
        if len > max_chars {
            return Err(SentimentError::invalid_input(format!(
                "node '{}' text is {len} characters, maximum is {max_chars}",
                node.id
            )));
        }
    }
    Ok(())
}
