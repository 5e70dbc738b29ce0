// Typed records for graph input and analysis output.
//
// Inputs (Node, Edge) deserialize from the caller's JSON; outputs serialize
// to the response shape of the inference API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::classifier::{round_score, Label, SentimentResult};

/// Free-form JSON object attached to nodes, edges and results.
pub type Metadata = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Missing, null and non-string values become the empty string.
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Node {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            metadata: Metadata::new(),
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        _ => String::new(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    pub node_id: String,
    pub sentiment: SentimentResult,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeResult {
    pub edge_id: String,
    pub sentiment: SentimentResult,
    /// Ids of the endpoint nodes, source first.
    pub connected_nodes: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive_nodes: usize,
    pub negative_nodes: usize,
    pub neutral_nodes: usize,
    pub positive_edges: usize,
    pub negative_edges: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub average_node_sentiment: f64,
    pub average_edge_sentiment: f64,
    pub sentiment_distribution: SentimentDistribution,
}

impl GraphMetrics {
    /// Derive metrics from node and edge results. Means over an empty set are 0.0.
    pub fn from_results(nodes: &[NodeResult], edges: &[EdgeResult]) -> Self {
        let mut distribution = SentimentDistribution::default();
        for node in nodes {
            match node.sentiment.label {
                Label::Positive => distribution.positive_nodes += 1,
                Label::Negative => distribution.negative_nodes += 1,
                Label::Neutral => distribution.neutral_nodes += 1,
            }
        }
        for edge in edges {
            match edge.sentiment.label {
                Label::Positive => distribution.positive_edges += 1,
                Label::Negative => distribution.negative_edges += 1,
                Label::Neutral => {}
            }
        }

        Self {
            average_node_sentiment: mean_score(nodes.iter().map(|n| n.sentiment.score)),
            average_edge_sentiment: mean_score(edges.iter().map(|e| e.sentiment.score)),
            sentiment_distribution: distribution,
        }
    }
}

/// Arithmetic mean rounded to 4 decimals; 0.0 for no scores.
pub fn mean_score(scores: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = scores
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        return 0.0;
    }
    round_score(sum / count as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphAnalysis {
    pub nodes: Vec<NodeResult>,
    pub edges: Vec<EdgeResult>,
    pub metrics: GraphMetrics,
}

impl GraphAnalysis {
    pub fn new(nodes: Vec<NodeResult>, edges: Vec<EdgeResult>) -> Self {
        let metrics = GraphMetrics::from_results(&nodes, &edges);
        Self { nodes, edges, metrics }
    }
}
