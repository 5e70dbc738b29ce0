// Graph sentiment: typed node/edge records and the analyzer that turns them
// into per-node, per-edge and graph-level results.

pub mod aggregator;
pub mod models;

pub use aggregator::{validate_graph, validate_text, SentimentAnalyzer, TEMP_NODE_ID};
pub use models::{
    Edge, EdgeResult, GraphAnalysis, GraphMetrics, Metadata, Node, NodeResult,
    SentimentDistribution,
};
