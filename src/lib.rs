// moodgraph: sentiment analysis for text and for the nodes and edges of a graph
//
// This is the library root. Text flows preprocess -> classifier; graph input
// flows through both per node and is then aggregated per edge and per graph.

pub mod classifier;
pub mod config;
pub mod error;
pub mod graph;
pub mod output;
pub mod preprocess;
pub mod status;

#[cfg(feature = "web")]
pub mod web;

pub use error::{Result, SentimentError};
