// Composition tests: verifying that the stages chain together correctly.
//
// These tests exercise the data flow between modules:
//   Normalizer -> Stopwords -> Lemmatizer -> Lexicon classifier -> Aggregator
// with the built-in lexicon backend, so no model files or network access are
// needed (the lemma table test writes to the temp dir).

use std::collections::HashSet;
use std::sync::Arc;

use moodgraph::classifier::{Label, LexiconClassifier, SentimentClassifier};
use moodgraph::config::{ClassifierBackend, Config};
use moodgraph::graph::{GraphAnalysis, Node, SentimentAnalyzer};
use moodgraph::output::truncate_chars;
use moodgraph::preprocess::{CleaningConfig, Language, Lemmatizer, Preprocessor, StopwordFilter};

fn lexicon_config() -> Config {
    Config {
        classifier_backend: ClassifierBackend::Lexicon,
        ..Config::default()
    }
}

fn small_stopwords() -> StopwordFilter {
    let words: HashSet<String> = ["i", "the", "this", "was", "a", "it", "and", "over"]
        .iter()
        .map(|w| w.to_string())
        .collect();
    StopwordFilter::new(words)
}

fn lexicon_analyzer() -> SentimentAnalyzer {
    let preprocessor = Preprocessor::new(
        CleaningConfig::default(),
        small_stopwords(),
        Lemmatizer::english(),
    );
    SentimentAnalyzer::new(Arc::new(preprocessor), Arc::new(LexiconClassifier::default()))
}

// ============================================================
// Chain: Normalizer -> Stopwords -> Lemmatizer
// ============================================================

#[test]
fn default_pipeline_scenario_sentence() {
    let preprocessor =
        Preprocessor::load(CleaningConfig::default(), Language::English, None).unwrap();
    let trace = preprocessor.trace(Some(
        "RT @user: The quick brown fox #jumps over the lazy dog! http://example.com",
    ));

    assert_eq!(trace.normalized, "the quick brown fox over the lazy dog");
    let remaining: Vec<&str> = trace.without_stopwords.split_whitespace().collect();
    assert!(!remaining.contains(&"the"));
    assert!(!remaining.contains(&"over"));
    for marker in ["http", "#", "@"] {
        assert!(!trace.lemmatized.contains(marker));
    }
}

#[test]
fn inflected_sentiment_words_reach_the_lexicon_as_lemmas() {
    let preprocessor = Preprocessor::new(
        CleaningConfig::default(),
        small_stopwords(),
        Lemmatizer::english(),
    );
    let cleaned = preprocessor.preprocess(Some("I LOVED it and the kids were enjoying it!"));
    assert_eq!(cleaned, "love kid be enjoy");

    let result = LexiconClassifier::default().score(&cleaned);
    assert_eq!(result.label, Label::Positive);
}

#[test]
fn past_participles_of_lexicon_words_still_score() {
    let preprocessor = Preprocessor::new(
        CleaningConfig::default(),
        small_stopwords(),
        Lemmatizer::english(),
    );
    let cleaned = preprocessor.preprocess(Some("I was so pleased with it"));
    assert_eq!(cleaned, "so please with");
    assert_eq!(LexiconClassifier::default().score(&cleaned).label, Label::Positive);

    let cleaned = preprocessor.preprocess(Some("The screen was broken"));
    assert_eq!(cleaned, "screen broken");
    assert_eq!(LexiconClassifier::default().score(&cleaned).label, Label::Negative);
}

#[test]
fn lemma_table_file_feeds_the_pipeline() {
    let path = std::env::temp_dir().join("moodgraph-composition-lemmas.json");
    std::fs::write(&path, r#"{"thrilled": "delight", "gutted": "sad"}"#).unwrap();

    let preprocessor =
        Preprocessor::load(CleaningConfig::default(), Language::English, Some(&path)).unwrap();
    let classifier = LexiconClassifier::default();

    let happy = preprocessor.preprocess(Some("Thrilled!!"));
    let gloomy = preprocessor.preprocess(Some("gutted"));
    assert_eq!(happy, "delight");
    assert_eq!(classifier.score(&happy).label, Label::Positive);
    assert_eq!(classifier.score(&gloomy).label, Label::Negative);

    std::fs::remove_file(&path).unwrap();
}

// ============================================================
// Chain: Config -> Analyzer -> Graph -> JSON
// ============================================================

#[tokio::test]
async fn lexicon_config_builds_a_working_analyzer() {
    let analyzer = SentimentAnalyzer::from_config(&lexicon_config()).unwrap();
    assert_eq!(analyzer.model_name(), "lexicon");

    let result = analyzer
        .analyze_text(Some("What a terrible, horrible day"))
        .await
        .unwrap();
    assert_eq!(result.label, Label::Negative);
}

#[tokio::test]
async fn graph_json_roundtrip_through_analyzer() {
    let raw = r#"{
        "nodes": [
            {"id": "n1", "text": "I loved this wonderful movie!", "metadata": {"lang": "en"}},
            {"id": "n2", "text": "This was awful and boring."},
            {"id": "n3", "text": 42}
        ],
        "edges": [
            {"id": "e1", "source": "n1", "target": "n2"},
            {"id": "e2", "source": "n1", "target": "missing"}
        ]
    }"#;

    #[derive(serde::Deserialize)]
    struct Payload {
        nodes: Vec<Node>,
        edges: Vec<moodgraph::graph::Edge>,
    }
    let payload: Payload = serde_json::from_str(raw).unwrap();

    let analysis = lexicon_analyzer()
        .analyze_graph(&payload.nodes, &payload.edges)
        .await
        .unwrap();

    let labels: Vec<Label> = analysis.nodes.iter().map(|n| n.sentiment.label).collect();
    assert_eq!(labels, vec![Label::Positive, Label::Negative, Label::Neutral]);
    assert_eq!(analysis.edges.len(), 1);
    assert_eq!(analysis.nodes[0].metadata["lang"], "en");

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["edges"][0]["connected_nodes"], serde_json::json!(["n1", "n2"]));
    assert_eq!(json["metrics"]["sentiment_distribution"]["neutral_nodes"], 1);

    let back: GraphAnalysis = serde_json::from_value(json).unwrap();
    assert_eq!(back, analysis);
}

#[tokio::test]
async fn batch_classification_matches_single_classification() {
    let classifier = LexiconClassifier::default();
    let texts: Vec<String> = ["love", "hate", "table", "great great bad"]
        .iter()
        .map(|t| t.to_string())
        .collect();

    let batch = classifier.classify_batch(&texts).await.unwrap();
    for (text, batched) in texts.iter().zip(&batch) {
        assert_eq!(&classifier.classify(text).await.unwrap(), batched);
    }
}

// ============================================================
// Log previews
// ============================================================

#[test]
fn log_preview_truncates_long_node_text() {
    let text = "sunshine ".repeat(20);
    let preview = truncate_chars(&text, 50);
    assert!(preview.ends_with("..."));
    assert_eq!(preview.chars().count(), 53);
}
