// Unit tests for the preprocessing stages.
//
// Covers the normalizer's output guarantees (no URLs/mentions/hashtags,
// lowercase, idempotent), stopword filtering order and case rules, lemma
// lookup precedence, and the coercion of non-string input to "".

use std::collections::HashSet;

use moodgraph::preprocess::{
    normalize, remove_stopwords, CleaningConfig, Language, Lemmatizer, Preprocessor,
    StopwordFilter,
};
use serde_json::json;

fn clean(text: &str) -> String {
    normalize(Some(text), &CleaningConfig::default())
}

fn stopword_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

// ============================================================
// Normalizer: output guarantees
// ============================================================

#[test]
fn normalizer_strips_every_marker_from_social_text() {
    let inputs = [
        "RT @user: The quick brown fox #jumps over the lazy dog! http://example.com",
        "check https://t.co/abc?x=1 and WWW.Example.COM/path now",
        "@alice @bob #one#two #three",
        "mixed@inside text#tag and http:/broken/link",
        "h.ttp://example.com",
        "foohttp://example.com",
        "see2http://x.io now",
        "visitwww.example.com today",
    ];
    for input in inputs {
        let out = clean(input);
        assert!(!out.contains("http"), "http left in {out:?} (from {input:?})");
        assert!(!out.contains('@'), "@ left in {out:?} (from {input:?})");
        assert!(!out.contains('#'), "# left in {out:?} (from {input:?})");
    }
}

#[test]
fn normalizer_scenario_sentence() {
    let out = clean("RT @user: The quick brown fox #jumps over the lazy dog! http://example.com");
    assert_eq!(out, "the quick brown fox over the lazy dog");
    assert!(!out.split_whitespace().any(|t| t.eq_ignore_ascii_case("rt")));
}

#[test]
fn normalizer_removes_urls_glued_to_preceding_text() {
    assert_eq!(clean("foohttp://example.com bar"), "foo bar");
    assert_eq!(clean("see2http://x.io now"), "see2 now");
    assert_eq!(clean("visitwww.example.com today"), "visit today");
}

#[test]
fn normalizer_output_is_lowercase() {
    let out = clean("LOUD Words And MiXeD CaSe 123");
    assert_eq!(out, out.to_lowercase());
    assert_eq!(out, "loud words and mixed case 123");
}

#[test]
fn normalizer_is_idempotent() {
    let inputs = [
        "RT @user: The quick brown fox #jumps over the lazy dog! http://example.com",
        "Café &amp; crème brûlée!!! 😊",
        "h.ttpfoo bar",
        "w.w.w.site.com next",
        "foohttp://example.com and see2http://x.io",
        "  RT  rt Rt  ",
        "A-R-T and R.T. markers",
        "",
    ];
    for input in inputs {
        let once = clean(input);
        assert_eq!(clean(&once), once, "not idempotent for {input:?}");
    }
}

#[test]
fn normalizer_keeps_case_when_lowercase_disabled() {
    let config = CleaningConfig {
        to_lowercase: false,
        ..CleaningConfig::default()
    };
    assert_eq!(normalize(Some("Hello World"), &config), "Hello World");
}

#[test]
fn normalizer_retweet_toggle() {
    let config = CleaningConfig {
        remove_retweet_markers: false,
        ..CleaningConfig::default()
    };
    assert_eq!(normalize(Some("RT great news"), &config), "rt great news");
}

#[test]
fn normalizer_absent_input_is_empty() {
    assert_eq!(normalize(None, &CleaningConfig::default()), "");
}

// ============================================================
// Stopword filter
// ============================================================

#[test]
fn stopwords_removed_in_order() {
    let set = stopword_set(&["the", "over"]);
    assert_eq!(
        remove_stopwords("the quick brown fox over the lazy dog", &set),
        "quick brown fox lazy dog"
    );
}

#[test]
fn stopwords_match_is_case_sensitive() {
    let set = stopword_set(&["the"]);
    assert_eq!(remove_stopwords("The the THE", &set), "The THE");
}

#[test]
fn stopwords_empty_input_and_all_stopwords() {
    let set = stopword_set(&["a", "an"]);
    assert_eq!(remove_stopwords("", &set), "");
    assert_eq!(remove_stopwords("a an a", &set), "");
}

#[test]
fn english_stopword_list_covers_common_words() {
    let filter = StopwordFilter::for_language(Language::English);
    assert!(!filter.is_empty());
    assert!(filter.is_stopword("the"));
    assert!(filter.is_stopword("over"));
    assert!(!filter.is_stopword("thunderstorm"));
}

#[test]
fn language_tags_parse() {
    assert_eq!("en".parse::<Language>().unwrap(), Language::English);
    assert_eq!("French".parse::<Language>().unwrap(), Language::French);
    assert!("klingon".parse::<Language>().is_err());
}

// ============================================================
// Lemmatizer
// ============================================================

#[test]
fn lemmatizer_scenario_words() {
    let lemmatizer = Lemmatizer::english();
    assert_eq!(lemmatizer.lemmatize("jumps"), "jump");
    assert_eq!(lemmatizer.lemmatize("running"), "run");
    assert_eq!(lemmatizer.lemmatize("studies"), "study");
    assert_eq!(lemmatizer.lemmatize("hoped"), "hope");
}

#[test]
fn lemmatizer_handles_fragments_and_untouchable_tokens() {
    let lemmatizer = Lemmatizer::english();
    assert_eq!(lemmatizer.lemmatize("dogs running 2020s café"), "dog run 2020s café");
    assert_eq!(lemmatizer.lemmatize(""), "");
}

#[test]
fn lemma_table_takes_precedence_over_rules() {
    let lemmatizer = Lemmatizer::english().with_entries([("running", "runner"), ("geese", "goose")]);
    assert_eq!(lemmatizer.lemmatize("running geese"), "runner goose");
}

#[test]
fn non_english_lemmatizer_uses_table_then_stemmer() {
    let lemmatizer = Lemmatizer::new(Language::French).with_entries([("chantons", "chanter")]);
    assert_eq!(lemmatizer.lemmatize("chantons maisons"), "chanter maison");
}

#[test]
fn non_english_pipeline_stems_after_stopword_removal() {
    let p = Preprocessor::load(CleaningConfig::default(), Language::German, None).unwrap();
    let out = p.preprocess(Some("Die Katzen!"));
    assert!(!out.split_whitespace().any(|t| t == "die"), "stopword left in {out:?}");
    assert_eq!(out, "katz");
}

// ============================================================
// Pipeline: composition and coercion
// ============================================================

#[test]
fn preprocess_non_string_input_is_empty() {
    let p = Preprocessor::new(
        CleaningConfig::default(),
        StopwordFilter::new(stopword_set(&["the"])),
        Lemmatizer::english(),
    );
    assert_eq!(p.preprocess(None), "");
    assert_eq!(p.preprocess_value(&json!(123)), "");
    assert_eq!(p.preprocess_value(&json!(["a", "list"])), "");
    assert_eq!(p.preprocess_value(&json!(null)), "");
}

#[test]
fn preprocess_runs_all_three_stages() {
    let p = Preprocessor::new(
        CleaningConfig::default(),
        StopwordFilter::new(stopword_set(&["the", "over"])),
        Lemmatizer::english(),
    );
    let out = p.preprocess(Some("RT @user: The dogs were running over the hills! #fun"));
    assert_eq!(out, "dog be run hill");
}
