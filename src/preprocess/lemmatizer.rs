// Lemmatizer: the third preprocessing stage.
//
// Maps each token to its dictionary base form ("jumps" → "jump",
// "running" → "run", "was" → "be"). Lookup order for a token:
//
//   1. the lemma table file, if one is configured (JSON object form → lemma,
//      the layout of spaCy's lookup tables, so those can be dropped in as-is)
//   2. the built-in table of English irregular forms
//   3. English inflectional suffix rules, or the Snowball stemmer for the
//      other languages
//   4. the token itself
//
// Step 2 only applies to English. Snowball output is a stem rather than a
// dictionary form ("maisons" → "maison", "katzen" → "katz"), which is close
// enough for a classifier. Input is post-stopword text, so it is often not a
// grammatical sentence. Every rule looks at one token in isolation.

use std::collections::HashMap;
use std::path::Path;

use rust_stemmers::{Algorithm, Stemmer};
use tracing::{debug, info};

use super::stopwords::Language;
use crate::error::{Result, SentimentError};

/// Irregular English forms that suffix rules can't recover.
const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("am", "be"),
    ("are", "be"),
    ("is", "be"),
    ("was", "be"),
    ("were", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("doing", "do"),
    ("goes", "go"),
    ("went", "go"),
    ("gone", "go"),
    ("going", "go"),
    ("ate", "eat"),
    ("eaten", "eat"),
    ("became", "become"),
    ("becoming", "become"),
    ("began", "begin"),
    ("begun", "begin"),
    ("bought", "buy"),
    ("brought", "bring"),
    ("broke", "break"),
    ("came", "come"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("felt", "feel"),
    ("flew", "fly"),
    ("flown", "fly"),
    ("forgot", "forget"),
    ("forgotten", "forget"),
    ("found", "find"),
    ("gave", "give"),
    ("given", "give"),
    ("got", "get"),
    ("gotten", "get"),
    ("held", "hold"),
    ("kept", "keep"),
    ("knew", "know"),
    ("known", "know"),
    ("led", "lead"),
    ("lost", "lose"),
    ("made", "make"),
    ("meant", "mean"),
    ("met", "meet"),
    ("paid", "pay"),
    ("ran", "run"),
    ("said", "say"),
    ("sat", "sit"),
    ("saw", "see"),
    ("seen", "see"),
    ("sent", "send"),
    ("sold", "sell"),
    ("spent", "spend"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("stood", "stand"),
    ("swam", "swim"),
    ("taken", "take"),
    ("took", "take"),
    ("taught", "teach"),
    ("thought", "think"),
    ("told", "tell"),
    ("understood", "understand"),
    ("won", "win"),
    ("wrote", "write"),
    ("written", "write"),
    ("pleased", "please"),
    ("pleasing", "please"),
    ("agreed", "agree"),
    ("freed", "free"),
    ("better", "good"),
    ("best", "good"),
    ("worse", "bad"),
    ("worst", "bad"),
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("mice", "mouse"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("knives", "knife"),
    ("lives", "life"),
    ("wives", "wife"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("selves", "self"),
    ("shelves", "shelf"),
    ("wolves", "wolf"),
];

/// Words whose inflection-looking ending is part of the base form.
const PROTECTED: &[&str] = &[
    // -s
    "always", "news", "perhaps", "lens", "series", "species", "chaos", "bias", "canvas",
    "whereas", "hers", "ours", "yours", "theirs",
    // -ed
    "hundred", "sacred", "naked", "wicked", "beloved", "need", "feed", "seed", "speed", "weed",
    "breed", "bleed", "greed", "indeed", "proceed", "exceed", "succeed", "embed", "shed",
    // -ing
    "thing", "nothing", "something", "anything", "everything", "king", "ring", "bring",
    "spring", "string", "sting", "swing", "wing", "morning", "evening", "during", "ceiling",
    "wedding", "pudding", "amazing", "interesting", "boring", "exciting", "annoying",
    "disappointing", "disgusting", "charming", "stunning", "outstanding", "surprising",
    "frustrating", "inspiring", "caring", "loving", "willing",
];

/// Snowball stemmer for a non-English language.
struct SnowballStem {
    stemmer: Stemmer,
    algorithm: Algorithm,
}

impl SnowballStem {
    fn for_language(language: Language) -> Option<Self> {
        let algorithm = match language {
            Language::English => return None,
            Language::French => Algorithm::French,
            Language::German => Algorithm::German,
            Language::Spanish => Algorithm::Spanish,
            Language::Italian => Algorithm::Italian,
            Language::Portuguese => Algorithm::Portuguese,
            Language::Dutch => Algorithm::Dutch,
        };
        Some(Self {
            stemmer: Stemmer::create(algorithm),
            algorithm,
        })
    }

    fn stem(&self, word: &str) -> String {
        self.stemmer.stem(word).into_owned()
    }
}

impl Clone for SnowballStem {
    fn clone(&self) -> Self {
        // Stemmer is not Clone
        Self {
            stemmer: Stemmer::create(self.algorithm),
            algorithm: self.algorithm,
        }
    }
}

impl std::fmt::Debug for SnowballStem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowballStem")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Token-level lemma model, loaded once and shared read-only.
#[derive(Debug, Clone)]
pub struct Lemmatizer {
    language: Language,
    table: HashMap<String, String>,
    irregular: HashMap<&'static str, &'static str>,
    snowball: Option<SnowballStem>,
}

impl Lemmatizer {
    /// Built-in model for `language` with no lemma table.
    pub fn new(language: Language) -> Self {
        let irregular = if language == Language::English {
            IRREGULAR_FORMS.iter().copied().collect()
        } else {
            HashMap::new()
        };
        Self {
            language,
            table: HashMap::new(),
            irregular,
            snowball: SnowballStem::for_language(language),
        }
    }

    pub fn english() -> Self {
        Self::new(Language::English)
    }

    /// Load the lemma model, extending the built-in rules with an optional table.
    ///
    /// A configured table that can't be read or parsed is a load failure.
    pub fn load(language: Language, table_path: Option<&Path>) -> Result<Self> {
        let mut lemmatizer = Self::new(language);

        if let Some(path) = table_path {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                SentimentError::model_load(format!(
                    "Failed to read lemma table {}: {e}",
                    path.display()
                ))
            })?;
            let table: HashMap<String, String> = serde_json::from_str(&raw).map_err(|e| {
                SentimentError::model_load(format!(
                    "Lemma table {} is not a JSON object of form → lemma strings: {e}",
                    path.display()
                ))
            })?;
            info!(
                entries = table.len(),
                path = %path.display(),
                "Loaded lemma table"
            );
            lemmatizer.table = table;
        }

        debug!(language = %language, "Lemmatizer ready");
        Ok(lemmatizer)
    }

    /// Add or override entries in the lemma table.
    pub fn with_entries<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.table
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    /// Replace every whitespace-separated token with its lemma.
    pub fn lemmatize(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| self.lemma(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lemma of a single token.
    pub fn lemma(&self, token: &str) -> String {
        if let Some(lemma) = self.table.get(token) {
            return lemma.clone();
        }
        if let Some(lemma) = self.irregular.get(token) {
            return (*lemma).to_string();
        }
        if let Some(snowball) = &self.snowball {
            if is_lowercase_word(token) {
                return snowball.stem(token);
            }
        } else if self.language == Language::English && is_plain_word(token) {
            if let Some(lemma) = english_suffix_lemma(token) {
                return lemma;
            }
        }
        token.to_string()
    }
}

/// Lowercase ASCII letters only; numbers and mixed tokens are left alone.
fn is_plain_word(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_lowercase())
}

/// Lowercase letters in any script, for the Snowball languages.
fn is_lowercase_word(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_alphabetic() && !c.is_uppercase())
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn has_vowel(word: &str) -> bool {
    word.bytes().any(|b| is_vowel(b) || b == b'y')
}

fn vowel_groups(word: &str) -> usize {
    let mut groups = 0;
    let mut in_group = false;
    for b in word.bytes() {
        if is_vowel(b) {
            if !in_group {
                groups += 1;
            }
            in_group = true;
        } else {
            in_group = false;
        }
    }
    groups
}

/// Strip a regular English inflection, or None if no rule applies.
fn english_suffix_lemma(word: &str) -> Option<String> {
    if PROTECTED.contains(&word) {
        return None;
    }
    let len = word.len();

    if len > 4 && word.ends_with("ies") {
        return Some(format!("{}y", &word[..len - 3]));
    }
    if len > 4 && word.ends_with("ied") {
        return Some(format!("{}y", &word[..len - 3]));
    }
    if len > 4
        && ["sses", "shes", "ches", "xes", "zzes"]
            .iter()
            .any(|suffix| word.ends_with(suffix))
    {
        return Some(word[..len - 2].to_string());
    }
    if len > 3 && word.ends_with('s') {
        let keeps_s = ["ss", "us", "is", "ics"].iter().any(|s| word.ends_with(s));
        if !keeps_s {
            return Some(word[..len - 1].to_string());
        }
        return None;
    }
    if len > 5 && word.ends_with("ing") {
        let stem = &word[..len - 3];
        if has_vowel(stem) {
            return Some(restore_verb_stem(stem));
        }
        return None;
    }
    if len > 3 && word.ends_with("ed") && !word.ends_with("eed") {
        let stem = &word[..len - 2];
        if stem.len() >= 2 && has_vowel(stem) {
            return Some(restore_verb_stem(stem));
        }
    }
    None
}

/// Repair a verb stem after "-ing"/"-ed" removal.
///
/// Undoubles a doubled final consonant ("runn" → "run") and restores a
/// dropped silent "e" ("hop" → "hope", "lov" → "love", "danc" → "dance").
fn restore_verb_stem(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();

    if n >= 3 {
        let last = bytes[n - 1];
        if last == bytes[n - 2] && !is_vowel(last) && !matches!(last, b'l' | b's' | b'z' | b'f') {
            return stem[..n - 1].to_string();
        }
    }

    let last = bytes[n - 1];
    if last == b'v' || (last == b'c' && n >= 2 && !is_vowel(bytes[n - 2])) {
        return format!("{stem}e");
    }

    // "us" (using), "ag" (aged)
    if n == 2 && is_vowel(bytes[0]) && !is_vowel(bytes[1]) {
        return format!("{stem}e");
    }

    // Short consonant-vowel-consonant stems lost a silent e: "mak", "hop", "writ"
    if (3..=4).contains(&n) && vowel_groups(stem) == 1 {
        let (a, b, c) = (bytes[n - 3], bytes[n - 2], bytes[n - 1]);
        if !is_vowel(a) && is_vowel(b) && !is_vowel(c) && !matches!(c, b'w' | b'x' | b'y') {
            return format!("{stem}e");
        }
    }

    stem.to_string()
}
