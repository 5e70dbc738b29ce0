// Text normalizer: the first preprocessing stage.
//
// Social-media text carries a lot of structure that means nothing to a
// sentiment model: links, @mentions, #hashtags, "RT" retweet markers, HTML
// entities and emoji. Each rule below removes one kind of noise. The rules run
// in a fixed order because each one operates on the previous one's output.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which cleaning rules the normalizer applies. All rules are on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Drop `http…` and `www.…` tokens
    pub remove_urls: bool,
    /// Drop `@user` tokens
    pub remove_mentions: bool,
    /// Drop `#tag` tokens
    pub remove_hashtags: bool,
    /// Drop HTML entities and every character outside `[A-Za-z0-9]` and whitespace.
    /// Accented letters and emoji are dropped, not transliterated.
    pub remove_special_chars: bool,
    pub to_lowercase: bool,
    /// Drop standalone uppercase `RT` markers
    pub remove_retweet_markers: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            remove_urls: true,
            remove_mentions: true,
            remove_hashtags: true,
            remove_special_chars: true,
            to_lowercase: true,
            remove_retweet_markers: true,
        }
    }
}

/// Compiled cleaning rules, shared by every call.
struct Patterns {
    url: Regex,
    mention: Regex,
    hashtag: Regex,
    html_entity: Regex,
    special_chars: Regex,
    retweet: Regex,
    whitespace: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex_lite::Error> {
        Ok(Self {
            url: Regex::new(r"(?i)(?:http|www\.)\S*")?,
            mention: Regex::new(r"@\S+")?,
            hashtag: Regex::new(r"#\S+")?,
            html_entity: Regex::new(r"&(?:[A-Za-z]+|#[0-9]+);")?,
            special_chars: Regex::new(r"[^A-Za-z0-9\s]")?,
            retweet: Regex::new(r"\bRT\b")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }
}

// None if a rule fails to compile; normalize() then passes text through.
static PATTERNS: LazyLock<Option<Patterns>> = LazyLock::new(|| match Patterns::compile() {
    Ok(patterns) => Some(patterns),
    Err(e) => {
        warn!(error = %e, "Normalizer rules failed to compile, cleaning disabled");
        None
    }
});

/// Normalize raw text according to `config`.
///
/// Absent or empty input yields an empty string. The function never fails:
/// if the rule set is unavailable the input is returned unchanged so the
/// classifier still sees something.
pub fn normalize(text: Option<&str>, config: &CleaningConfig) -> String {
    let Some(text) = text else {
        return String::new();
    };
    if text.is_empty() {
        return String::new();
    }

    let Some(patterns) = PATTERNS.as_ref() else {
        return text.to_string();
    };

    let mut out = text.to_string();

    if config.remove_urls {
        out = patterns.url.replace_all(&out, " ").into_owned();
    }
    if config.remove_mentions {
        out = patterns.mention.replace_all(&out, " ").into_owned();
    }
    if config.remove_hashtags {
        out = patterns.hashtag.replace_all(&out, " ").into_owned();
    }
    if config.remove_special_chars {
        out = patterns.html_entity.replace_all(&out, " ").into_owned();
        out = patterns.special_chars.replace_all(&out, "").into_owned();
        // "h.ttp…" only becomes a URL-looking token once punctuation is gone
        if config.remove_urls {
            out = patterns.url.replace_all(&out, " ").into_owned();
        }
    }
    if config.remove_retweet_markers {
        out = patterns.retweet.replace_all(&out, " ").into_owned();
    }

    out = patterns.whitespace.replace_all(&out, " ").into_owned();

    if config.to_lowercase {
        out = out.to_lowercase();
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(text: &str) -> String {
        normalize(Some(text), &CleaningConfig::default())
    }

    #[test]
    fn test_none_and_empty_yield_empty() {
        assert_eq!(normalize(None, &CleaningConfig::default()), "");
        assert_eq!(clean(""), "");
        assert_eq!(clean("   "), "");
    }

    #[test]
    fn test_basic_cleaning() {
        let cleaned = clean("Hello! This is a test #hashtag @mention http://example.com");
        assert_eq!(cleaned, "hello this is a test");
    }

    #[test]
    fn test_www_urls_removed() {
        assert_eq!(clean("see www.example.org/page now"), "see now");
    }

    #[test]
    fn test_url_glued_to_word_removed() {
        assert_eq!(clean("wow!http://spam.example/x great"), "wow great");
        assert_eq!(clean("abcHTTPS://X.IO"), "abc");
    }

    #[test]
    fn test_uppercase_url_removed() {
        let cleaned = clean("LOOK HTTPS://EXAMPLE.COM");
        assert_eq!(cleaned, "look");
    }

    #[test]
    fn test_retweet_marker_removed() {
        let cleaned = clean("RT @user: great news");
        assert_eq!(cleaned, "great news");
    }

    #[test]
    fn test_retweet_marker_inside_word_kept() {
        // Only the standalone token is a marker
        assert_eq!(clean("ART SMART"), "art smart");
    }

    #[test]
    fn test_html_entity_removed_not_left_as_word() {
        assert_eq!(clean("salt &amp; pepper"), "salt pepper");
    }

    #[test]
    fn test_accents_and_emoji_dropped() {
        let cleaned = clean("café 😊 naïve");
        assert_eq!(cleaned, "caf nave");
    }

    #[test]
    fn test_punctuation_cannot_assemble_url() {
        let once = clean("h.ttpfoo bar");
        assert_eq!(once, "bar");
        assert_eq!(clean(&once), once);
    }

    #[test]
    fn test_toggles_are_independent() {
        let config = CleaningConfig {
            remove_urls: false,
            remove_mentions: true,
            remove_hashtags: false,
            remove_special_chars: false,
            to_lowercase: false,
            remove_retweet_markers: false,
        };
        let out = normalize(Some("RT @bob Look #Here http://x.io"), &config);
        assert_eq!(out, "RT Look #Here http://x.io");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(clean("  many\t\tspaces \n here  "), "many spaces here");
    }
}
