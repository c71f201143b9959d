//! Text cleanup ahead of matching: masking, whitespace folding, script
//! detection and sentence/word statistics.
//!
//! Offsets reported by later stages refer to the normalized text, not the raw
//! input. Callers that need raw offsets have to map them back themselves.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::Language;

pub const URL_PLACEHOLDER: &str = "[URL]";
pub const EMAIL_PLACEHOLDER: &str = "[EMAIL]";

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("static regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("static regex")
});
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));
static SENTENCE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("static regex"));

/// Masks URLs and emails, then folds whitespace.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    pub mask_urls: bool,
    pub mask_emails: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            mask_urls: true,
            mask_emails: true,
        }
    }
}

impl Normalizer {
    /// URLs are masked before emails so an address embedded in a link
    /// disappears together with the link.
    pub fn normalize(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        if self.mask_urls {
            text = URL_RE.replace_all(&text, URL_PLACEHOLDER).into_owned();
        }
        if self.mask_emails {
            text = EMAIL_RE.replace_all(&text, EMAIL_PLACEHOLDER).into_owned();
        }
        WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
    }
}

/// `normalize` with both masks enabled.
pub fn normalize(raw: &str) -> String {
    Normalizer::default().normalize(raw)
}

/// Script guess for a text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DetectedLanguage {
    Russian,
    English,
    Unknown,
}

impl DetectedLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectedLanguage::Russian => "russian",
            DetectedLanguage::English => "english",
            DetectedLanguage::Unknown => "unknown",
        }
    }

    pub fn language(&self) -> Option<Language> {
        match self {
            DetectedLanguage::Russian => Some(Language::Russian),
            DetectedLanguage::English => Some(Language::English),
            DetectedLanguage::Unknown => None,
        }
    }
}

impl std::fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const DOMINANT_SHARE: f64 = 0.6;

/// Counts Cyrillic against Latin letters; a script wins above a 60% share.
pub fn detect_language(text: &str) -> DetectedLanguage {
    let mut cyrillic = 0usize;
    let mut latin = 0usize;
    for ch in text.chars() {
        if matches!(ch, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё') {
            cyrillic += 1;
        } else if ch.is_ascii_alphabetic() {
            latin += 1;
        }
    }
    let total = cyrillic + latin;
    if total == 0 {
        return DetectedLanguage::Unknown;
    }
    if cyrillic as f64 / total as f64 > DOMINANT_SHARE {
        DetectedLanguage::Russian
    } else if latin as f64 / total as f64 > DOMINANT_SHARE {
        DetectedLanguage::English
    } else {
        DetectedLanguage::Unknown
    }
}

/// Sentence and word segmentation used for statistics.
pub trait Segmenter: Send + Sync {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str>;
    fn words<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Splits sentences on runs of `.!?` followed by whitespace and words on
/// whitespace. Abbreviations and decimals followed by a space undercount.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSegmenter;

impl Segmenter for HeuristicSegmenter {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        sentence_split(text)
    }

    fn words<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split_whitespace().collect()
    }
}

/// UAX #29 sentence and word boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSegmenter;

impl Segmenter for UnicodeSegmenter {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn words<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.unicode_words().collect()
    }
}

/// Segmenter selection for configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SegmenterKind {
    Heuristic,
    Unicode,
}

impl Default for SegmenterKind {
    fn default() -> Self {
        SegmenterKind::Heuristic
    }
}

impl SegmenterKind {
    pub fn build(&self) -> Box<dyn Segmenter> {
        match self {
            SegmenterKind::Heuristic => Box::new(HeuristicSegmenter),
            SegmenterKind::Unicode => Box::new(UnicodeSegmenter),
        }
    }
}

pub fn sentence_split(text: &str) -> Vec<&str> {
    SENTENCE_BREAK_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Size statistics of a text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextStats {
    pub chars: usize,
    pub chars_no_spaces: usize,
    pub words: usize,
    pub sentences: usize,
    pub avg_sentence_length: f64,
}

pub fn text_stats(text: &str, segmenter: &dyn Segmenter) -> TextStats {
    let words = segmenter.words(text).len();
    let sentences = segmenter.sentences(text).len();
    let avg_sentence_length = if sentences == 0 {
        0.0
    } else {
        words as f64 / sentences as f64
    };
    TextStats {
        chars: text.chars().count(),
        chars_no_spaces: text.chars().filter(|c| *c != ' ').count(),
        words,
        sentences,
        avg_sentence_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_urls_before_emails() {
        let text = normalize("Пишите на doctor@example.com или https://user@example.com/path сейчас");
        assert_eq!(text, "Пишите на [EMAIL] или [URL] сейчас");
    }

    #[test]
    fn masking_can_be_disabled() {
        let normalizer = Normalizer {
            mask_urls: false,
            mask_emails: false,
        };
        assert_eq!(
            normalizer.normalize("  see www.example.org \n\n a@b.io "),
            "see www.example.org a@b.io"
        );
    }

    #[test]
    fn collapses_whitespace_and_newlines() {
        assert_eq!(normalize("\tone\n\ntwo   three \r\n"), "one two three");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in [
            "  Visit http://x.y/z  now!\n\nMail: me@there.org  ",
            "Чудо-средство\tот всех   болезней.",
            "",
            "[URL] [EMAIL]",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn detects_script() {
        assert_eq!(detect_language("Привет мир"), DetectedLanguage::Russian);
        assert_eq!(detect_language("Hello world"), DetectedLanguage::English);
        assert_eq!(detect_language("123 456"), DetectedLanguage::Unknown);
        assert_eq!(detect_language("abc где"), DetectedLanguage::Unknown);
        assert_eq!(detect_language("Ёжик"), DetectedLanguage::Russian);
    }

    #[test]
    fn splits_sentences_heuristically() {
        let sentences = sentence_split("One. Two!! Three? four");
        assert_eq!(sentences, vec!["One", "Two", "Three", "four"]);
        assert!(sentence_split("   ").is_empty());
    }

    #[test]
    fn stats_guard_zero_sentences() {
        let stats = text_stats("", &HeuristicSegmenter);
        assert_eq!(stats.sentences, 0);
        assert_eq!(stats.avg_sentence_length, 0.0);
    }

    #[test]
    fn stats_count_chars_words_and_sentences() {
        let stats = text_stats("Пейте воду. Спите больше.", &HeuristicSegmenter);
        assert_eq!(stats.chars, 25);
        assert_eq!(stats.chars_no_spaces, 22);
        assert_eq!(stats.words, 4);
        assert_eq!(stats.sentences, 2);
        assert_eq!(stats.avg_sentence_length, 2.0);
    }

    #[test]
    fn unicode_segmenter_ignores_punctuation_tokens() {
        let seg = UnicodeSegmenter;
        assert_eq!(seg.words("Sleep - then eat."), vec!["Sleep", "then", "eat"]);
        assert_eq!(seg.sentences("Sleep well. Eat well.").len(), 2);
    }
}
