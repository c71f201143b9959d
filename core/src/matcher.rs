//! Compiled marker, evidence-term and amplifier patterns for one language.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::{Catalog, CategoryInfo, Error, Language, Result, Severity};

/// A located pseudoscience marker. Offsets are half-open character positions
/// in the normalized text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Marker {
    pub category: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub severity: Severity,
    pub description_ru: String,
    pub description_en: String,
}

/// A located legitimate term or amplifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermMatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
struct CompiledCategory {
    info: CategoryInfo,
    regexes: Vec<Regex>,
}

/// Patterns compiled once and reused for every text.
#[derive(Debug, Clone)]
pub struct MarkerMatcher {
    language: Language,
    categories: Vec<CompiledCategory>,
    legitimate_terms: Vec<Regex>,
    amplifiers: Vec<Regex>,
}

impl MarkerMatcher {
    pub fn compile(catalog: &Catalog, language: Language) -> Result<Self> {
        let mut categories = Vec::new();
        for entry in catalog.patterns_for(language)? {
            let info = catalog
                .category(&entry.category)
                .ok_or_else(|| Error::UnknownCategory {
                    language,
                    category: entry.category.clone(),
                })?
                .clone();
            let regexes = entry
                .patterns
                .iter()
                .map(|p| compile_pattern(p))
                .collect::<Result<Vec<_>>>()?;
            categories.push(CompiledCategory { info, regexes });
        }

        let legitimate_terms = catalog
            .legitimate_terms_for(language)
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>>>()?;

        let amplifiers = catalog
            .amplifiers_for(language)
            .iter()
            .map(|word| compile_pattern(&format!(r"\b{}\b", regex::escape(word))))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "compiled {} marker patterns in {} categories for {language}",
            categories.iter().map(|c| c.regexes.len()).sum::<usize>(),
            categories.len()
        );

        Ok(Self {
            language,
            categories,
            legitimate_terms,
            amplifiers,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Every match of every pattern, category by category. A span may be
    /// reported by several patterns or categories.
    pub fn find_markers(&self, text: &str) -> Vec<Marker> {
        let offsets = CharOffsets::new(text);
        let mut markers = Vec::new();
        for category in &self.categories {
            for regex in &category.regexes {
                for mat in regex.find_iter(text) {
                    markers.push(Marker {
                        category: category.info.id.clone(),
                        text: mat.as_str().to_string(),
                        start: offsets.char_index(mat.start()),
                        end: offsets.char_index(mat.end()),
                        severity: category.info.severity,
                        description_ru: category.info.description_ru.clone(),
                        description_en: category.info.description_en.clone(),
                    });
                }
            }
        }
        markers
    }

    pub fn find_legitimate_terms(&self, text: &str) -> Vec<TermMatch> {
        find_terms(&self.legitimate_terms, text)
    }

    pub fn find_amplifiers(&self, text: &str) -> Vec<TermMatch> {
        find_terms(&self.amplifiers, text)
    }
}

/// Marker totals per category id.
pub fn category_counts(markers: &[Marker]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for marker in markers {
        *counts.entry(marker.category.clone()).or_default() += 1;
    }
    counts
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn find_terms(regexes: &[Regex], text: &str) -> Vec<TermMatch> {
    let offsets = CharOffsets::new(text);
    let mut found = Vec::new();
    for regex in regexes {
        for mat in regex.find_iter(text) {
            found.push(TermMatch {
                text: mat.as_str().to_string(),
                start: offsets.char_index(mat.start()),
                end: offsets.char_index(mat.end()),
            });
        }
    }
    found
}

/// Byte to character position lookup for one text.
pub(crate) struct CharOffsets {
    starts: Vec<usize>,
    text_len: usize,
}

impl CharOffsets {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            starts: text.char_indices().map(|(idx, _)| idx).collect(),
            text_len: text.len(),
        }
    }

    /// Number of characters in the text.
    pub(crate) fn len(&self) -> usize {
        self.starts.len()
    }

    /// Byte offset of a character index, clamped to the text end.
    pub(crate) fn byte_offset(&self, char_index: usize) -> usize {
        self.starts.get(char_index).copied().unwrap_or(self.text_len)
    }

    /// Character index of a byte offset on a char boundary; the text length
    /// maps to the character count.
    pub(crate) fn char_index(&self, byte_offset: usize) -> usize {
        match self.starts.binary_search(&byte_offset) {
            Ok(idx) | Err(idx) => idx,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn matcher(language: Language) -> MarkerMatcher {
        MarkerMatcher::compile(&Catalog::builtin(), language).unwrap()
    }

    #[test]
    fn reports_character_offsets_for_cyrillic() {
        let m = matcher(Language::Russian);
        let text = "Это чудо-средство помогает";
        let markers = m.find_markers(text);
        assert_eq!(markers.len(), 1);
        let marker = &markers[0];
        assert_eq!(marker.category, "miracle_claims");
        assert_eq!((marker.start, marker.end), (4, 17));
        let span: String = text.chars().skip(marker.start).take(marker.end - marker.start).collect();
        assert_eq!(span, marker.text);
        assert_eq!(marker.severity, Severity::High);
    }

    #[test]
    fn matching_is_case_insensitive_for_both_alphabets() {
        let ru = matcher(Language::Russian);
        assert_eq!(ru.find_markers("ПАНАЦЕЯ от старости")[0].category, "universal");
        let en = matcher(Language::English);
        assert_eq!(en.find_markers("A MIRACLE  Cure!")[0].text, "MIRACLE  Cure");
    }

    #[test]
    fn same_span_can_match_several_patterns() {
        let m = matcher(Language::English);
        let markers = m.find_markers("Try our body cleanse today");
        let detox: Vec<_> = markers.iter().filter(|mk| mk.category == "detox").collect();
        assert_eq!(detox.len(), 2);
        assert_eq!(category_counts(&markers).get("detox"), Some(&2));
    }

    #[test]
    fn category_order_does_not_change_the_marker_set() {
        let catalog = Catalog::builtin();
        let text = "Miracle cure! 100% guaranteed detox in 3 days, the last hope of millions of people.";
        let forward = MarkerMatcher::compile(&catalog, Language::English).unwrap();
        let mut reversed = forward.clone();
        reversed.categories.reverse();
        let key = |markers: Vec<Marker>| -> BTreeSet<(String, usize, usize)> {
            markers
                .into_iter()
                .map(|mk| (mk.category, mk.start, mk.end))
                .collect()
        };
        let a = forward.find_markers(text);
        let b = reversed.find_markers(text);
        assert_eq!(a.len(), b.len());
        assert_eq!(key(a), key(b));
    }

    #[test]
    fn amplifiers_match_whole_words_only() {
        let m = matcher(Language::Russian);
        let found = m.find_amplifiers("Абсолютно безопасно и абсолютное счастье, полностью.");
        let words: Vec<_> = found.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["Абсолютно", "полностью"]);
        assert_eq!(found[0].start, 0);
    }

    #[test]
    fn finds_legitimate_terms() {
        let m = matcher(Language::English);
        let terms = m.find_legitimate_terms("A randomized controlled clinical trial, peer-reviewed.");
        assert_eq!(terms.len(), 3);
    }

    #[test]
    fn invalid_extra_pattern_is_reported() {
        let mut extra = crate::ExtraMarkers::new();
        extra
            .entry(Language::English)
            .or_default()
            .insert("detox".into(), vec!["(unclosed".into()]);
        let catalog = Catalog::builtin().with_extra(&extra);
        let err = MarkerMatcher::compile(&catalog, Language::English).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn char_offsets_map_text_end_to_char_count() {
        let offsets = CharOffsets::new("ёж");
        assert_eq!(offsets.char_index(0), 0);
        assert_eq!(offsets.char_index(2), 1);
        assert_eq!(offsets.char_index(4), 2);
        assert_eq!(offsets.byte_offset(1), 2);
        assert_eq!(offsets.byte_offset(7), 4);
        assert_eq!(offsets.len(), 2);
    }
}
