//! Rule-based detector of pseudoscientific claims in medical texts.
//! Scans text for catalogued lexical markers, scores the overall risk from
//! the marker mix and renders the findings as text, JSON or HTML reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod catalog;
mod error;
pub mod highlight;
pub mod matcher;
pub mod normalize;
pub mod report;
pub mod risk;

pub use catalog::{Catalog, CategoryInfo, CategoryPatterns, ExtraMarkers, Language, Severity};
pub use error::{Error, Result};
pub use highlight::{HighlightStyle, Highlighter, SeverityStyles};
pub use matcher::{category_counts, Marker, MarkerMatcher, TermMatch};
pub use normalize::{
    detect_language, normalize, sentence_split, text_stats, DetectedLanguage, HeuristicSegmenter,
    Normalizer, Segmenter, SegmenterKind, TextStats, UnicodeSegmenter,
};
pub use report::{ReportFormat, ReportRenderer};
pub use risk::{score, RiskLevel, RiskThresholds};

use report::Labels;

/// Top-level configuration for the analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: Language,
    pub detailed: bool,
    pub mask_urls: bool,
    pub mask_emails: bool,
    pub segmenter: SegmenterKind,
    pub highlight: HighlightStyle,
    pub thresholds: RiskThresholds,
    pub extra_markers: ExtraMarkers,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Language::Russian,
            detailed: true,
            mask_urls: true,
            mask_emails: true,
            segmenter: SegmenterKind::Heuristic,
            highlight: HighlightStyle::Ansi,
            thresholds: RiskThresholds::default(),
            extra_markers: ExtraMarkers::new(),
        }
    }
}

/// Outcome of one analysis. Offsets in the detailed lists refer to
/// `normalized_text`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub timestamp: DateTime<Utc>,
    pub language: Language,
    pub language_detected: DetectedLanguage,
    pub language_warning: Option<String>,
    pub text_stats: TextStats,
    pub risk_level: RiskLevel,
    pub markers_count: usize,
    pub category_counts: BTreeMap<String, usize>,
    pub legitimate_terms_count: usize,
    pub amplifiers_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<Vec<Marker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legitimate_terms: Option<Vec<TermMatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplifiers: Option<Vec<TermMatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_text: Option<String>,
}

/// Analyzer owns the compiled patterns for one language and reuses them
/// across texts. It holds no mutable state after construction.
pub struct Analyzer {
    config: Config,
    catalog: Catalog,
    matcher: MarkerMatcher,
    normalizer: Normalizer,
    segmenter: Box<dyn Segmenter>,
    highlighter: Highlighter,
}

impl Analyzer {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_catalog(config, Catalog::builtin())
    }

    /// Builds an analyzer over `catalog` extended with the configured extra
    /// markers.
    pub fn with_catalog(config: Config, catalog: Catalog) -> Result<Self> {
        let catalog = catalog.with_extra(&config.extra_markers);
        catalog.validate()?;
        let matcher = MarkerMatcher::compile(&catalog, config.language)?;
        Ok(Self {
            normalizer: Normalizer {
                mask_urls: config.mask_urls,
                mask_emails: config.mask_emails,
            },
            segmenter: config.segmenter.build(),
            highlighter: Highlighter::for_style(config.highlight),
            matcher,
            catalog,
            config,
        })
    }

    pub fn language(&self) -> Language {
        self.config.language
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn analyze(&self, text: &str) -> Result<AnalysisResult> {
        self.analyze_with(text, self.config.detailed)
    }

    pub fn analyze_with(&self, text: &str, detailed: bool) -> Result<AnalysisResult> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        let language = self.config.language;
        let processed = self.normalizer.normalize(text);
        let language_detected = detect_language(&processed);

        let language_warning = match language_detected.language() {
            Some(detected) if detected != language => {
                log::warn!("text looks {detected}, analyzer is configured for {language}");
                Some(
                    Labels::for_language(language)
                        .language_warning(detected.as_str(), language.as_str()),
                )
            }
            _ => None,
        };

        let markers = self.matcher.find_markers(&processed);
        let legitimate_terms = self.matcher.find_legitimate_terms(&processed);
        let amplifiers = self.matcher.find_amplifiers(&processed);

        let category_counts = category_counts(&markers);
        let risk_level = self.config.thresholds.score(&category_counts, &self.catalog);
        let text_stats = text_stats(&processed, self.segmenter.as_ref());

        log::debug!(
            "found {} markers in {} words, risk {risk_level}",
            markers.len(),
            text_stats.words
        );

        let mut result = AnalysisResult {
            timestamp: Utc::now(),
            language,
            language_detected,
            language_warning,
            text_stats,
            risk_level,
            markers_count: markers.len(),
            category_counts,
            legitimate_terms_count: legitimate_terms.len(),
            amplifiers_count: amplifiers.len(),
            markers: None,
            legitimate_terms: None,
            amplifiers: None,
            highlighted_text: None,
            normalized_text: None,
        };

        if detailed {
            result.highlighted_text = Some(self.highlighter.highlight(&processed, &markers));
            result.markers = Some(markers);
            result.legitimate_terms = Some(legitimate_terms);
            result.amplifiers = Some(amplifiers);
            result.normalized_text = Some(processed);
        }

        Ok(result)
    }

    /// Renders a result in the locale it was produced in.
    pub fn render(&self, result: &AnalysisResult, format: ReportFormat) -> Result<String> {
        ReportRenderer::new(&self.catalog, result.language).render(result, format)
    }
}
