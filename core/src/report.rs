//! Plain-text, JSON and HTML renderings of an [`AnalysisResult`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    highlight::{escape_html, Highlighter},
    AnalysisResult, Catalog, Error, Language, Marker, Result, RiskLevel,
};

/// Output format of a report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
    Html,
}

impl Default for ReportFormat {
    fn default() -> Self {
        ReportFormat::Text
    }
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown names are rejected rather than falling back to text.
impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain" | "txt" => Ok(ReportFormat::Text),
            "json" | "structured" => Ok(ReportFormat::Json),
            "html" | "markup" => Ok(ReportFormat::Html),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

struct Recommendation {
    headline: &'static str,
    body: &'static [&'static str],
    bullets: &'static [&'static str],
}

/// Report strings for one locale.
pub(crate) struct Labels {
    title: &'static str,
    analysis_time: &'static str,
    detected_language: &'static str,
    stats_heading: &'static str,
    chars: &'static str,
    chars_no_spaces: &'static str,
    words: &'static str,
    sentences: &'static str,
    avg_sentence_length: &'static str,
    words_unit: &'static str,
    risk_heading: &'static str,
    risk_names: [&'static str; 4],
    markers_found: &'static str,
    by_category: &'static str,
    severity: &'static str,
    legitimate_terms: &'static str,
    amplifiers: &'static str,
    details_heading: &'static str,
    category: &'static str,
    description: &'static str,
    recommendations_heading: &'static str,
    highlighted_heading: &'static str,
    warning_detected: &'static str,
    warning_configured: &'static str,
    recommend_high: Recommendation,
    recommend_medium: Recommendation,
    recommend_low: Recommendation,
}

static LABELS_RU: Labels = Labels {
    title: "ОТЧЁТ АНАЛИЗА МЕДИЦИНСКОГО ТЕКСТА НА ПСЕВДОНАУКУ",
    analysis_time: "Время анализа",
    detected_language: "Обнаруженный язык",
    stats_heading: "СТАТИСТИКА ТЕКСТА",
    chars: "Символов",
    chars_no_spaces: "Символов без пробелов",
    words: "Слов",
    sentences: "Предложений",
    avg_sentence_length: "Средняя длина предложения",
    words_unit: "слов",
    risk_heading: "УРОВЕНЬ РИСКА",
    risk_names: ["НИЗКИЙ", "СРЕДНИЙ", "ВЫСОКИЙ", "КРИТИЧЕСКИЙ"],
    markers_found: "НАЙДЕНО ПСЕВДОНАУЧНЫХ МАРКЕРОВ",
    by_category: "По категориям",
    severity: "серьёзность",
    legitimate_terms: "Легитимных медицинских терминов",
    amplifiers: "Слов-амплификаторов",
    details_heading: "ДЕТАЛЬНАЯ ИНФОРМАЦИЯ О НАЙДЕННЫХ МАРКЕРАХ",
    category: "Категория",
    description: "Описание",
    recommendations_heading: "РЕКОМЕНДАЦИИ",
    highlighted_heading: "Текст с подсветкой",
    warning_detected: "Внимание: обнаружен язык",
    warning_configured: "но анализатор настроен на",
    recommend_high: Recommendation {
        headline: "⚠️  ВНИМАНИЕ! Текст содержит множество признаков псевдонаучной информации.",
        body: &["Рекомендуется:"],
        bullets: &[
            "Проверить источники информации",
            "Обратиться к квалифицированным специалистам",
            "Искать подтверждения в рецензируемых исследованиях",
        ],
    },
    recommend_medium: Recommendation {
        headline: "⚠️  Текст содержит некоторые признаки псевдонаучной информации.",
        body: &["Рекомендуется проявить критическое мышление и проверить факты."],
        bullets: &[],
    },
    recommend_low: Recommendation {
        headline: "✅ Текст не содержит значительных признаков псевдонауки.",
        body: &["Однако всегда полезно проверять источники информации."],
        bullets: &[],
    },
};

static LABELS_EN: Labels = Labels {
    title: "MEDICAL TEXT PSEUDOSCIENCE ANALYSIS REPORT",
    analysis_time: "Analysis time",
    detected_language: "Detected language",
    stats_heading: "TEXT STATISTICS",
    chars: "Characters",
    chars_no_spaces: "Characters without spaces",
    words: "Words",
    sentences: "Sentences",
    avg_sentence_length: "Average sentence length",
    words_unit: "words",
    risk_heading: "RISK LEVEL",
    risk_names: ["LOW", "MEDIUM", "HIGH", "CRITICAL"],
    markers_found: "PSEUDOSCIENCE MARKERS FOUND",
    by_category: "By category",
    severity: "severity",
    legitimate_terms: "Legitimate medical terms",
    amplifiers: "Amplifier words",
    details_heading: "MARKER DETAILS",
    category: "Category",
    description: "Description",
    recommendations_heading: "RECOMMENDATIONS",
    highlighted_heading: "Highlighted text",
    warning_detected: "Warning: detected language",
    warning_configured: "but the analyzer is configured for",
    recommend_high: Recommendation {
        headline: "⚠️  WARNING! The text shows many signs of pseudoscientific information.",
        body: &["Recommended:"],
        bullets: &[
            "Check the sources of the information",
            "Consult qualified specialists",
            "Look for confirmation in peer-reviewed research",
        ],
    },
    recommend_medium: Recommendation {
        headline: "⚠️  The text shows some signs of pseudoscientific information.",
        body: &["Apply critical thinking and verify the facts."],
        bullets: &[],
    },
    recommend_low: Recommendation {
        headline: "✅ The text shows no significant signs of pseudoscience.",
        body: &["Checking the sources of information is still worthwhile."],
        bullets: &[],
    },
};

impl Labels {
    pub(crate) fn for_language(language: Language) -> &'static Labels {
        match language {
            Language::Russian => &LABELS_RU,
            Language::English => &LABELS_EN,
        }
    }

    pub(crate) fn language_warning(&self, detected: &str, configured: &str) -> String {
        format!(
            "{} '{detected}', {} '{configured}'",
            self.warning_detected, self.warning_configured
        )
    }

    fn risk_name(&self, level: RiskLevel) -> &'static str {
        match level {
            RiskLevel::Low => self.risk_names[0],
            RiskLevel::Medium => self.risk_names[1],
            RiskLevel::High => self.risk_names[2],
            RiskLevel::Critical => self.risk_names[3],
        }
    }

    fn recommendation(&self, level: RiskLevel) -> &Recommendation {
        match level {
            RiskLevel::High | RiskLevel::Critical => &self.recommend_high,
            RiskLevel::Medium => &self.recommend_medium,
            RiskLevel::Low => &self.recommend_low,
        }
    }
}

fn risk_icon(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "✅",
        RiskLevel::Medium => "⚠️",
        RiskLevel::High => "⚠️⚠️",
        RiskLevel::Critical => "🚨",
    }
}

fn risk_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "#28a745",
        RiskLevel::Medium => "#ffc107",
        RiskLevel::High => "#fd7e14",
        RiskLevel::Critical => "#dc3545",
    }
}

const SEVERITY_UNKNOWN: &str = "unknown";
const RULE: &str = "======================================================================";

/// Display data for a category id, with the id itself standing in for
/// missing metadata.
struct CategoryLabel<'a> {
    name: &'a str,
    severity: &'static str,
    description: &'a str,
}

/// Renders analysis results using catalog metadata for labels.
pub struct ReportRenderer<'a> {
    catalog: &'a Catalog,
    language: Language,
    labels: &'static Labels,
}

impl<'a> ReportRenderer<'a> {
    pub fn new(catalog: &'a Catalog, language: Language) -> Self {
        Self {
            catalog,
            language,
            labels: Labels::for_language(language),
        }
    }

    pub fn render(&self, result: &AnalysisResult, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text(result)),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            ReportFormat::Html => Ok(self.render_html(result)),
        }
    }

    fn category_label<'b>(&'b self, id: &'b str) -> CategoryLabel<'b> {
        match self.catalog.category(id) {
            Some(info) => CategoryLabel {
                name: info.name(self.language),
                severity: info.severity.as_str(),
                description: info.description(self.language),
            },
            None => CategoryLabel {
                name: id,
                severity: SEVERITY_UNKNOWN,
                description: "",
            },
        }
    }

    fn marker_description<'b>(&self, marker: &'b Marker) -> &'b str {
        match self.language {
            Language::Russian => &marker.description_ru,
            Language::English => &marker.description_en,
        }
    }

    /// Category counts, largest first; ties keep id order.
    fn sorted_counts<'b>(&self, result: &'b AnalysisResult) -> Vec<(&'b String, usize)> {
        let mut counts: Vec<_> = result
            .category_counts
            .iter()
            .map(|(category, count)| (category, *count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    pub fn render_text(&self, result: &AnalysisResult) -> String {
        let l = self.labels;
        let mut lines: Vec<String> = Vec::new();
        lines.push(RULE.into());
        lines.push(l.title.into());
        lines.push(RULE.into());
        lines.push(String::new());

        lines.push(format!("{}: {}", l.analysis_time, result.timestamp.to_rfc3339()));
        lines.push(format!("{}: {}", l.detected_language, result.language_detected));
        if let Some(warning) = &result.language_warning {
            lines.push(format!("⚠️  {warning}"));
        }
        lines.push(String::new());

        let stats = &result.text_stats;
        lines.push(format!("{}:", l.stats_heading));
        lines.push(format!("  • {}: {}", l.chars, stats.chars));
        lines.push(format!("  • {}: {}", l.chars_no_spaces, stats.chars_no_spaces));
        lines.push(format!("  • {}: {}", l.words, stats.words));
        lines.push(format!("  • {}: {}", l.sentences, stats.sentences));
        lines.push(format!(
            "  • {}: {:.1} {}",
            l.avg_sentence_length, stats.avg_sentence_length, l.words_unit
        ));
        lines.push(String::new());

        lines.push(format!(
            "{}: {} {}",
            l.risk_heading,
            risk_icon(result.risk_level),
            l.risk_name(result.risk_level)
        ));
        lines.push(String::new());

        lines.push(format!("{}: {}", l.markers_found, result.markers_count));
        if !result.category_counts.is_empty() {
            lines.push(String::new());
            lines.push(format!("{}:", l.by_category));
            for (category, count) in self.sorted_counts(result) {
                let label = self.category_label(category);
                lines.push(format!(
                    "  • {}: {} ({}: {})",
                    label.name, count, l.severity, label.severity
                ));
            }
        }
        lines.push(String::new());
        lines.push(format!("{}: {}", l.legitimate_terms, result.legitimate_terms_count));
        lines.push(format!("{}: {}", l.amplifiers, result.amplifiers_count));
        lines.push(String::new());

        if let Some(markers) = result.markers.as_ref().filter(|m| !m.is_empty()) {
            lines.push(RULE.into());
            lines.push(format!("{}:", l.details_heading));
            lines.push(RULE.into());
            lines.push(String::new());
            for (idx, marker) in markers.iter().enumerate() {
                let label = self.category_label(&marker.category);
                let description = self.marker_description(marker);
                lines.push(format!("{}. «{}»", idx + 1, marker.text));
                lines.push(format!("   {}: {}", l.category, label.name));
                lines.push(format!("   {}: {}", capitalize(l.severity), marker.severity));
                lines.push(format!("   {}: {}", l.description, description));
                lines.push(String::new());
            }
        }

        lines.push(RULE.into());
        lines.push(format!("{}:", l.recommendations_heading));
        lines.push(RULE.into());
        lines.push(String::new());
        let rec = l.recommendation(result.risk_level);
        lines.push(rec.headline.into());
        for line in rec.body {
            lines.push((*line).into());
        }
        for bullet in rec.bullets {
            lines.push(format!("  • {bullet}"));
        }
        lines.push(String::new());
        lines.push(RULE.into());

        lines.join("\n")
    }

    pub fn render_html(&self, result: &AnalysisResult) -> String {
        let l = self.labels;
        let color = risk_color(result.risk_level);
        let mut html = String::new();

        html.push_str(&format!(
            r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; max-width: 1200px; margin: 0 auto; padding: 20px; background-color: #f5f5f5; }}
.container {{ background: white; padding: 30px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
h1 {{ color: #333; border-bottom: 3px solid {color}; padding-bottom: 10px; }}
h2 {{ color: #555; margin-top: 30px; }}
.risk-level {{ font-size: 24px; font-weight: bold; color: {color}; padding: 15px; background: {color}22; border-left: 5px solid {color}; border-radius: 5px; margin: 20px 0; }}
.warning {{ background: #fff3cd; padding: 10px; border-radius: 5px; }}
.stats {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 15px; margin: 20px 0; }}
.stat-card {{ padding: 15px; background: #f8f9fa; border-radius: 5px; border-left: 3px solid #007bff; }}
.stat-value {{ font-size: 28px; font-weight: bold; color: #007bff; }}
.stat-label {{ color: #666; font-size: 14px; }}
.category-list {{ list-style: none; padding: 0; }}
.category-item {{ padding: 10px; margin: 5px 0; background: #f8f9fa; border-radius: 5px; }}
.severity-high {{ border-left: 4px solid #dc3545; }}
.severity-medium {{ border-left: 4px solid #ffc107; }}
.severity-low {{ border-left: 4px solid #28a745; }}
.severity-unknown {{ border-left: 4px solid #6c757d; }}
.marker {{ margin: 10px 0; padding: 10px; background: #fff3cd; border-radius: 5px; }}
.recommendations {{ background: #e7f3ff; padding: 20px; border-radius: 5px; border-left: 5px solid #007bff; }}
</style>
</head>
<body>
<div class="container">
<h1>{title}</h1>
<div class="risk-level">{risk_heading}: {icon} {risk_name}</div>
"#,
            lang = match self.language {
                Language::Russian => "ru",
                Language::English => "en",
            },
            title = escape_html(l.title),
            color = color,
            risk_heading = escape_html(l.risk_heading),
            icon = risk_icon(result.risk_level),
            risk_name = escape_html(l.risk_name(result.risk_level)),
        ));

        html.push_str(&format!(
            "<p>{}: {}</p>\n",
            escape_html(l.detected_language),
            result.language_detected
        ));
        if let Some(warning) = &result.language_warning {
            html.push_str(&format!("<p class=\"warning\">⚠️ {}</p>\n", escape_html(warning)));
        }

        html.push_str(&format!("<h2>{}</h2>\n<div class=\"stats\">\n", escape_html(l.stats_heading)));
        let stats = &result.text_stats;
        let cards = [
            (result.markers_count.to_string(), l.markers_found),
            (stats.words.to_string(), l.words),
            (stats.sentences.to_string(), l.sentences),
            (format!("{:.1}", stats.avg_sentence_length), l.avg_sentence_length),
            (stats.chars.to_string(), l.chars),
            (stats.chars_no_spaces.to_string(), l.chars_no_spaces),
            (result.legitimate_terms_count.to_string(), l.legitimate_terms),
            (result.amplifiers_count.to_string(), l.amplifiers),
        ];
        for (value, label) in cards {
            html.push_str(&format!(
                "<div class=\"stat-card\"><div class=\"stat-value\">{value}</div><div class=\"stat-label\">{}</div></div>\n",
                escape_html(label)
            ));
        }
        html.push_str("</div>\n");

        html.push_str(&format!(
            "<h2>{}</h2>\n<ul class=\"category-list\">\n",
            escape_html(l.by_category)
        ));
        for (category, count) in self.sorted_counts(result) {
            let label = self.category_label(category);
            html.push_str(&format!(
                "<li class=\"category-item severity-{sev}\"><strong>{name}</strong>: {count}<br><small>{desc}</small></li>\n",
                sev = label.severity,
                name = escape_html(label.name),
                desc = escape_html(label.description),
            ));
        }
        html.push_str("</ul>\n");

        if let (Some(text), Some(markers)) = (&result.normalized_text, &result.markers) {
            html.push_str(&format!("<h2>{}</h2>\n", escape_html(l.highlighted_heading)));
            html.push_str(&Highlighter::html().highlight(text, markers));
            html.push('\n');
            if !markers.is_empty() {
                html.push_str(&format!("<h2>{}</h2>\n", escape_html(&capitalize(l.details_heading))));
                for marker in markers {
                    let label = self.category_label(&marker.category);
                    html.push_str(&format!(
                        "<div class=\"marker severity-{sev}\">«{text}» <small>{name} ({sev})</small><br><small>{desc_label}: {desc}</small></div>\n",
                        sev = marker.severity,
                        text = escape_html(&marker.text),
                        name = escape_html(label.name),
                        desc_label = escape_html(l.description),
                        desc = escape_html(self.marker_description(marker)),
                    ));
                }
            }
        }

        let rec = l.recommendation(result.risk_level);
        html.push_str(&format!(
            "<div class=\"recommendations\">\n<h2>{}</h2>\n<p><strong>{}</strong></p>\n",
            escape_html(l.recommendations_heading),
            escape_html(rec.headline)
        ));
        for line in rec.body {
            html.push_str(&format!("<p>{}</p>\n", escape_html(line)));
        }
        if !rec.bullets.is_empty() {
            html.push_str("<ul>\n");
            for bullet in rec.bullets {
                html.push_str(&format!("<li>{}</li>\n", escape_html(bullet)));
            }
            html.push_str("</ul>\n");
        }
        html.push_str("</div>\n");

        html.push_str(&format!(
            "<p style=\"text-align: center; color: #999; margin-top: 40px;\"><small>{}: {}</small></p>\n</div>\n</body>\n</html>\n",
            escape_html(l.analysis_time),
            result.timestamp.to_rfc3339()
        ));
        html
    }
}

/// Uppercases the first letter and lowercases the rest.
fn capitalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
