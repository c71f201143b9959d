//! Inline highlighting of marker spans.
//!
//! The text is walked once. Every span opens at its start and closes at its
//! end, both measured in the original text, so no replacement can shift the
//! position of another. Overlapping spans are neither merged nor dropped.

use std::cmp::Reverse;

use console::Style;
use serde::{Deserialize, Serialize};

use crate::{matcher::CharOffsets, Marker, Severity};

/// Inline style of the `highlighted_text` field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightStyle {
    Ansi,
    Bracket,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        HighlightStyle::Ansi
    }
}

/// Console styles keyed by severity.
#[derive(Debug, Clone)]
pub struct SeverityStyles {
    pub high: Style,
    pub medium: Style,
    pub low: Style,
}

impl Default for SeverityStyles {
    fn default() -> Self {
        Self {
            high: Style::new().red().bold().force_styling(true),
            medium: Style::new().yellow().bold().force_styling(true),
            low: Style::new().green().bold().force_styling(true),
        }
    }
}

impl SeverityStyles {
    pub fn for_severity(&self, severity: Severity) -> &Style {
        match severity {
            Severity::High => &self.high,
            Severity::Medium => &self.medium,
            Severity::Low => &self.low,
        }
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Ansi(SeverityStyles),
    Bracket,
    Html,
}

pub const HTML_HIGHLIGHT_STYLE: &str = r#"<style>
.marker-high { background-color: #ffcccc; border-bottom: 2px solid #ff0000; font-weight: bold; }
.marker-medium { background-color: #fff4cc; border-bottom: 2px solid #ff9900; }
.marker-low { background-color: #ccffcc; border-bottom: 2px solid #00cc00; }
pre.highlighted { white-space: pre-wrap; word-wrap: break-word; font-family: 'Courier New', monospace; line-height: 1.6; }
</style>"#;

#[derive(Debug, Clone)]
pub struct Highlighter {
    mode: Mode,
}

impl Highlighter {
    pub fn ansi() -> Self {
        Self::with_styles(SeverityStyles::default())
    }

    pub fn with_styles(styles: SeverityStyles) -> Self {
        Self {
            mode: Mode::Ansi(styles),
        }
    }

    pub fn bracket() -> Self {
        Self {
            mode: Mode::Bracket,
        }
    }

    pub fn html() -> Self {
        Self { mode: Mode::Html }
    }

    pub fn for_style(style: HighlightStyle) -> Self {
        match style {
            HighlightStyle::Ansi => Self::ansi(),
            HighlightStyle::Bracket => Self::bracket(),
        }
    }

    /// Console modes return the text untouched when there are no markers.
    /// HTML mode always returns a `<pre>` block, preceded by the style sheet
    /// when something is highlighted.
    pub fn highlight(&self, text: &str, markers: &[Marker]) -> String {
        if let Mode::Html = self.mode {
            if markers.is_empty() {
                return format!("<pre class=\"highlighted\">{}</pre>", escape_html(text));
            }
            let mut out = String::with_capacity(text.len() * 2 + HTML_HIGHLIGHT_STYLE.len());
            out.push_str(HTML_HIGHLIGHT_STYLE);
            out.push_str("\n<pre class=\"highlighted\">");
            walk(text, markers, |event| self.emit(&mut out, event));
            out.push_str("</pre>");
            return out;
        }
        if markers.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len() * 2);
        walk(text, markers, |event| self.emit(&mut out, event));
        out
    }

    fn emit(&self, out: &mut String, event: Event<'_>) {
        match (&self.mode, event) {
            (Mode::Ansi(styles), Event::Text(run, Some(active))) => {
                out.push_str(
                    &styles
                        .for_severity(active.severity)
                        .apply_to(run)
                        .to_string(),
                );
            }
            (Mode::Ansi(_), Event::Text(run, None)) => out.push_str(run),
            (Mode::Ansi(_), _) => {}
            (Mode::Bracket, Event::Text(run, _)) => out.push_str(run),
            (Mode::Bracket, Event::Open(_) | Event::Close(_)) => out.push_str("**"),
            (Mode::Html, Event::Text(run, _)) => out.push_str(&escape_html(run)),
            (Mode::Html, Event::Open(marker)) => {
                out.push_str(&format!(
                    "<span class=\"marker-{sev}\" data-category=\"{cat}\" data-severity=\"{sev}\">",
                    sev = marker.severity,
                    cat = escape_html(&marker.category),
                ));
            }
            (Mode::Html, Event::Close(_)) => out.push_str("</span>"),
        }
    }
}

enum Event<'a> {
    /// A literal run and the innermost span covering it.
    Text(&'a str, Option<&'a Marker>),
    Open(&'a Marker),
    Close(&'a Marker),
}

struct Span<'a> {
    start: usize,
    end: usize,
    marker: &'a Marker,
}

/// Emits literal runs, opens and closes in text order. At one position
/// closes come before opens, longer spans open first, and spans close in
/// reverse order of opening.
fn walk<'a>(text: &'a str, markers: &'a [Marker], mut emit: impl FnMut(Event<'a>)) {
    let offsets = CharOffsets::new(text);
    let char_len = offsets.len();
    let spans: Vec<Span<'a>> = markers
        .iter()
        .filter_map(|marker| {
            let end = marker.end.min(char_len);
            (marker.start < end).then_some(Span {
                start: marker.start,
                end,
                marker,
            })
        })
        .collect();

    let mut opens: Vec<usize> = (0..spans.len()).collect();
    opens.sort_by_key(|&i| (spans[i].start, Reverse(spans[i].end), i));
    let mut rank = vec![0; spans.len()];
    for (order, &i) in opens.iter().enumerate() {
        rank[i] = order;
    }
    let mut closes = opens.clone();
    closes.sort_by_key(|&i| (spans[i].end, Reverse(rank[i])));

    let mut active: Vec<usize> = Vec::new();
    let (mut next_open, mut next_close) = (0, 0);
    let mut cursor = 0;
    loop {
        let open_at = opens.get(next_open).map(|&i| spans[i].start);
        let close_at = closes.get(next_close).map(|&i| spans[i].end);
        let pos = match (open_at, close_at) {
            (None, None) => break,
            (Some(o), Some(c)) => o.min(c),
            (Some(o), None) => o,
            (None, Some(c)) => c,
        };
        if pos > cursor {
            let run = &text[offsets.byte_offset(cursor)..offsets.byte_offset(pos)];
            emit(Event::Text(run, active.last().map(|&i| spans[i].marker)));
            cursor = pos;
        }
        if close_at == Some(pos) {
            let i = closes[next_close];
            active.retain(|&a| a != i);
            emit(Event::Close(spans[i].marker));
            next_close += 1;
        } else {
            let i = opens[next_open];
            active.push(i);
            emit(Event::Open(spans[i].marker));
            next_open += 1;
        }
    }
    if cursor < char_len {
        emit(Event::Text(&text[offsets.byte_offset(cursor)..], None));
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(category: &str, start: usize, end: usize, severity: Severity) -> Marker {
        Marker {
            category: category.into(),
            text: String::new(),
            start,
            end,
            severity,
            description_ru: String::new(),
            description_en: String::new(),
        }
    }

    #[test]
    fn no_markers_returns_text_verbatim() {
        let text = "Пейте воду  и спите.";
        assert_eq!(Highlighter::ansi().highlight(text, &[]), text);
        assert_eq!(Highlighter::bracket().highlight(text, &[]), text);
    }

    #[test]
    fn html_without_markers_is_wrapped() {
        assert_eq!(
            Highlighter::html().highlight("a < b", &[]),
            "<pre class=\"highlighted\">a &lt; b</pre>"
        );
    }

    #[test]
    fn later_spans_do_not_shift_earlier_ones() {
        let text = "aaaaa bbbb ccccc dd";
        let markers = vec![
            marker("x", 10, 15, Severity::High),
            marker("y", 0, 5, Severity::Low),
        ];
        let out = Highlighter::bracket().highlight(text, &markers);
        assert_eq!(out, "**aaaaa** bbbb** cccc**c dd");
    }

    #[test]
    fn adjacent_spans_close_before_opening() {
        let markers = vec![
            marker("x", 0, 3, Severity::High),
            marker("y", 3, 6, Severity::Medium),
        ];
        assert_eq!(
            Highlighter::bracket().highlight("abcdef", &markers),
            "**abc****def**"
        );
    }

    #[test]
    fn nested_spans_produce_nested_markup() {
        let markers = vec![
            marker("inner", 2, 4, Severity::Medium),
            marker("outer", 0, 6, Severity::High),
        ];
        let out = Highlighter::html().highlight("abcdef", &markers);
        assert!(out.ends_with(
            "<pre class=\"highlighted\"><span class=\"marker-high\" data-category=\"outer\" data-severity=\"high\">ab\
             <span class=\"marker-medium\" data-category=\"inner\" data-severity=\"medium\">cd</span>ef</span></pre>"
        ));
        assert!(out.starts_with("<style>"));
    }

    #[test]
    fn identical_spans_are_each_wrapped() {
        let markers = vec![
            marker("x", 1, 3, Severity::Low),
            marker("y", 1, 3, Severity::Low),
        ];
        assert_eq!(
            Highlighter::bracket().highlight("abcd", &markers),
            "a****bc****d"
        );
    }

    #[test]
    fn ansi_output_strips_back_to_the_text() {
        let text = "Это чудо-средство за 3 дня";
        let markers = vec![
            marker("miracle_claims", 4, 17, Severity::High),
            marker("fast_results", 18, 26, Severity::Medium),
        ];
        let out = Highlighter::ansi().highlight(text, &markers);
        assert_ne!(out, text);
        assert!(out.contains('\u{1b}'));
        assert_eq!(console::strip_ansi_codes(&out), text);
    }

    #[test]
    fn out_of_range_and_empty_spans_are_ignored() {
        let markers = vec![
            marker("x", 2, 2, Severity::High),
            marker("y", 3, 99, Severity::High),
            marker("z", 10, 12, Severity::High),
        ];
        assert_eq!(Highlighter::bracket().highlight("abcde", &markers), "abc**de**");
    }

    #[test]
    fn escapes_html_text() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
