use medcheck_core::{
    AnalysisResult, Analyzer, Config, DetectedLanguage, Error, Language, ReportFormat, RiskLevel,
    Severity,
};

fn analyzer(language: Language) -> Analyzer {
    Analyzer::new(Config {
        language,
        ..Config::default()
    })
    .unwrap()
}

fn analyze(language: Language, text: &str) -> AnalysisResult {
    analyzer(language).analyze(text).unwrap()
}

fn assert_has(result: &AnalysisResult, category: &str) {
    assert!(
        result.category_counts.contains_key(category),
        "expected category {category}, got counts: {:#?}",
        result.category_counts
    );
}

#[test]
fn flags_russian_miracle_cure_advert() {
    let result = analyze(
        Language::Russian,
        "Это чудо-средство даёт 100% гарантию излечения за 3 дня",
    );
    assert_has(&result, "miracle_claims");
    assert_has(&result, "guarantees");
    assert_has(&result, "fast_results");
    assert!(result.markers_count >= 3);
    assert_eq!(
        result.category_counts.values().sum::<usize>(),
        result.markers_count
    );
    for marker in result.markers.as_ref().unwrap() {
        assert!(matches!(marker.severity, Severity::High | Severity::Medium));
    }
    assert!(result.risk_level >= RiskLevel::High);
    assert_eq!(result.language_detected, DetectedLanguage::Russian);
    assert!(result.language_warning.is_none());
}

#[test]
fn clean_text_scores_low() {
    let result = analyze(Language::Russian, "Пейте больше воды и высыпайтесь.");
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert!(result.category_counts.is_empty());
    assert_eq!(result.markers_count, 0);
    assert_eq!(result.markers.as_deref(), Some(&[][..]));
    assert_eq!(
        result.highlighted_text.as_deref(),
        Some("Пейте больше воды и высыпайтесь.")
    );
}

#[test]
fn many_high_severity_claims_are_critical() {
    let result = analyze(
        Language::English,
        "This miracle cure offers guaranteed results in 7 days. Ancient wisdom hidden by doctors! Thousands satisfied.",
    );
    for category in ["miracle_claims", "guarantees", "fast_results", "unproven", "testimonials"] {
        assert_has(&result, category);
    }
    assert_eq!(result.category_counts.get("unproven"), Some(&2));
    assert_eq!(result.risk_level, RiskLevel::Critical);
    assert_eq!(result.text_stats.sentences, 3);
}

#[test]
fn evidence_language_is_counted_but_not_scored() {
    let result = analyze(
        Language::English,
        "A randomized controlled clinical trial and a systematic review were absolutely clear.",
    );
    assert_eq!(result.legitimate_terms_count, 3);
    assert_eq!(result.amplifiers_count, 1);
    assert_eq!(result.markers_count, 0);
    assert_eq!(result.risk_level, RiskLevel::Low);
}

#[test]
fn emails_and_urls_do_not_leak_into_matches() {
    let result = analyze(
        Language::English,
        "Write to detox@cleanse.com or visit https://detox.example/cleanse today.",
    );
    assert_eq!(result.markers_count, 0);
    assert_eq!(
        result.normalized_text.as_deref(),
        Some("Write to [EMAIL] or visit [URL] today.")
    );
}

#[test]
fn json_report_round_trips_full_result() {
    let a = analyzer(Language::Russian);
    let result = a
        .analyze("Детокс и очищение организма: чудодейственная панацея от всех болезней!")
        .unwrap();
    let json = a.render(&result, ReportFormat::Json).unwrap();
    let back: AnalysisResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
    assert!(json.contains("\"risk_level\": \"critical\""));
}

#[test]
fn json_report_keeps_fractional_sentence_average_exact() {
    let a = analyzer(Language::English);
    let result = a
        .analyze(
            "Drink water. Sleep well. Walk daily. Eat greens. Rest often. Stretch gently. \
             Breathe deeply. Visit your doctor. Read the label. Ask a pharmacist. Take your time.",
        )
        .unwrap();
    assert_eq!(result.text_stats.words, 26);
    assert_eq!(result.text_stats.sentences, 11);
    assert_eq!(result.text_stats.avg_sentence_length, 26.0 / 11.0);
    let json = a.render(&result, ReportFormat::Json).unwrap();
    let back: AnalysisResult = serde_json::from_str(&json).unwrap();
    assert_eq!(
        back.text_stats.avg_sentence_length.to_bits(),
        result.text_stats.avg_sentence_length.to_bits()
    );
    assert_eq!(back, result);
}

#[test]
fn text_and_html_reports_follow_analyzer_language() {
    let a = analyzer(Language::English);
    let result = a.analyze("Try this all-natural detox cleanse.").unwrap();
    let text = a.render(&result, ReportFormat::Text).unwrap();
    assert!(text.contains("MEDICAL TEXT PSEUDOSCIENCE ANALYSIS REPORT"));
    assert!(text.contains("Detox myths: 2 (severity: medium)"));
    assert!(text.contains("RISK LEVEL: ⚠️ MEDIUM"));
    let html = a.render(&result, ReportFormat::Html).unwrap();
    assert!(html.contains("<html lang=\"en\">"));
    assert!(html.contains("data-category=\"natural\""));
}

#[test]
fn unsupported_names_are_rejected() {
    assert!(matches!(
        "docx".parse::<ReportFormat>(),
        Err(Error::UnsupportedFormat(_))
    ));
    assert!(matches!(
        "klingon".parse::<Language>(),
        Err(Error::UnsupportedLanguage(_))
    ));
}

#[test]
fn analyzer_is_shared_across_threads() {
    let a = analyzer(Language::English);
    let texts = ["miracle cure", "panacea", "drink water"];
    let counts: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = texts
            .iter()
            .map(|text| {
                let a = &a;
                scope.spawn(move || a.analyze(text).unwrap().markers_count)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(counts, vec![1, 1, 0]);
}
