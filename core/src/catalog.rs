//! Static marker catalog: pattern tables per language, category metadata,
//! evidence-language terms and amplifier words.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Languages the catalog ships tables for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Russian,
    English,
}

impl Default for Language {
    fn default() -> Self {
        Language::Russian
    }
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Russian, Language::English];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Russian => "russian",
            Language::English => "english",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "russian" | "ru" => Ok(Language::Russian),
            "english" | "en" => Ok(Language::English),
            other => Err(Error::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Qualitative weight of a category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display metadata for one risk category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInfo {
    pub id: String,
    pub name_ru: String,
    pub name_en: String,
    pub severity: Severity,
    pub description_ru: String,
    pub description_en: String,
}

impl CategoryInfo {
    pub fn name(&self, language: Language) -> &str {
        match language {
            Language::Russian => &self.name_ru,
            Language::English => &self.name_en,
        }
    }

    pub fn description(&self, language: Language) -> &str {
        match language {
            Language::Russian => &self.description_ru,
            Language::English => &self.description_en,
        }
    }
}

/// Ordered pattern sources for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPatterns {
    pub category: String,
    pub patterns: Vec<String>,
}

/// Extra marker patterns keyed by language, then category.
pub type ExtraMarkers = BTreeMap<Language, BTreeMap<String, Vec<String>>>;

/// Immutable catalog of marker tables.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<CategoryInfo>,
    markers: BTreeMap<Language, Vec<CategoryPatterns>>,
    legitimate_terms: BTreeMap<Language, Vec<String>>,
    amplifiers: BTreeMap<Language, Vec<String>>,
}

impl Catalog {
    /// Catalog built from the tables compiled into the crate.
    pub fn builtin() -> Self {
        let categories = CATEGORIES
            .iter()
            .map(|c| CategoryInfo {
                id: c.id.into(),
                name_ru: c.name_ru.into(),
                name_en: c.name_en.into(),
                severity: c.severity,
                description_ru: c.description_ru.into(),
                description_en: c.description_en.into(),
            })
            .collect();

        let mut markers = BTreeMap::new();
        markers.insert(Language::Russian, owned_table(MARKERS_RU));
        markers.insert(Language::English, owned_table(MARKERS_EN));

        let mut legitimate_terms = BTreeMap::new();
        legitimate_terms.insert(Language::Russian, owned_list(LEGITIMATE_RU));
        legitimate_terms.insert(Language::English, owned_list(LEGITIMATE_EN));

        let mut amplifiers = BTreeMap::new();
        amplifiers.insert(Language::Russian, owned_list(AMPLIFIERS_RU));
        amplifiers.insert(Language::English, owned_list(AMPLIFIERS_EN));

        Self {
            categories,
            markers,
            legitimate_terms,
            amplifiers,
        }
    }

    /// Appends extra patterns after the existing ones of each category.
    /// Unknown categories are added as new entries and rejected by [`Catalog::validate`].
    pub fn with_extra(mut self, extra: &ExtraMarkers) -> Self {
        for (language, categories) in extra {
            let table = self.markers.entry(*language).or_default();
            for (category, patterns) in categories {
                let patterns = patterns
                    .iter()
                    .map(|p| p.trim())
                    .filter(|p| !p.is_empty())
                    .map(String::from);
                match table.iter_mut().find(|entry| &entry.category == category) {
                    Some(entry) => entry.patterns.extend(patterns),
                    None => table.push(CategoryPatterns {
                        category: category.clone(),
                        patterns: patterns.collect(),
                    }),
                }
            }
        }
        self
    }

    /// Every category referenced by a pattern table must have metadata.
    pub fn validate(&self) -> Result<()> {
        for (language, table) in &self.markers {
            for entry in table {
                if self.category(&entry.category).is_none() {
                    return Err(Error::UnknownCategory {
                        language: *language,
                        category: entry.category.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn patterns_for(&self, language: Language) -> Result<&[CategoryPatterns]> {
        self.markers
            .get(&language)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnsupportedLanguage(language.to_string()))
    }

    pub fn category(&self, id: &str) -> Option<&CategoryInfo> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn categories(&self) -> &[CategoryInfo] {
        &self.categories
    }

    pub fn legitimate_terms_for(&self, language: Language) -> &[String] {
        self.legitimate_terms
            .get(&language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn amplifiers_for(&self, language: Language) -> &[String] {
        self.amplifiers
            .get(&language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[cfg(test)]
    pub(crate) fn without_language(mut self, language: Language) -> Self {
        self.markers.remove(&language);
        self.legitimate_terms.remove(&language);
        self.amplifiers.remove(&language);
        self
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin()
    }
}

fn owned_table(table: &[(&str, &[&str])]) -> Vec<CategoryPatterns> {
    table
        .iter()
        .map(|(category, patterns)| CategoryPatterns {
            category: (*category).into(),
            patterns: owned_list(patterns),
        })
        .collect()
}

fn owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

struct StaticCategory {
    id: &'static str,
    name_ru: &'static str,
    name_en: &'static str,
    severity: Severity,
    description_ru: &'static str,
    description_en: &'static str,
}

const CATEGORIES: &[StaticCategory] = &[
    StaticCategory {
        id: "miracle_claims",
        name_ru: "Чудодейственные утверждения",
        name_en: "Miracle claims",
        severity: Severity::High,
        description_ru: "Необоснованные обещания чудесного исцеления",
        description_en: "Unsubstantiated promises of miraculous healing",
    },
    StaticCategory {
        id: "guarantees",
        name_ru: "Абсолютные гарантии",
        name_en: "Absolute guarantees",
        severity: Severity::High,
        description_ru: "100% гарантии результата без доказательств",
        description_en: "100% result guarantees without evidence",
    },
    StaticCategory {
        id: "detox",
        name_ru: "Детокс-мифы",
        name_en: "Detox myths",
        severity: Severity::Medium,
        description_ru: "Необоснованные утверждения об очищении организма",
        description_en: "Unsubstantiated cleansing claims",
    },
    StaticCategory {
        id: "energy",
        name_ru: "Энергетические псевдоконцепции",
        name_en: "Energy pseudoconcepts",
        severity: Severity::High,
        description_ru: "Ссылки на несуществующие энергетические поля",
        description_en: "References to non-existent energy fields",
    },
    StaticCategory {
        id: "natural",
        name_ru: "Натуральность как гарантия",
        name_en: "Natural as guarantee",
        severity: Severity::Low,
        description_ru: "Ошибочное представление о безопасности натурального",
        description_en: "Misconception about natural safety",
    },
    StaticCategory {
        id: "fast_results",
        name_ru: "Мгновенные результаты",
        name_en: "Instant results",
        severity: Severity::Medium,
        description_ru: "Нереалистичные сроки лечения",
        description_en: "Unrealistic treatment timeframes",
    },
    StaticCategory {
        id: "universal",
        name_ru: "Универсальные средства",
        name_en: "Universal remedies",
        severity: Severity::High,
        description_ru: "Утверждения о лечении всех болезней",
        description_en: "Claims of curing all diseases",
    },
    StaticCategory {
        id: "unproven",
        name_ru: "Непризнанные методы",
        name_en: "Unproven methods",
        severity: Severity::High,
        description_ru: "Ссылки на секретные или непризнанные методы",
        description_en: "References to secret or unrecognized methods",
    },
    StaticCategory {
        id: "emotional",
        name_ru: "Эмоциональная манипуляция",
        name_en: "Emotional manipulation",
        severity: Severity::High,
        description_ru: "Давление на эмоции и страхи пациентов",
        description_en: "Pressure on patient emotions and fears",
    },
    StaticCategory {
        id: "testimonials",
        name_ru: "Массовые отзывы",
        name_en: "Mass testimonials",
        severity: Severity::Medium,
        description_ru: "Необоснованные утверждения о массовой эффективности",
        description_en: "Unsubstantiated mass efficacy claims",
    },
];

const MARKERS_RU: &[(&str, &[&str])] = &[
    (
        "miracle_claims",
        &[
            r"чудо[-\s]?средство",
            r"чудо[-\s]?препарат",
            r"чудодейственн\w+",
            r"волшебн\w+ эффект",
            r"магическ\w+ формула",
            r"революционн\w+ прорыв",
            r"сенсационн\w+ открытие",
        ],
    ),
    (
        "guarantees",
        &[
            r"100%\s*гаранти\w+",
            r"абсолютн\w+ гаранти\w+",
            r"гарантирован\w+ результат",
            r"гарантирован\w+ излечение",
            r"полностью излечива\w+",
            r"навсегда избав\w+",
        ],
    ),
    (
        "detox",
        &[
            r"детокс",
            r"очищение организма",
            r"вывод токсинов",
            r"шлак\w+",
            r"чистка организма",
            r"очистка от токсинов",
        ],
    ),
    (
        "energy",
        &[
            r"энергетическ\w+ поле",
            r"биоэнергетика",
            r"квантов\w+ энергия",
            r"космическ\w+ энергия",
            r"энергетическ\w+ баланс",
            r"энергоинформационн\w+",
        ],
    ),
    (
        "natural",
        &[
            r"100%\s*натуральн\w+",
            r"исключительно натуральн\w+",
            r"только природн\w+ компоненты",
            r"без химии",
            r"экологически чист\w+",
        ],
    ),
    (
        "fast_results",
        &[
            r"за\s+\d+\s+дн\w+",
            r"мгновенн\w+ результат",
            r"немедленн\w+ эффект",
            r"быстр\w+ излечение",
            r"в\s+считанные\s+\w+",
        ],
    ),
    (
        "universal",
        &[
            r"от всех болезней",
            r"универсальн\w+ средство",
            r"лечит всё",
            r"помогает при любых",
            r"панацея",
        ],
    ),
    (
        "unproven",
        &[
            r"не признаётся официальной медициной",
            r"скрывается врачами",
            r"тайна фармацевт\w+",
            r"секретн\w+ методика",
            r"древн\w+ знания",
            r"тибетск\w+ медицина",
        ],
    ),
    (
        "emotional",
        &[
            r"спасёт вашу жизнь",
            r"не упустите шанс",
            r"последняя надежда",
            r"единственн\w+ способ",
            r"врачи в шоке",
            r"медики скрывают",
        ],
    ),
    (
        "testimonials",
        &[
            r"тысячи довольных",
            r"миллионы людей",
            r"все пациенты довольны",
            r"отзывы потрясающие",
            r"никто не пожалел",
        ],
    ),
];

const MARKERS_EN: &[(&str, &[&str])] = &[
    (
        "miracle_claims",
        &[
            r"miracle\s+cure",
            r"miracle\s+drug",
            r"wonder\s+drug",
            r"magical\s+formula",
            r"revolutionary\s+breakthrough",
            r"breakthrough\s+discovery",
        ],
    ),
    (
        "guarantees",
        &[
            r"100%\s*guaranteed",
            r"guaranteed\s+results",
            r"guaranteed\s+cure",
            r"complete\s+cure",
            r"forever\s+cure",
        ],
    ),
    (
        "detox",
        &[
            r"detox",
            r"cleanse",
            r"flush\s+toxins",
            r"remove\s+toxins",
            r"body\s+cleanse",
        ],
    ),
    (
        "energy",
        &[
            r"energy\s+field",
            r"quantum\s+energy",
            r"cosmic\s+energy",
            r"energy\s+balance",
        ],
    ),
    (
        "natural",
        &[
            r"100%\s*natural",
            r"all[-\s]natural",
            r"purely\s+natural",
            r"chemical[-\s]free",
        ],
    ),
    (
        "fast_results",
        &[
            r"instant\s+results",
            r"immediate\s+effect",
            r"in\s+\d+\s+days",
            r"overnight\s+cure",
        ],
    ),
    (
        "universal",
        &[r"cures\s+everything", r"universal\s+remedy", r"panacea"],
    ),
    (
        "unproven",
        &[
            r"not\s+recognized\s+by",
            r"hidden\s+by\s+doctors",
            r"big\s+pharma\s+secret",
            r"ancient\s+wisdom",
        ],
    ),
    (
        "emotional",
        &[
            r"save\s+your\s+life",
            r"don't\s+miss",
            r"last\s+hope",
            r"only\s+way",
            r"doctors\s+shocked",
        ],
    ),
    (
        "testimonials",
        &[
            r"thousands\s+satisfied",
            r"millions\s+of\s+people",
            r"all\s+patients\s+satisfied",
        ],
    ),
];

const LEGITIMATE_RU: &[&str] = &[
    r"клиническ\w+ исследования",
    r"рандомизированн\w+ контролируем\w+",
    r"доказательн\w+ медицина",
    r"плацебо[-\s]контролируем\w+",
    r"мета[-\s]анализ",
    r"систематическ\w+ обзор",
    r"peer[-\s]review",
    r"рецензируем\w+ журнал",
];

const LEGITIMATE_EN: &[&str] = &[
    r"clinical\s+trial",
    r"randomized\s+controlled",
    r"evidence[-\s]based",
    r"placebo[-\s]controlled",
    r"meta[-\s]analysis",
    r"systematic\s+review",
    r"peer[-\s]reviewed",
];

const AMPLIFIERS_RU: &[&str] = &[
    "абсолютно",
    "полностью",
    "совершенно",
    "исключительно",
    "невероятно",
    "поразительно",
    "удивительно",
    "феноменально",
];

const AMPLIFIERS_EN: &[&str] = &[
    "absolutely",
    "completely",
    "totally",
    "exclusively",
    "incredibly",
    "amazingly",
    "astonishingly",
    "phenomenally",
];
