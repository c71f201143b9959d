use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{Catalog, Error, Severity};

/// Overall verdict for a text, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            other => Err(Error::UnsupportedRiskLevel(other.to_string())),
        }
    }
}

/// Marker count thresholds, checked critical first, then high, then medium.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RiskThresholds {
    pub critical_high_severity: usize,
    pub critical_total: usize,
    pub high_high_severity: usize,
    pub high_total: usize,
    pub medium_total: usize,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical_high_severity: 3,
            critical_total: 10,
            high_high_severity: 1,
            high_total: 5,
            medium_total: 2,
        }
    }
}

impl RiskThresholds {
    /// Categories without catalog metadata count toward the total only.
    pub fn score(&self, counts: &BTreeMap<String, usize>, catalog: &Catalog) -> RiskLevel {
        let total: usize = counts.values().sum();
        let high_severity: usize = counts
            .iter()
            .filter(|(category, _)| {
                catalog.category(category).map(|info| info.severity) == Some(Severity::High)
            })
            .map(|(_, count)| *count)
            .sum();

        if total == 0 {
            RiskLevel::Low
        } else if high_severity >= self.critical_high_severity || total >= self.critical_total {
            RiskLevel::Critical
        } else if high_severity >= self.high_high_severity || total >= self.high_total {
            RiskLevel::High
        } else if total >= self.medium_total {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Scores with the default thresholds.
pub fn score(counts: &BTreeMap<String, usize>, catalog: &Catalog) -> RiskLevel {
    RiskThresholds::default().score(counts, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, usize)]) -> BTreeMap<String, usize> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn empty_counts_score_low() {
        assert_eq!(score(&BTreeMap::new(), &Catalog::builtin()), RiskLevel::Low);
    }

    #[test]
    fn total_threshold_fires_regardless_of_severity() {
        let catalog = Catalog::builtin();
        assert_eq!(score(&counts(&[("natural", 10)]), &catalog), RiskLevel::Critical);
        assert_eq!(score(&counts(&[("natural", 5)]), &catalog), RiskLevel::High);
        assert_eq!(score(&counts(&[("natural", 2)]), &catalog), RiskLevel::Medium);
        assert_eq!(score(&counts(&[("natural", 1)]), &catalog), RiskLevel::Low);
    }

    #[test]
    fn high_severity_categories_escalate() {
        let catalog = Catalog::builtin();
        assert_eq!(score(&counts(&[("guarantees", 3)]), &catalog), RiskLevel::Critical);
        assert_eq!(score(&counts(&[("guarantees", 1)]), &catalog), RiskLevel::High);
        assert_eq!(
            score(&counts(&[("miracle_claims", 1), ("energy", 1), ("detox", 1)]), &catalog),
            RiskLevel::High
        );
        assert_eq!(
            score(&counts(&[("miracle_claims", 2), ("emotional", 1)]), &catalog),
            RiskLevel::Critical
        );
    }

    #[test]
    fn unknown_categories_only_add_to_total() {
        let catalog = Catalog::builtin();
        assert_eq!(score(&counts(&[("homeopathy", 3)]), &catalog), RiskLevel::Medium);
    }

    #[test]
    fn custom_thresholds_apply() {
        let thresholds = RiskThresholds {
            medium_total: 1,
            ..RiskThresholds::default()
        };
        let level = thresholds.score(&counts(&[("detox", 1)]), &Catalog::builtin());
        assert_eq!(level, RiskLevel::Medium);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::High < RiskLevel::Critical);
        assert_eq!("Critical".parse::<RiskLevel>().unwrap(), RiskLevel::Critical);
    }

    #[test]
    fn rejects_unknown_risk_level_names() {
        assert!(matches!(
            "severe".parse::<RiskLevel>(),
            Err(Error::UnsupportedRiskLevel(ref name)) if name == "severe"
        ));
    }
}
