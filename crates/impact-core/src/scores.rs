//! Score maps, factor lookup and shared rating enums.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Score assumed for any factor that is neither scored nor aliased.
pub const NEUTRAL_SCORE: f64 = 3.0;

/// Analytics factor names that map onto catalog dimensions.
const FACTOR_ALIASES: &[(&str, &str)] = &[
    ("leadership_support", "leadership_commitment"),
    ("change_management_maturity", "organizational_culture"),
    ("communication_effectiveness", "stakeholder_engagement"),
    ("workforce_adaptability", "training_capability"),
    ("resource_adequacy", "resource_availability"),
    ("technical_readiness", "technical_infrastructure"),
    ("shift_work_considerations", "shift_coordination"),
];

/// Dimension or factor scores keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionScores(BTreeMap<String, f64>);

impl DimensionScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, score: f64) {
        self.0.insert(key.into(), score);
    }

    pub fn with(mut self, key: impl Into<String>, score: f64) -> Self {
        self.insert(key, score);
        self
    }

    /// Direct lookup, no aliasing.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Resolve an analytics factor: direct key, then alias, then neutral.
    pub fn factor(&self, name: &str) -> f64 {
        if let Some(score) = self.get(name) {
            return score;
        }
        FACTOR_ALIASES
            .iter()
            .find(|(factor, _)| *factor == name)
            .and_then(|(_, dimension)| self.get(dimension))
            .unwrap_or(NEUTRAL_SCORE)
    }

    /// Mean of the resolved factors.
    pub fn mean_of(&self, factors: &[&str]) -> f64 {
        if factors.is_empty() {
            return NEUTRAL_SCORE;
        }
        factors.iter().map(|f| self.factor(f)).sum::<f64>() / factors.len() as f64
    }

    /// Resolved score for each factor, keyed by factor name.
    pub fn resolve_all(&self, factors: &[&str]) -> BTreeMap<String, f64> {
        factors
            .iter()
            .map(|f| ((*f).to_string(), self.factor(f)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for DimensionScores {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Three-level rating used for risk, impact and confidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    /// Contingency multiplier in percent applied to plan budgets.
    pub fn contingency_pct(self) -> u64 {
        match self {
            RiskLevel::Low => 100,
            RiskLevel::Medium => 110,
            RiskLevel::High => 120,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert and issue severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn is_urgent(self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}
