//! Readiness scorer.
//!
//! Reduces a dimension-scored assessment to an overall score, readiness
//! band, the inertia/force/resistance triple, typed recommendations and
//! risks, and a success probability.

pub mod narrative;
pub mod record;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{AssessmentTypeId, PhaseId, CORE_DIMENSIONS};
use crate::error::{Result, ValidationError};
use crate::scores::{round1, round2, DimensionScores, RiskLevel};

pub use narrative::{AnthropicNarrator, NarrativeGenerator, NarrativeRequest, TemplateNarrator};
pub use record::Assessment;

/// Overall score at or above which the implementation guarantee applies.
/// Independent of the band boundaries.
pub const GUARANTEE_THRESHOLD: f64 = 3.0;

pub const BASE_RECOMMENDATIONS: [&str; 6] = [
    "Focus on strengthening lowest-scoring assessment dimensions",
    "Develop comprehensive change champion network",
    "Create clear communication strategy for all stakeholders",
    "Establish baseline performance metrics",
    "Design training programs for affected teams",
    "Build resistance management plan addressing organizational culture",
];

pub const BASE_RISKS: [&str; 2] = ["Organizational resistance to change", "Resource constraints"];

/// One scored dimension as submitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DimensionInput {
    pub score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DimensionInput {
    pub fn new(score: i64) -> Self {
        Self { score, notes: None }
    }
}

/// A raw assessment submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentInput {
    pub assessment_type: AssessmentTypeId,
    pub project_name: String,
    pub scores: BTreeMap<String, DimensionInput>,
}

impl AssessmentInput {
    pub fn new(assessment_type: AssessmentTypeId, project_name: impl Into<String>) -> Self {
        Self {
            assessment_type,
            project_name: project_name.into(),
            scores: BTreeMap::new(),
        }
    }

    pub fn with_score(mut self, dimension: &str, score: i64) -> Self {
        self.scores
            .insert(dimension.to_string(), DimensionInput::new(score));
        self
    }

    /// Every dimension of the type scored `score`.
    pub fn uniform(assessment_type: AssessmentTypeId, project_name: &str, score: i64) -> Self {
        assessment_type
            .dimensions()
            .iter()
            .fold(Self::new(assessment_type, project_name), |input, d| {
                input.with_score(d.id, score)
            })
    }

    /// Check the submission against the catalog.
    ///
    /// # Errors
    /// `InvalidInput` for an unknown key, a missing dimension, or a score
    /// outside `1..=5`.
    pub fn validate(&self) -> Result<DimensionScores> {
        let spec = self.assessment_type.spec();

        if self.project_name.trim().is_empty() {
            return Err(ValidationError::EmptyField("project_name".into()).into());
        }

        if let Some(unknown) = self.scores.keys().find(|k| spec.dimension(k).is_none()) {
            return Err(ValidationError::UnknownDimension {
                dimension: unknown.clone(),
                assessment_type: self.assessment_type.to_string(),
            }
            .into());
        }

        let mut scores = DimensionScores::new();
        for dimension in spec.dimensions {
            let input = self
                .scores
                .get(dimension.id)
                .ok_or_else(|| ValidationError::MissingDimension {
                    dimension: dimension.id.to_string(),
                })?;
            if !(1..=5).contains(&input.score) {
                return Err(ValidationError::ScoreOutOfRange {
                    dimension: dimension.id.to_string(),
                    score: input.score,
                }
                .into());
            }
            scores.insert(dimension.id, input.score as f64);
        }
        Ok(scores)
    }
}

/// Bucketed label derived from the overall score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadinessBand {
    Critical,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ReadinessBand {
    pub fn from_overall(overall: f64) -> Self {
        if overall >= 4.5 {
            ReadinessBand::Excellent
        } else if overall >= 3.5 {
            ReadinessBand::Good
        } else if overall >= 2.5 {
            ReadinessBand::Fair
        } else if overall >= 1.5 {
            ReadinessBand::Poor
        } else {
            ReadinessBand::Critical
        }
    }
}

impl fmt::Display for ReadinessBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReadinessBand::Excellent => "Excellent",
            ReadinessBand::Good => "Good",
            ReadinessBand::Fair => "Fair",
            ReadinessBand::Poor => "Poor",
            ReadinessBand::Critical => "Critical",
        };
        f.write_str(s)
    }
}

/// Expected organizational pushback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Pushback {
    Minimal,
    Moderate,
    Significant,
}

impl Pushback {
    fn as_str(self) -> &'static str {
        match self {
            Pushback::Minimal => "minimal",
            Pushback::Moderate => "moderate",
            Pushback::Significant => "significant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InertiaMetric {
    pub value: f64,
    pub interpretation: RiskLevel,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForceMetric {
    pub required: f64,
    pub type_factor: f64,
    pub interpretation: RiskLevel,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReactionMetric {
    pub resistance: f64,
    pub interpretation: Pushback,
    pub description: String,
}

/// Inertia / force / resistance triple.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualitativeAnalysis {
    pub inertia: InertiaMetric,
    pub force: ForceMetric,
    pub reaction: ReactionMetric,
}

impl QualitativeAnalysis {
    pub fn compute(assessment_type: AssessmentTypeId, overall: f64) -> Self {
        let multiplier = assessment_type.type_multiplier();
        let type_label = assessment_type.as_str().replace('_', " ");

        let inertia = (5.0 - overall) * 20.0 * multiplier;
        let inertia_level = if inertia < 48.0 {
            RiskLevel::Low
        } else if inertia < 84.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        };

        let force = (100.0 - overall * 15.0) * multiplier;
        let force_level = if force < 60.0 {
            RiskLevel::Low
        } else if force < 90.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        };

        let resistance = inertia * 0.8;
        let pushback = if resistance < 36.0 {
            Pushback::Minimal
        } else if resistance < 72.0 {
            Pushback::Moderate
        } else {
            Pushback::Significant
        };

        Self {
            inertia: InertiaMetric {
                value: round1(inertia),
                interpretation: inertia_level,
                description: format!(
                    "Organization shows {} resistance to {type_label} changes",
                    inertia_level.as_str().to_lowercase()
                ),
            },
            force: ForceMetric {
                required: round1(force),
                type_factor: round1(multiplier),
                interpretation: force_level,
                description: format!(
                    "{force_level} effort required for successful {type_label} transformation"
                ),
            },
            reaction: ReactionMetric {
                resistance: round1(resistance),
                interpretation: pushback,
                description: format!("Expect {} organizational pushback", pushback.as_str()),
            },
        }
    }
}

/// Scorer output for one assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadinessReport {
    pub assessment_type: AssessmentTypeId,
    pub overall_score: f64,
    pub readiness_band: ReadinessBand,
    pub analysis: QualitativeAnalysis,
    pub recommendations: Vec<String>,
    pub risks: Vec<String>,
    pub success_probability: f64,
    pub phase_recommendations: BTreeMap<PhaseId, String>,
    pub guarantee_eligible: bool,
}

/// Mean of the scored dimensions, rounded to 2 decimals.
pub fn overall_score(scores: &DimensionScores) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    round2(scores.iter().map(|(_, s)| s).sum::<f64>() / scores.len() as f64)
}

/// `+5` per bonus dimension scoring 4 or more. Unscored bonus dimensions
/// count as neutral.
pub fn type_bonus(assessment_type: AssessmentTypeId, scores: &DimensionScores) -> f64 {
    assessment_type
        .bonus_dimensions()
        .iter()
        .filter(|d| scores.factor(d) >= 4.0)
        .count() as f64
        * 5.0
}

pub fn success_probability(
    assessment_type: AssessmentTypeId,
    scores: &DimensionScores,
    overall: f64,
) -> f64 {
    let base = (overall * 18.0).clamp(15.0, 95.0);
    round1((base + type_bonus(assessment_type, scores)).min(95.0))
}

/// Base and type-specific risks, then one canonical message per core
/// dimension scoring below 3.
pub fn risks(assessment_type: AssessmentTypeId, scores: &DimensionScores) -> Vec<String> {
    BASE_RISKS
        .iter()
        .chain(assessment_type.specific_risks())
        .map(|r| (*r).to_string())
        .chain(
            CORE_DIMENSIONS
                .iter()
                .filter(|core| scores.get(core.id).is_some_and(|s| s < 3.0))
                .map(|core| core.risk.to_string()),
        )
        .collect()
}

pub fn recommendations(assessment_type: AssessmentTypeId) -> Vec<String> {
    BASE_RECOMMENDATIONS
        .iter()
        .chain(assessment_type.specific_recommendations())
        .map(|r| (*r).to_string())
        .collect()
}

pub fn phase_recommendations(assessment_type: AssessmentTypeId) -> BTreeMap<PhaseId, String> {
    PhaseId::ALL
        .into_iter()
        .map(|p| (p, assessment_type.phase_recommendation(p).to_string()))
        .collect()
}

/// Validate and score a submission.
///
/// # Errors
/// `InvalidInput` when validation fails.
pub fn score(input: &AssessmentInput) -> Result<ReadinessReport> {
    let scores = input.validate()?;
    Ok(score_dimensions(input.assessment_type, &scores))
}

/// Score an already validated score map.
pub fn score_dimensions(assessment_type: AssessmentTypeId, scores: &DimensionScores) -> ReadinessReport {
    let overall = overall_score(scores);
    let report = ReadinessReport {
        assessment_type,
        overall_score: overall,
        readiness_band: ReadinessBand::from_overall(overall),
        analysis: QualitativeAnalysis::compute(assessment_type, overall),
        recommendations: recommendations(assessment_type),
        risks: risks(assessment_type, scores),
        success_probability: success_probability(assessment_type, scores, overall),
        phase_recommendations: phase_recommendations(assessment_type),
        guarantee_eligible: overall >= GUARANTEE_THRESHOLD,
    };
    tracing::debug!(
        assessment_type = %assessment_type,
        overall,
        band = %report.readiness_band,
        "scored assessment"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn manufacturing_all_fives() {
        let input = AssessmentInput::uniform(AssessmentTypeId::ManufacturingOperations, "Line 4", 5);
        let report = score(&input).unwrap();
        assert_eq!(report.overall_score, 5.0);
        assert_eq!(report.readiness_band, ReadinessBand::Excellent);
        assert_eq!(report.analysis.inertia.value, 0.0);
        assert_eq!(report.analysis.force.required, 30.0);
        assert_eq!(report.analysis.reaction.resistance, 0.0);
        assert_eq!(report.success_probability, 95.0);
        assert_eq!(report.risks.len(), 2 + 4);
        assert!(report.guarantee_eligible);
    }

    #[test]
    fn general_mid_range() {
        let input = AssessmentInput::uniform(AssessmentTypeId::GeneralReadiness, "Reorg", 3);
        let report = score(&input).unwrap();
        assert_eq!(report.readiness_band, ReadinessBand::Fair);
        assert_eq!(report.analysis.inertia.value, 40.0);
        assert_eq!(report.analysis.force.required, 55.0);
        assert_eq!(report.analysis.reaction.resistance, 32.0);
        assert_eq!(report.analysis.reaction.interpretation, Pushback::Minimal);
        assert_eq!(report.success_probability, 54.0);
        assert_eq!(
            report.analysis.inertia.description,
            "Organization shows low resistance to general readiness changes"
        );
    }

    #[test]
    fn low_core_scores_add_canonical_risks() {
        let input = AssessmentInput::uniform(AssessmentTypeId::SoftwareImplementation, "ERP", 2);
        let report = score(&input).unwrap();
        assert_eq!(report.readiness_band, ReadinessBand::Poor);
        for core in CORE_DIMENSIONS {
            assert!(report.risks.contains(&core.risk.to_string()));
        }
        assert!(!report.guarantee_eligible);
    }

    #[test]
    fn all_ones_is_critical() {
        let input = AssessmentInput::uniform(AssessmentTypeId::SoftwareImplementation, "ERP", 1);
        let report = score(&input).unwrap();
        assert_eq!(report.readiness_band, ReadinessBand::Critical);
        assert_eq!(report.success_probability, 18.0);
        assert_eq!(report.analysis.inertia.value, 88.0);
        assert_eq!(report.analysis.inertia.interpretation, RiskLevel::High);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(ReadinessBand::from_overall(4.5), ReadinessBand::Excellent);
        assert_eq!(ReadinessBand::from_overall(4.49), ReadinessBand::Good);
        assert_eq!(ReadinessBand::from_overall(2.5), ReadinessBand::Fair);
        assert_eq!(ReadinessBand::from_overall(1.49), ReadinessBand::Critical);
    }

    #[test]
    fn validation_rejects_bad_input() {
        let missing = AssessmentInput::new(AssessmentTypeId::GeneralReadiness, "x")
            .with_score("leadership_commitment", 3);
        assert_eq!(missing.validate().unwrap_err().kind(), ErrorKind::InvalidInput);

        let unknown = AssessmentInput::uniform(AssessmentTypeId::GeneralReadiness, "x", 3)
            .with_score("process_maturity", 3);
        assert!(matches!(
            unknown.validate(),
            Err(crate::CoreError::Validation(ValidationError::UnknownDimension { .. }))
        ));

        let out_of_range = AssessmentInput::uniform(AssessmentTypeId::GeneralReadiness, "x", 3)
            .with_score("training_capability", 6);
        assert!(matches!(
            out_of_range.validate(),
            Err(crate::CoreError::Validation(ValidationError::ScoreOutOfRange { score: 6, .. }))
        ));

        let unnamed = AssessmentInput::uniform(AssessmentTypeId::GeneralReadiness, "  ", 3);
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn type_bonus_counts_specialized_strengths() {
        let input = AssessmentInput::uniform(AssessmentTypeId::BusinessProcess, "BPR", 3)
            .with_score("process_maturity", 4)
            .with_score("cross_functional_collaboration", 5);
        let report = score(&input).unwrap();
        // overall = (6*3 + 4 + 5) / 8 = 3.375 -> 3.38
        assert_eq!(report.overall_score, 3.38);
        assert_eq!(report.success_probability, round1(3.38 * 18.0 + 10.0));
    }
}
