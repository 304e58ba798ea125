//! Persisted assessment document.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DimensionInput, ReadinessReport};
use crate::catalog::AssessmentTypeId;
use crate::planner::{ImplementationPlan, RecommendedProject};
use crate::scores::DimensionScores;

/// A scored assessment. Scores are immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assessment {
    pub id: String,
    pub user_id: String,
    pub organization: String,
    pub assessment_type: AssessmentTypeId,
    pub project_name: String,
    pub scores: BTreeMap<String, DimensionInput>,
    pub report: ReadinessReport,
    pub implementation_plan: ImplementationPlan,
    pub recommended_project: RecommendedProject,
    #[serde(default)]
    pub narrative: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assessment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: &str,
        organization: &str,
        assessment_type: AssessmentTypeId,
        project_name: &str,
        scores: BTreeMap<String, DimensionInput>,
        report: ReadinessReport,
        implementation_plan: ImplementationPlan,
        recommended_project: RecommendedProject,
        narrative: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            organization: organization.to_string(),
            assessment_type,
            project_name: project_name.to_string(),
            scores,
            report,
            implementation_plan,
            recommended_project,
            narrative,
            created_at: now,
            updated_at: now,
        }
    }

    /// Numeric scores for the estimators.
    pub fn dimension_scores(&self) -> DimensionScores {
        self.scores
            .iter()
            .map(|(k, v)| (k.clone(), v.score as f64))
            .collect()
    }

    pub fn overall_score(&self) -> f64 {
        self.report.overall_score
    }
}
