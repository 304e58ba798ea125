//! Implementation planner.
//!
//! Expands the fixed 10-week template into a typed plan: per-week risk,
//! hours and budget adjusted for readiness and assessment type, plus an
//! aggregate summary and a recommended project outline.

mod template;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{AssessmentTypeId, PhaseId, CORE_DIMENSIONS};
use crate::readiness::type_bonus;
use crate::scores::{round1, DimensionScores, RiskLevel};

pub use template::WEEKS as WEEK_TEMPLATES;

pub const PLAN_WEEKS: u8 = 10;

/// Factors that each add 5 points to the plan's success probability at 4+.
const PLAN_SUCCESS_FACTORS: [&str; 3] = [
    "leadership_support",
    "resource_availability",
    "change_management_maturity",
];

/// One adjusted week of the plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanWeek {
    pub week: u8,
    pub task_id: String,
    /// Delivery label from the template, e.g. `Plan`.
    pub phase: String,
    pub impact_phase: PhaseId,
    pub title: String,
    pub description: String,
    pub activities: Vec<String>,
    pub deliverables: Vec<String>,
    pub risk_level: RiskLevel,
    pub hours: u32,
    /// Readiness-adjusted budget before contingency.
    pub budget: u64,
    pub final_budget: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanSummary {
    pub total_budget: u64,
    pub total_hours: u32,
    pub risk_level: RiskLevel,
    pub success_probability: f64,
    pub key_risks: Vec<String>,
    pub critical_success_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImplementationPlan {
    pub assessment_type: AssessmentTypeId,
    pub weeks: BTreeMap<u8, PlanWeek>,
    pub summary: PlanSummary,
}

impl ImplementationPlan {
    pub fn week(&self, week: u8) -> Option<&PlanWeek> {
        self.weeks.get(&week)
    }

    pub fn week_for_task(&self, task_id: &str) -> Option<&PlanWeek> {
        self.weeks.values().find(|w| w.task_id == task_id)
    }

    /// Sum of final budgets of the weeks aligned to `phase`.
    pub fn planned_budget_for(&self, phase: PhaseId) -> u64 {
        self.weeks
            .values()
            .filter(|w| w.impact_phase == phase)
            .map(|w| w.final_budget)
            .sum()
    }
}

/// Readiness tier driving multipliers and extra activities.
pub fn readiness_risk(overall: f64) -> RiskLevel {
    if overall < 3.0 {
        RiskLevel::High
    } else if overall < 4.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn hours_pct(risk: RiskLevel) -> u32 {
    match risk {
        RiskLevel::High => 130,
        RiskLevel::Medium => 110,
        RiskLevel::Low => 100,
    }
}

fn budget_pct(risk: RiskLevel) -> u64 {
    match risk {
        RiskLevel::High => 125,
        RiskLevel::Medium => 110,
        RiskLevel::Low => 100,
    }
}

fn readiness_activities(risk: RiskLevel, index: usize) -> &'static [&'static str] {
    match risk {
        RiskLevel::High => &template::LOW_READINESS[index],
        RiskLevel::Medium => &template::MEDIUM_READINESS[index],
        RiskLevel::Low => &template::HIGH_READINESS[index],
    }
}

/// Build the 10-week plan.
pub fn build_plan(
    assessment_type: AssessmentTypeId,
    scores: &DimensionScores,
    overall: f64,
) -> ImplementationPlan {
    let risk = readiness_risk(overall);

    let weeks: BTreeMap<u8, PlanWeek> = template::WEEKS
        .iter()
        .enumerate()
        .map(|(index, t)| {
            let activities = t
                .activities
                .iter()
                .chain(readiness_activities(risk, index))
                .chain(assessment_type.weekly_activities(t.week))
                .map(|a| (*a).to_string())
                .collect();
            let budget = t.budget * budget_pct(risk) / 100;
            let week = PlanWeek {
                week: t.week,
                task_id: format!("task_{}", t.week),
                phase: t.label.to_string(),
                impact_phase: t.impact_phase,
                title: t.title.to_string(),
                description: t.description.to_string(),
                activities,
                deliverables: t.deliverables.iter().map(|d| (*d).to_string()).collect(),
                risk_level: risk,
                hours: t.hours * hours_pct(risk) / 100,
                budget,
                final_budget: budget * risk.contingency_pct() / 100,
            };
            (t.week, week)
        })
        .collect();

    let summary = PlanSummary {
        total_budget: weeks.values().map(|w| w.final_budget).sum(),
        total_hours: weeks.values().map(|w| w.hours).sum(),
        risk_level: risk,
        success_probability: plan_success_probability(assessment_type, scores, overall),
        key_risks: key_risks(scores),
        critical_success_factors: critical_success_factors(scores),
    };

    tracing::debug!(
        assessment_type = %assessment_type,
        overall,
        risk = %risk,
        total_budget = summary.total_budget,
        "built implementation plan"
    );

    ImplementationPlan {
        assessment_type,
        weeks,
        summary,
    }
}

fn plan_success_probability(
    assessment_type: AssessmentTypeId,
    scores: &DimensionScores,
    overall: f64,
) -> f64 {
    let base = (overall * 18.0).clamp(15.0, 95.0);
    let factor_bonus = PLAN_SUCCESS_FACTORS
        .iter()
        .filter(|f| scores.factor(f) >= 4.0)
        .count() as f64
        * 5.0;
    round1((base + type_bonus(assessment_type, scores) + factor_bonus).min(95.0))
}

/// Canonical risk for every core dimension scored below 3.
pub fn key_risks(scores: &DimensionScores) -> Vec<String> {
    CORE_DIMENSIONS
        .iter()
        .filter(|c| scores.get(c.id).is_some_and(|s| s < 3.0))
        .map(|c| c.risk.to_string())
        .collect()
}

/// Canonical strength for every core dimension scored 4 or more.
pub fn critical_success_factors(scores: &DimensionScores) -> Vec<String> {
    CORE_DIMENSIONS
        .iter()
        .filter(|c| scores.get(c.id).is_some_and(|s| s >= 4.0))
        .map(|c| c.strength.to_string())
        .collect()
}

/// Suggested project length in whole weeks.
pub fn suggested_duration_weeks(assessment_type: AssessmentTypeId, overall: f64) -> u32 {
    let base: u32 = if overall < 2.5 {
        24
    } else if overall > 4.0 {
        12
    } else {
        16
    };
    base * assessment_type.duration_pct() / 100
}

const PROJECT_SUCCESS_FACTORS: [&str; 4] = [
    "Strong leadership engagement",
    "Comprehensive stakeholder communication",
    "Adequate resource allocation",
    "Effective training and support",
];

const RESOURCE_PRIORITIES: [&str; 4] = [
    "Change management expertise",
    "Training and communication resources",
    "Technical support and infrastructure",
    "Stakeholder engagement systems",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyMilestone {
    pub name: String,
    pub week: u32,
    pub phase: PhaseId,
}

/// Outline of the project an assessment suggests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedProject {
    pub suggested_duration_weeks: u32,
    pub critical_success_factors: Vec<String>,
    pub resource_priorities: Vec<String>,
    pub key_milestones: Vec<KeyMilestone>,
}

pub fn recommended_project(assessment_type: AssessmentTypeId, overall: f64) -> RecommendedProject {
    let duration = suggested_duration_weeks(assessment_type, overall);
    let milestone = |name: &str, week: u32, phase| KeyMilestone {
        name: name.to_string(),
        week,
        phase,
    };
    RecommendedProject {
        suggested_duration_weeks: duration,
        critical_success_factors: PROJECT_SUCCESS_FACTORS.iter().map(|s| (*s).to_string()).collect(),
        resource_priorities: RESOURCE_PRIORITIES.iter().map(|s| (*s).to_string()).collect(),
        key_milestones: vec![
            milestone("Readiness assessment complete", 2, PhaseId::Investigate),
            milestone("Implementation plan approved", 4, PhaseId::Mobilize),
            milestone("Pilot success validated", 8, PhaseId::Pilot),
            milestone("Full deployment complete", duration.saturating_sub(4), PhaseId::Activate),
            milestone("Knowledge transfer complete", duration.saturating_sub(2), PhaseId::Cement),
            milestone("Success metrics achieved", duration, PhaseId::Track),
        ],
    }
}
