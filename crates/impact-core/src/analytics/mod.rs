//! Predictive analytics.
//!
//! Closed-form estimators over an assessment's factor scores: task success,
//! budget overrun, scope creep, timeline outlook and risk trending. Missing
//! factors resolve through [`DimensionScores::factor`] and never fail.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::AssessmentTypeId;
use crate::scores::{round1, round2, DimensionScores, RiskLevel};

/// Fixed risk record for one canonical plan task.
pub struct TaskRiskProfile {
    pub task_id: &'static str,
    pub primary_factors: [&'static str; 2],
    pub base_risk: f64,
    pub description: &'static str,
    pub critical_dependencies: [&'static str; 2],
}

pub static TASK_RISK_PROFILES: [TaskRiskProfile; 10] = [
    TaskRiskProfile {
        task_id: "task_1",
        primary_factors: ["leadership_support", "stakeholder_engagement"],
        base_risk: 0.15,
        description: "Project Charter and team establishment",
        critical_dependencies: ["Executive sponsorship", "Resource allocation"],
    },
    TaskRiskProfile {
        task_id: "task_2",
        primary_factors: ["resource_availability", "workforce_adaptability"],
        base_risk: 0.20,
        description: "Hands-on training and capability assessment",
        critical_dependencies: ["Team availability", "Learning capacity"],
    },
    TaskRiskProfile {
        task_id: "task_3",
        primary_factors: ["change_management_maturity", "communication_effectiveness"],
        base_risk: 0.35,
        description: "Process analysis and configuration planning",
        critical_dependencies: ["Process documentation", "Stakeholder engagement"],
    },
    TaskRiskProfile {
        task_id: "task_4",
        primary_factors: ["technical_readiness", "resource_availability"],
        base_risk: 0.25,
        description: "System configuration and data preparation",
        critical_dependencies: ["Technical expertise", "Data quality"],
    },
    TaskRiskProfile {
        task_id: "task_5",
        primary_factors: ["technical_readiness", "change_management_maturity"],
        base_risk: 0.40,
        description: "Data loading and environment setup",
        critical_dependencies: ["Data accuracy", "System stability"],
    },
    TaskRiskProfile {
        task_id: "task_6",
        primary_factors: ["workforce_adaptability", "communication_effectiveness"],
        base_risk: 0.30,
        description: "User acceptance testing and feedback",
        critical_dependencies: ["User engagement", "Feedback integration"],
    },
    TaskRiskProfile {
        task_id: "task_7",
        primary_factors: ["technical_readiness", "change_management_maturity"],
        base_risk: 0.35,
        description: "System refinement and optimization",
        critical_dependencies: ["Technical agility", "Change adaptability"],
    },
    TaskRiskProfile {
        task_id: "task_8",
        primary_factors: ["workforce_adaptability", "resource_availability"],
        base_risk: 0.25,
        description: "Production deployment and user training",
        critical_dependencies: ["Training effectiveness", "System readiness"],
    },
    TaskRiskProfile {
        task_id: "task_9",
        primary_factors: ["leadership_support", "workforce_adaptability"],
        base_risk: 0.45,
        description: "Initial go-live with intensive support",
        critical_dependencies: ["Support availability", "Issue resolution"],
    },
    TaskRiskProfile {
        task_id: "task_10",
        primary_factors: ["change_management_maturity", "communication_effectiveness"],
        base_risk: 0.35,
        description: "Stabilization and success validation",
        critical_dependencies: ["System stability", "User adoption"],
    },
];

pub fn task_profile(task_id: &str) -> Option<&'static TaskRiskProfile> {
    TASK_RISK_PROFILES.iter().find(|p| p.task_id == task_id)
}

/// Success/risk bands used by task predictions: `High < 60`, `Medium < 80`.
pub fn success_risk_level(success: f64) -> RiskLevel {
    if success >= 80.0 {
        RiskLevel::Low
    } else if success >= 60.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskPrediction {
    pub task_id: String,
    pub task_description: Option<String>,
    pub success_probability: f64,
    pub risk_level: RiskLevel,
    pub primary_factors: Vec<String>,
    pub factor_scores: BTreeMap<String, f64>,
    pub critical_dependencies: Vec<String>,
    pub confidence: RiskLevel,
}

pub fn predict_task_success(task_id: &str, scores: &DimensionScores, overall: f64) -> TaskPrediction {
    let Some(profile) = task_profile(task_id) else {
        return TaskPrediction {
            task_id: task_id.to_string(),
            task_description: None,
            success_probability: 70.0,
            risk_level: RiskLevel::Medium,
            primary_factors: Vec::new(),
            factor_scores: BTreeMap::new(),
            critical_dependencies: Vec::new(),
            confidence: RiskLevel::Low,
        };
    };

    let factor_mean = scores.mean_of(&profile.primary_factors);
    let success = ((100.0 - profile.base_risk * 100.0)
        + (factor_mean - 3.0) * 15.0
        + (overall - 3.0) * 10.0)
        .clamp(10.0, 95.0);

    TaskPrediction {
        task_id: task_id.to_string(),
        task_description: Some(profile.description.to_string()),
        success_probability: round1(success),
        risk_level: success_risk_level(success),
        primary_factors: profile.primary_factors.iter().map(|f| (*f).to_string()).collect(),
        factor_scores: scores.resolve_all(&profile.primary_factors),
        critical_dependencies: profile
            .critical_dependencies
            .iter()
            .map(|d| (*d).to_string())
            .collect(),
        confidence: RiskLevel::High,
    }
}

/// Predictions for `task_1`..`task_10`.
pub fn predict_all_tasks(scores: &DimensionScores, overall: f64) -> Vec<TaskPrediction> {
    TASK_RISK_PROFILES
        .iter()
        .map(|p| predict_task_success(p.task_id, scores, overall))
        .collect()
}

struct BudgetRiskFactor {
    factor: &'static str,
    weight: f64,
    impact: &'static str,
    recommendation: &'static str,
}

static BUDGET_RISK_FACTORS: [BudgetRiskFactor; 5] = [
    BudgetRiskFactor {
        factor: "leadership_support",
        weight: 0.25,
        impact: "Low leadership support leads to scope creep and rework",
        recommendation: "Establish executive steering committee with clear decision-making authority",
    },
    BudgetRiskFactor {
        factor: "change_management_maturity",
        weight: 0.30,
        impact: "Poor change management causes resistance and delays",
        recommendation: "Implement comprehensive change management program with dedicated resources",
    },
    BudgetRiskFactor {
        factor: "resource_availability",
        weight: 0.20,
        impact: "Inadequate resources require additional expertise",
        recommendation: "Secure dedicated team members and establish contingency resource pool",
    },
    BudgetRiskFactor {
        factor: "communication_effectiveness",
        weight: 0.15,
        impact: "Poor communication leads to misunderstandings and rework",
        recommendation: "Develop robust communication plan with multiple channels and feedback loops",
    },
    BudgetRiskFactor {
        factor: "workforce_adaptability",
        weight: 0.10,
        impact: "Low adaptability requires extended training and support",
        recommendation: "Invest in early adopter identification and change champion development",
    },
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetRiskDetail {
    pub factor: String,
    pub score: f64,
    pub risk_contribution: f64,
    pub impact_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetOverrunRisk {
    pub overrun_probability: f64,
    pub expected_overrun_percentage: f64,
    pub expected_overrun_amount: f64,
    pub risk_level: RiskLevel,
    pub total_budget: f64,
    pub risk_adjusted_budget: f64,
    pub risk_factors: Vec<BudgetRiskDetail>,
    pub recommendations: Vec<String>,
}

pub fn predict_budget_overrun(scores: &DimensionScores, total_budget: f64) -> BudgetOverrunRisk {
    let mut weighted = 0.0;
    let mut details = Vec::with_capacity(BUDGET_RISK_FACTORS.len());
    let mut recommendations = Vec::new();

    for f in &BUDGET_RISK_FACTORS {
        let score = scores.factor(f.factor);
        let contribution = (3.0 - score) * f.weight;
        weighted += contribution;
        if round2(contribution) > 0.15 {
            recommendations.push(f.recommendation.to_string());
        }
        details.push(BudgetRiskDetail {
            factor: f.factor.to_string(),
            score,
            risk_contribution: round2(contribution),
            impact_description: f.impact.to_string(),
        });
    }

    let probability = ((0.15 + weighted * 0.20) * 100.0).clamp(5.0, 80.0);
    let percentage = (weighted * 25.0).max(0.0);
    let amount = total_budget * percentage / 100.0;
    let risk_level = if probability < 20.0 {
        RiskLevel::Low
    } else if probability < 40.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    BudgetOverrunRisk {
        overrun_probability: round1(probability),
        expected_overrun_percentage: round1(percentage),
        expected_overrun_amount: round2(amount),
        risk_level,
        total_budget,
        risk_adjusted_budget: round2(total_budget + amount),
        risk_factors: details,
        recommendations,
    }
}

struct ScopePattern {
    high_risk_factors: [&'static str; 2],
    base_risk: f64,
    typical_additions: [&'static str; 3],
}

fn scope_pattern(assessment_type: AssessmentTypeId) -> ScopePattern {
    match assessment_type {
        AssessmentTypeId::GeneralReadiness => ScopePattern {
            high_risk_factors: ["change_management_maturity", "stakeholder_engagement"],
            base_risk: 0.25,
            typical_additions: [
                "Additional training",
                "Extended pilot phase",
                "More stakeholder sessions",
            ],
        },
        AssessmentTypeId::SoftwareImplementation => ScopePattern {
            high_risk_factors: ["technical_readiness", "change_management_maturity"],
            base_risk: 0.35,
            typical_additions: [
                "Custom integrations",
                "Additional data migration",
                "Enhanced training",
            ],
        },
        AssessmentTypeId::BusinessProcess => ScopePattern {
            high_risk_factors: ["change_management_maturity", "communication_effectiveness"],
            base_risk: 0.30,
            typical_additions: [
                "Process redesign",
                "Additional documentation",
                "Change management activities",
            ],
        },
        AssessmentTypeId::ManufacturingOperations => ScopePattern {
            high_risk_factors: ["technical_readiness", "workforce_adaptability"],
            base_risk: 0.40,
            typical_additions: [
                "Safety compliance",
                "Shift coordination",
                "Operations integration",
            ],
        },
    }
}

fn scope_mitigation(factor: &str) -> Option<&'static str> {
    match factor {
        "change_management_maturity" => Some("Implement formal change control process with approval gates"),
        "stakeholder_engagement" => Some("Establish clear stakeholder roles and communication protocols"),
        "technical_readiness" => Some("Conduct thorough technical assessment and establish boundaries"),
        "communication_effectiveness" => Some("Create detailed project charter with explicit scope boundaries"),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScopeCreepRisk {
    pub scope_creep_probability: f64,
    pub impact_level: RiskLevel,
    pub expected_impact: String,
    pub high_risk_factors: Vec<String>,
    pub factor_scores: BTreeMap<String, f64>,
    pub typical_scope_additions: Vec<String>,
    pub mitigation_strategies: Vec<String>,
}

pub fn predict_scope_creep(assessment_type: AssessmentTypeId, scores: &DimensionScores) -> ScopeCreepRisk {
    let pattern = scope_pattern(assessment_type);
    let mean_gap = 3.0 - scores.mean_of(&pattern.high_risk_factors);
    let probability = ((pattern.base_risk + mean_gap * 0.15) * 100.0).clamp(10.0, 70.0);
    let impact_level = if probability < 25.0 {
        RiskLevel::Low
    } else if probability < 45.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };
    let expected_impact = match impact_level {
        RiskLevel::Low => "5-10% additional effort",
        RiskLevel::Medium => "10-20% additional effort",
        RiskLevel::High => "20-35% additional effort",
    };

    ScopeCreepRisk {
        scope_creep_probability: round1(probability),
        impact_level,
        expected_impact: expected_impact.to_string(),
        high_risk_factors: pattern.high_risk_factors.iter().map(|f| (*f).to_string()).collect(),
        factor_scores: scores.resolve_all(&pattern.high_risk_factors),
        typical_scope_additions: pattern
            .typical_additions
            .iter()
            .map(|a| (*a).to_string())
            .collect(),
        mitigation_strategies: pattern
            .high_risk_factors
            .iter()
            .filter(|f| scores.factor(f) < 3.0)
            .filter_map(|f| scope_mitigation(f))
            .map(str::to_string)
            .collect(),
    }
}

struct TimelineFactor {
    factor: &'static str,
    acceleration: f64,
    delay: f64,
    impact: &'static str,
}

static TIMELINE_FACTORS: [TimelineFactor; 4] = [
    TimelineFactor {
        factor: "leadership_support",
        acceleration: 0.15,
        delay: 0.20,
        impact: "Strong leadership can accelerate decisions and approvals",
    },
    TimelineFactor {
        factor: "resource_availability",
        acceleration: 0.10,
        delay: 0.25,
        impact: "Adequate resources prevent delays and bottlenecks",
    },
    TimelineFactor {
        factor: "change_management_maturity",
        acceleration: 0.20,
        delay: 0.30,
        impact: "High maturity enables faster adoption and fewer iterations",
    },
    TimelineFactor {
        factor: "workforce_adaptability",
        acceleration: 0.15,
        delay: 0.15,
        impact: "Adaptable workforce learns faster and requires less support",
    },
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimelineOutlook {
    Accelerated,
    Optimized,
    Standard,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl TimelineOutlook {
    pub fn from_net_impact(net: f64) -> Self {
        if net > 0.10 {
            TimelineOutlook::Accelerated
        } else if net > 0.0 {
            TimelineOutlook::Optimized
        } else if net > -0.10 {
            TimelineOutlook::Standard
        } else {
            TimelineOutlook::AtRisk
        }
    }

    pub fn expected_timeline(self) -> &'static str {
        match self {
            TimelineOutlook::Accelerated => "2-3 weeks faster than standard",
            TimelineOutlook::Optimized => "On schedule or slightly faster",
            TimelineOutlook::Standard => "Standard 10-week timeline",
            TimelineOutlook::AtRisk => "1-2 weeks additional time may be needed",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OpportunityKind {
    Acceleration,
    #[serde(rename = "Risk Mitigation")]
    RiskMitigation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineOpportunity {
    pub factor: String,
    pub opportunity: OpportunityKind,
    pub impact: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineOptimization {
    pub timeline_outlook: TimelineOutlook,
    pub expected_timeline: String,
    pub net_timeline_impact: f64,
    pub acceleration_potential: f64,
    pub delay_risk: f64,
    pub optimization_opportunities: Vec<TimelineOpportunity>,
    pub recommendations: Vec<String>,
}

pub fn predict_timeline(scores: &DimensionScores) -> TimelineOptimization {
    let mut acceleration = 0.0;
    let mut delay = 0.0;
    let mut opportunities = Vec::new();

    for f in &TIMELINE_FACTORS {
        let score = scores.factor(f.factor);
        if score >= 4.0 {
            let gain = f.acceleration * (score - 3.0);
            acceleration += gain;
            opportunities.push(TimelineOpportunity {
                factor: f.factor.to_string(),
                opportunity: OpportunityKind::Acceleration,
                impact: format!("{:.1}% faster", gain * 100.0),
                description: f.impact.to_string(),
            });
        } else if score < 3.0 {
            let loss = f.delay * (3.0 - score);
            delay += loss;
            opportunities.push(TimelineOpportunity {
                factor: f.factor.to_string(),
                opportunity: OpportunityKind::RiskMitigation,
                impact: format!("{:.1}% slower without intervention", loss * 100.0),
                description: f.impact.to_string(),
            });
        }
    }

    let net = acceleration - delay;
    let outlook = TimelineOutlook::from_net_impact(net);
    let recommendations = opportunities
        .iter()
        .map(|o| match o.opportunity {
            OpportunityKind::Acceleration => {
                format!("Leverage {} strength to accelerate project phases", o.factor)
            }
            OpportunityKind::RiskMitigation => {
                format!("Address {} weakness to prevent timeline delays", o.factor)
            }
        })
        .collect();

    TimelineOptimization {
        timeline_outlook: outlook,
        expected_timeline: outlook.expected_timeline().to_string(),
        net_timeline_impact: round2(net),
        acceleration_potential: round2(acceleration),
        delay_risk: round2(delay),
        optimization_opportunities: opportunities,
        recommendations,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskCategory {
    #[serde(rename = "Technical Risk")]
    Technical,
    #[serde(rename = "Adoption Risk")]
    Adoption,
    #[serde(rename = "Stakeholder Risk")]
    Stakeholder,
    #[serde(rename = "Resource Risk")]
    Resource,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::Technical,
        RiskCategory::Adoption,
        RiskCategory::Stakeholder,
        RiskCategory::Resource,
    ];

    pub fn factors(self) -> [&'static str; 2] {
        match self {
            RiskCategory::Technical => ["technical_readiness", "resource_availability"],
            RiskCategory::Adoption => ["workforce_adaptability", "change_management_maturity"],
            RiskCategory::Stakeholder => ["leadership_support", "communication_effectiveness"],
            RiskCategory::Resource => ["resource_availability", "leadership_support"],
        }
    }

    pub fn trend_pattern(self) -> &'static str {
        match self {
            RiskCategory::Technical => "Decreases over time with proper preparation",
            RiskCategory::Adoption => "Increases during training, decreases post go-live",
            RiskCategory::Stakeholder => "Constant vigilance required throughout project",
            RiskCategory::Resource => "Typically increases toward go-live",
        }
    }

    pub fn peak_weeks(self) -> [u8; 3] {
        match self {
            RiskCategory::Technical => [4, 5, 7],
            RiskCategory::Adoption => [6, 8, 9],
            RiskCategory::Stakeholder => [1, 3, 9],
            RiskCategory::Resource => [8, 9, 10],
        }
    }

    /// Category risk from the mean of its factors: `High < 2.5`, `Medium < 3.5`.
    pub fn level(self, scores: &DimensionScores) -> RiskLevel {
        let mean = scores.mean_of(&self.factors());
        if mean < 2.5 {
            RiskLevel::High
        } else if mean < 3.5 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskCategory::Technical => "Technical Risk",
            RiskCategory::Adoption => "Adoption Risk",
            RiskCategory::Stakeholder => "Stakeholder Risk",
            RiskCategory::Resource => "Resource Risk",
        };
        f.write_str(s)
    }
}

fn monitoring_recommendations(category: RiskCategory, level: RiskLevel) -> Vec<String> {
    match level {
        RiskLevel::High => vec![
            format!("Implement daily monitoring for {category}"),
            format!("Establish escalation procedures for {category}"),
        ],
        RiskLevel::Medium => vec![format!("Monitor {category} weekly with regular checkpoints")],
        RiskLevel::Low => vec![format!("Standard monitoring for {category} is sufficient")],
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskTrend {
    pub category: RiskCategory,
    pub current_risk_level: RiskLevel,
    pub factor_scores: BTreeMap<String, f64>,
    pub trend_pattern: String,
    pub peak_weeks: Vec<u8>,
    pub monitoring_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskTrending {
    pub overall_risk_score: f64,
    pub risk_trends: Vec<RiskTrend>,
    pub critical_monitoring_weeks: Vec<u8>,
    pub early_warning_indicators: Vec<String>,
}

pub fn risk_trending(scores: &DimensionScores, overall: f64) -> RiskTrending {
    let trends: Vec<RiskTrend> = RiskCategory::ALL
        .into_iter()
        .map(|category| {
            let level = category.level(scores);
            RiskTrend {
                category,
                current_risk_level: level,
                factor_scores: scores.resolve_all(&category.factors()),
                trend_pattern: category.trend_pattern().to_string(),
                peak_weeks: category.peak_weeks().to_vec(),
                monitoring_recommendations: monitoring_recommendations(category, level),
            }
        })
        .collect();

    let weeks: BTreeSet<u8> = trends
        .iter()
        .flat_map(|t| t.peak_weeks.iter().copied())
        .collect();

    let early_warning = trends
        .iter()
        .filter(|t| t.current_risk_level == RiskLevel::High)
        .map(|t| format!("Monitor {} closely during weeks {:?}", t.category, t.peak_weeks))
        .collect();

    RiskTrending {
        overall_risk_score: round2(overall),
        risk_trends: trends,
        critical_monitoring_weeks: weeks.into_iter().collect(),
        early_warning_indicators: early_warning,
    }
}

/// Actions drawn from task, budget and scope predictions.
pub fn recommended_actions(
    tasks: &[TaskPrediction],
    budget: &BudgetOverrunRisk,
    scope: &ScopeCreepRisk,
) -> Vec<String> {
    let mut actions = Vec::new();
    if budget.risk_level == RiskLevel::High {
        actions.push(
            "High budget overrun risk detected. Review resource allocation and create a contingency plan."
                .to_string(),
        );
    }
    if scope.impact_level == RiskLevel::High {
        actions.push("High scope creep risk. Implement a strict change control process.".to_string());
    }
    let high_risk = tasks.iter().filter(|t| t.risk_level == RiskLevel::High).count();
    if high_risk > 2 {
        actions.push(format!(
            "Multiple high-risk tasks detected ({high_risk}). Focus mitigation efforts on these tasks immediately."
        ));
    }
    if actions.is_empty() {
        actions.push(
            "Project analytics are within acceptable parameters. Continue with standard monitoring."
                .to_string(),
        );
    }
    actions
}

/// All estimators for one assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictiveSnapshot {
    pub success_probability: f64,
    pub task_predictions: Vec<TaskPrediction>,
    pub budget_risk: BudgetOverrunRisk,
    pub scope_creep_risk: ScopeCreepRisk,
    pub timeline_optimization: TimelineOptimization,
    pub risk_trending: RiskTrending,
    pub recommended_actions: Vec<String>,
}

pub fn snapshot(
    assessment_type: AssessmentTypeId,
    scores: &DimensionScores,
    overall: f64,
    total_budget: f64,
) -> PredictiveSnapshot {
    let tasks = predict_all_tasks(scores, overall);
    let budget = predict_budget_overrun(scores, total_budget);
    let scope = predict_scope_creep(assessment_type, scores);
    let actions = recommended_actions(&tasks, &budget, &scope);

    tracing::debug!(
        assessment_type = %assessment_type,
        overall,
        budget_risk = %budget.risk_level,
        scope_risk = %scope.impact_level,
        "computed predictive snapshot"
    );

    PredictiveSnapshot {
        success_probability: round1((overall * 18.0).clamp(15.0, 95.0)),
        task_predictions: tasks,
        budget_risk: budget,
        scope_creep_risk: scope,
        timeline_optimization: predict_timeline(scores),
        risk_trending: risk_trending(scores, overall),
        recommended_actions: actions,
    }
}
