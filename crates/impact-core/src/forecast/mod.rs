//! Project forecaster.
//!
//! Combines factor scores with budget health into five outcome
//! probabilities, a weighted success score and a delivery confidence.

pub mod communications;
pub mod excellence;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::budget::BudgetHealth;
use crate::scores::{round1, round2, DimensionScores, RiskLevel};

pub use communications::{communicate, AlertNotification, StakeholderCommunications, StakeholderMessages};
pub use excellence::{track_excellence, ExcellenceTracking};

/// Weights for time, budget, scope, quality and satisfaction.
pub const OUTCOME_WEIGHTS: [f64; 5] = [0.25, 0.25, 0.20, 0.15, 0.15];

const DELIVERY_FACTORS: [&str; 4] = [
    "technical_readiness",
    "resource_availability",
    "stakeholder_engagement",
    "change_management_maturity",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryOutcomes {
    pub on_time_delivery: f64,
    pub budget_compliance: f64,
    pub scope_completion: f64,
    pub quality_achievement: f64,
    pub stakeholder_satisfaction: f64,
}

impl DeliveryOutcomes {
    pub fn compute(scores: &DimensionScores, health: BudgetHealth) -> Self {
        let resource = scores.factor("resource_availability");
        let maturity = scores.factor("change_management_maturity");
        let stakeholders = scores.factor("stakeholder_engagement");
        let technical = scores.factor("technical_readiness");
        let communication = scores.factor("communication_effectiveness");

        let mut on_time = 75.0;
        if resource >= 4.0 {
            on_time += 10.0;
        }
        if maturity >= 4.0 {
            on_time += 10.0;
        }
        if health.is_troubled() {
            on_time -= 15.0;
        }

        let budget = match health {
            BudgetHealth::Excellent => 90.0,
            BudgetHealth::Good => 80.0,
            BudgetHealth::Concerning => 60.0,
            BudgetHealth::Critical => 40.0,
        };

        let mut scope = 80.0;
        if stakeholders >= 4.0 {
            scope += 10.0;
        }
        if maturity < 3.0 {
            scope -= 15.0;
        }

        let mut quality = 85.0;
        if technical >= 4.0 {
            quality += 10.0;
        }
        if resource < 3.0 {
            quality -= 10.0;
        }

        let mut satisfaction = 75.0;
        if communication >= 4.0 {
            satisfaction += 15.0;
        }
        if stakeholders >= 4.0 {
            satisfaction += 10.0;
        }

        Self {
            on_time_delivery: f64::clamp(on_time, 30.0, 95.0),
            budget_compliance: budget,
            scope_completion: f64::clamp(scope, 50.0, 95.0),
            quality_achievement: f64::clamp(quality, 60.0, 95.0),
            stakeholder_satisfaction: f64::clamp(satisfaction, 50.0, 95.0),
        }
    }

    pub fn as_array(&self) -> [f64; 5] {
        [
            self.on_time_delivery,
            self.budget_compliance,
            self.scope_completion,
            self.quality_achievement,
            self.stakeholder_satisfaction,
        ]
    }

    /// Weighted mean over [`OUTCOME_WEIGHTS`].
    pub fn success_score(&self) -> f64 {
        self.as_array()
            .iter()
            .zip(OUTCOME_WEIGHTS)
            .map(|(value, weight)| value * weight)
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManufacturingCorrelation {
    pub correlation_strength: f64,
    pub maintenance_excellence_potential: f64,
    pub operational_performance_impact: f64,
    pub manufacturing_readiness: RiskLevel,
    pub excellence_pathway: Vec<String>,
}

pub fn manufacturing_correlation(scores: &DimensionScores, quality: f64, scope: f64) -> ManufacturingCorrelation {
    let maintenance = scores.factor("maintenance_operations_alignment");
    let operational = (quality + scope) / 2.0;
    let strength = ((maintenance / 5.0) * (operational / 100.0)).min(1.0);

    let readiness = if maintenance >= 4.0 {
        RiskLevel::High
    } else if maintenance >= 3.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let foundation = if maintenance >= 4.0 {
        "Strong foundation for maintenance excellence established"
    } else {
        "Focus on building maintenance-operations alignment"
    };
    let potential = if operational >= 80.0 {
        "High potential for operational performance improvements"
    } else {
        "Develop operational excellence capabilities"
    };

    ManufacturingCorrelation {
        correlation_strength: round2(strength),
        maintenance_excellence_potential: round1(maintenance * 20.0),
        operational_performance_impact: round1(operational),
        manufacturing_readiness: readiness,
        excellence_pathway: vec![
            foundation.to_string(),
            potential.to_string(),
            "Implement continuous improvement processes".to_string(),
            "Measure and track manufacturing performance metrics".to_string(),
        ],
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommunicationFrequency {
    Daily,
    Weekly,
    #[serde(rename = "Bi-weekly")]
    BiWeekly,
}

impl CommunicationFrequency {
    pub fn determine(health: BudgetHealth, success_score: f64) -> Self {
        if health == BudgetHealth::Critical || success_score < 60.0 {
            CommunicationFrequency::Daily
        } else if health == BudgetHealth::Concerning || success_score < 75.0 {
            CommunicationFrequency::Weekly
        } else {
            CommunicationFrequency::BiWeekly
        }
    }

    pub fn interval(self) -> Duration {
        match self {
            CommunicationFrequency::Daily => Duration::days(1),
            CommunicationFrequency::Weekly => Duration::weeks(1),
            CommunicationFrequency::BiWeekly => Duration::weeks(2),
        }
    }

    pub fn next_after(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.interval()
    }
}

/// Forecaster output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectForecast {
    pub forecasting_confidence: f64,
    pub confidence_level: RiskLevel,
    pub overall_success_score: f64,
    pub delivery_outcomes: DeliveryOutcomes,
    pub success_drivers: Vec<String>,
    pub risk_mitigations: Vec<String>,
    pub manufacturing_excellence: ManufacturingCorrelation,
    pub recommendations: Vec<String>,
    pub budget_health: BudgetHealth,
    pub generated_at: DateTime<Utc>,
}

impl ProjectForecast {
    pub fn recommended_frequency(&self) -> CommunicationFrequency {
        CommunicationFrequency::determine(self.budget_health, self.overall_success_score)
    }
}

fn success_drivers(scores: &DimensionScores) -> Vec<String> {
    [
        ("leadership_support", "Strong leadership commitment"),
        ("resource_availability", "Adequate resource allocation"),
        ("change_management_maturity", "High change management maturity"),
    ]
    .into_iter()
    .filter(|(factor, _)| scores.factor(factor) >= 4.0)
    .map(|(_, driver)| driver.to_string())
    .collect()
}

fn risk_mitigations(scores: &DimensionScores, outcomes: &DeliveryOutcomes) -> Vec<String> {
    let mut mitigations = Vec::new();
    if outcomes.budget_compliance < 70.0 {
        mitigations.push("Implement weekly budget review and approval process".to_string());
    }
    if scores.factor("technical_readiness") < 3.0 {
        mitigations.push("Provide additional technical training and support".to_string());
    }
    mitigations
}

fn success_recommendations(outcomes: &DeliveryOutcomes) -> Vec<String> {
    let mut recommendations = Vec::new();
    if outcomes.on_time_delivery < 70.0 {
        recommendations.push("Implement accelerated timeline recovery plan".to_string());
    }
    if outcomes.budget_compliance < 70.0 {
        recommendations.push("Activate budget control measures immediately".to_string());
    }
    if outcomes.stakeholder_satisfaction < 70.0 {
        recommendations.push("Enhance stakeholder engagement and communication".to_string());
    }
    recommendations
}

/// Run the forecaster against the current budget health.
pub fn forecast(scores: &DimensionScores, budget_health: BudgetHealth) -> ProjectForecast {
    let confidence = (scores.mean_of(&DELIVERY_FACTORS) * 20.0).clamp(20.0, 95.0);
    let confidence_level = if confidence > 80.0 {
        RiskLevel::High
    } else if confidence > 60.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let outcomes = DeliveryOutcomes::compute(scores, budget_health);
    let success = outcomes.success_score();
    let correlation = manufacturing_correlation(
        scores,
        outcomes.quality_achievement,
        outcomes.scope_completion,
    );

    tracing::debug!(
        success,
        confidence,
        health = %budget_health,
        "computed project forecast"
    );

    ProjectForecast {
        forecasting_confidence: round1(confidence),
        confidence_level,
        overall_success_score: round1(success),
        success_drivers: success_drivers(scores),
        risk_mitigations: risk_mitigations(scores, &outcomes),
        recommendations: success_recommendations(&outcomes),
        manufacturing_excellence: correlation,
        delivery_outcomes: outcomes,
        budget_health,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_scores_with_good_budget() {
        let f = forecast(&DimensionScores::new(), BudgetHealth::Good);
        let o = &f.delivery_outcomes;
        assert_eq!(o.as_array(), [75.0, 80.0, 80.0, 85.0, 75.0]);
        // 18.75 + 20 + 16 + 12.75 + 11.25
        assert_eq!(f.overall_success_score, 78.8);
        assert_eq!(f.forecasting_confidence, 60.0);
        assert_eq!(f.confidence_level, RiskLevel::Low);
        assert!(f.recommendations.is_empty());
        assert_eq!(f.recommended_frequency(), CommunicationFrequency::BiWeekly);
    }

    #[test]
    fn strong_scores_hit_caps() {
        let scores = DimensionScores::new()
            .with("resource_availability", 5.0)
            .with("organizational_culture", 5.0)
            .with("stakeholder_engagement", 5.0)
            .with("technical_infrastructure", 5.0)
            .with("leadership_commitment", 5.0);
        let f = forecast(&scores, BudgetHealth::Excellent);
        let o = &f.delivery_outcomes;
        assert_eq!(o.on_time_delivery, 95.0);
        assert_eq!(o.scope_completion, 90.0);
        assert_eq!(o.quality_achievement, 95.0);
        // communication aliases stakeholder_engagement: 75 + 15 + 10
        assert_eq!(o.stakeholder_satisfaction, 95.0);
        assert_eq!(f.forecasting_confidence, 95.0);
        assert_eq!(f.confidence_level, RiskLevel::High);
        assert_eq!(f.success_drivers.len(), 3);
    }

    #[test]
    fn troubled_budget_drags_outcomes() {
        let scores = DimensionScores::new()
            .with("organizational_culture", 2.0)
            .with("technical_infrastructure", 2.0);
        let f = forecast(&scores, BudgetHealth::Critical);
        let o = &f.delivery_outcomes;
        assert_eq!(o.on_time_delivery, 60.0);
        assert_eq!(o.budget_compliance, 40.0);
        assert_eq!(o.scope_completion, 65.0);
        assert_eq!(
            f.recommendations,
            vec![
                "Implement accelerated timeline recovery plan".to_string(),
                "Activate budget control measures immediately".to_string(),
            ]
        );
        assert_eq!(f.risk_mitigations.len(), 2);
        assert_eq!(f.recommended_frequency(), CommunicationFrequency::Daily);
    }

    #[test]
    fn manufacturing_correlation_formula() {
        let scores = DimensionScores::new().with("maintenance_operations_alignment", 5.0);
        let c = manufacturing_correlation(&scores, 80.0, 90.0);
        assert_eq!(c.correlation_strength, 0.85);
        assert_eq!(c.maintenance_excellence_potential, 100.0);
        assert_eq!(c.manufacturing_readiness, RiskLevel::High);
        assert_eq!(
            c.excellence_pathway[0],
            "Strong foundation for maintenance excellence established"
        );
    }

    #[test]
    fn frequency_ladder() {
        let now = Utc::now();
        assert_eq!(
            CommunicationFrequency::determine(BudgetHealth::Good, 70.0),
            CommunicationFrequency::Weekly
        );
        assert_eq!(
            CommunicationFrequency::determine(BudgetHealth::Concerning, 90.0),
            CommunicationFrequency::Weekly
        );
        assert_eq!(
            CommunicationFrequency::Weekly.next_after(now) - now,
            Duration::days(7)
        );
    }
}
