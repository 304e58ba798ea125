//! Manufacturing excellence tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{manufacturing_correlation, DeliveryOutcomes};
use crate::scores::{round1, round2, DimensionScores};

const EXCELLENCE_SUCCESS_FACTORS: [&str; 4] = [
    "Maintenance-operations alignment",
    "Technical readiness and adoption",
    "Workforce adaptability and training",
    "Safety and compliance integration",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaintenanceExcellence {
    pub current_score: f64,
    pub potential_score: f64,
    pub improvement_pathway: Vec<String>,
    pub critical_success_factors: Vec<String>,
}

/// Predicted improvements, in percent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformancePredictions {
    pub unplanned_downtime_reduction: f64,
    pub oee_improvement: f64,
    pub maintenance_cost_reduction: f64,
    pub safety_improvement: f64,
    pub operational_efficiency: f64,
}

impl PerformancePredictions {
    fn total(&self) -> f64 {
        self.unplanned_downtime_reduction
            + self.oee_improvement
            + self.maintenance_cost_reduction
            + self.safety_improvement
            + self.operational_efficiency
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BusinessCaseStrength {
    Strong,
    Moderate,
    Developing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoiAnalysis {
    pub estimated_annual_savings: f64,
    pub implementation_investment: f64,
    pub roi_percentage: f64,
    pub payback_period_months: f64,
    pub business_case_strength: BusinessCaseStrength,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationMetrics {
    pub maintenance_operations_correlation: f64,
    pub technology_adoption_correlation: f64,
    pub workforce_readiness_correlation: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManufacturingKpis {
    pub equipment_reliability: f64,
    pub planned_maintenance_ratio: f64,
    pub mean_time_to_repair_hours: f64,
    pub maintenance_productivity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExcellenceTracking {
    pub maintenance_excellence: MaintenanceExcellence,
    pub performance_predictions: PerformancePredictions,
    pub roi_analysis: RoiAnalysis,
    pub correlation_metrics: CorrelationMetrics,
    pub manufacturing_kpis: ManufacturingKpis,
    pub generated_at: DateTime<Utc>,
}

fn roi(savings: f64, cost: f64) -> RoiAnalysis {
    let roi = if cost > 0.0 {
        (savings - cost) / cost * 100.0
    } else {
        0.0
    };
    let payback = if roi > 0.0 {
        (12.0 / (roi / 100.0)).clamp(6.0, 36.0)
    } else {
        36.0
    };
    let strength = if roi > 50.0 {
        BusinessCaseStrength::Strong
    } else if roi > 20.0 {
        BusinessCaseStrength::Moderate
    } else {
        BusinessCaseStrength::Developing
    };
    RoiAnalysis {
        estimated_annual_savings: savings.round(),
        implementation_investment: cost,
        roi_percentage: round1(roi),
        payback_period_months: round1(payback),
        business_case_strength: strength,
    }
}

/// Excellence tracking for a manufacturing project costing `implementation_cost`.
pub fn track_excellence(
    scores: &DimensionScores,
    outcomes: &DeliveryOutcomes,
    implementation_cost: f64,
) -> ExcellenceTracking {
    let maintenance = scores.factor("maintenance_operations_alignment");
    let technical = scores.factor("technical_readiness");
    let workforce = scores.factor("workforce_adaptability");
    let safety = scores.factor("safety_compliance");
    let efficiency = (technical + workforce + safety) / 3.0;

    let predictions = PerformancePredictions {
        unplanned_downtime_reduction: round1((maintenance * 12.0).clamp(10.0, 60.0)),
        oee_improvement: round1((maintenance * 7.0).clamp(5.0, 35.0)),
        maintenance_cost_reduction: round1((maintenance * 6.0).clamp(5.0, 30.0)),
        safety_improvement: round1((safety * 5.0).clamp(5.0, 25.0)),
        operational_efficiency: round1((efficiency * 8.0).clamp(5.0, 40.0)),
    };
    let correlation = manufacturing_correlation(
        scores,
        outcomes.quality_achievement,
        outcomes.scope_completion,
    );

    ExcellenceTracking {
        maintenance_excellence: MaintenanceExcellence {
            current_score: round1(maintenance),
            potential_score: (maintenance + 1.5).min(5.0),
            improvement_pathway: correlation.excellence_pathway,
            critical_success_factors: EXCELLENCE_SUCCESS_FACTORS
                .iter()
                .map(|f| (*f).to_string())
                .collect(),
        },
        roi_analysis: roi(predictions.total() * 1000.0, implementation_cost),
        performance_predictions: predictions,
        correlation_metrics: CorrelationMetrics {
            maintenance_operations_correlation: correlation.correlation_strength,
            technology_adoption_correlation: round2(technical / 5.0),
            workforce_readiness_correlation: round2(workforce / 5.0),
        },
        manufacturing_kpis: ManufacturingKpis {
            equipment_reliability: round1(60.0 + maintenance * 8.0),
            planned_maintenance_ratio: round1(40.0 + maintenance * 12.0),
            mean_time_to_repair_hours: round1(24.0 - maintenance * 4.0),
            maintenance_productivity: round1(70.0 + efficiency * 6.0),
        },
        generated_at: Utc::now(),
    }
}
