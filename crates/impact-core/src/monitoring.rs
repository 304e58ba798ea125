//! Real-time risk monitoring over a running project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::{PredictiveSnapshot, RiskTrending, TimelineOutlook};
use crate::scores::{round1, RiskLevel};
use crate::workflow::Project;

const HIGH_UTILIZATION: f64 = 80.0;
const MEDIUM_UTILIZATION: f64 = 60.0;

/// Progress below this with utilization above [`SCHEDULE_UTILIZATION`]
/// raises a schedule alert.
const SCHEDULE_PROGRESS: f64 = 60.0;
const SCHEDULE_UTILIZATION: f64 = 70.0;

/// Slack in percentage points before a project counts as behind schedule.
const SCHEDULE_SLACK: f64 = 10.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MonitoringAlertKind {
    Budget,
    Schedule,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Green,
    Amber,
    Red,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringAlert {
    #[serde(rename = "type")]
    pub kind: MonitoringAlertKind,
    pub severity: RiskLevel,
    pub message: String,
    pub recommended_action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentStatus {
    pub overall_progress: f64,
    pub current_week: u8,
    pub budget_utilization: f64,
    pub health_status: HealthStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendAnalysis {
    pub budget_trend: String,
    pub schedule_trend: String,
    pub scope_trend: String,
    pub predictive_trending_data: RiskTrending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictiveInsights {
    pub completion_probability: f64,
    pub budget_overrun_risk: RiskLevel,
    pub timeline_outlook: TimelineOutlook,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskMonitoring {
    pub project_id: String,
    pub project_name: String,
    pub current_status: CurrentStatus,
    pub risk_alerts: Vec<MonitoringAlert>,
    pub trend_analysis: TrendAnalysis,
    pub predictive_insights: PredictiveInsights,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Plan week the project is in, estimated from progress.
pub fn current_week(progress: f64) -> u8 {
    let week = (progress / 10.0).floor().max(0.0) as u8 + 1;
    week.clamp(1, 10)
}

pub fn monitoring_alerts(progress: f64, utilization: f64) -> Vec<MonitoringAlert> {
    let mut alerts = Vec::new();
    if utilization > HIGH_UTILIZATION {
        alerts.push(MonitoringAlert {
            kind: MonitoringAlertKind::Budget,
            severity: RiskLevel::High,
            message: format!("Budget utilization at {utilization:.1}% - immediate attention required"),
            recommended_action: "Review remaining activities and implement cost controls".into(),
        });
    } else if utilization > MEDIUM_UTILIZATION {
        alerts.push(MonitoringAlert {
            kind: MonitoringAlertKind::Budget,
            severity: RiskLevel::Medium,
            message: format!("Budget utilization at {utilization:.1}% - monitor closely"),
            recommended_action: "Review upcoming expenses and optimize resource allocation".into(),
        });
    }
    if progress < SCHEDULE_PROGRESS && utilization > SCHEDULE_UTILIZATION {
        alerts.push(MonitoringAlert {
            kind: MonitoringAlertKind::Schedule,
            severity: RiskLevel::High,
            message: "Project behind schedule with high budget utilization".into(),
            recommended_action: "Accelerate critical path activities and review scope".into(),
        });
    }
    alerts
}

pub fn real_time_recommendations(alerts: &[MonitoringAlert], progress: f64, utilization: f64) -> Vec<String> {
    let mut recs = Vec::new();
    if alerts.len() > 2 {
        recs.push("Implement immediate risk mitigation measures".to_string());
    }
    if utilization > progress + 10.0 {
        recs.push("Review and optimize resource allocation".to_string());
    }
    if progress < 50.0 {
        recs.push("Accelerate critical path activities".to_string());
    }
    recs
}

/// Percent of the start-to-target window elapsed at `now`, if a target is set.
fn elapsed_pct(project: &Project, now: DateTime<Utc>) -> Option<f64> {
    let target = project.target_completion_date?;
    let window = (target - project.start_date).num_seconds();
    if window <= 0 {
        return Some(100.0);
    }
    let elapsed = (now - project.start_date).num_seconds().clamp(0, window);
    Some(elapsed as f64 / window as f64 * 100.0)
}

fn health(alerts: &[MonitoringAlert]) -> HealthStatus {
    if alerts.iter().any(|a| a.severity == RiskLevel::High) {
        HealthStatus::Red
    } else if alerts.is_empty() {
        HealthStatus::Green
    } else {
        HealthStatus::Amber
    }
}

/// Risk monitoring snapshot of `project` against `total_budget`.
pub fn monitor(
    project: &Project,
    total_budget: f64,
    predictive: &PredictiveSnapshot,
    now: DateTime<Utc>,
) -> RiskMonitoring {
    let progress = project.progress_percentage;
    let utilization = if total_budget > 0.0 {
        project.spent_budget / total_budget * 100.0
    } else {
        0.0
    };
    let alerts = monitoring_alerts(progress, utilization);

    let schedule_trend = match elapsed_pct(project, now) {
        Some(elapsed) if progress + SCHEDULE_SLACK < elapsed => "Behind Schedule",
        _ => "On Track",
    };
    let budget_trend = if utilization <= progress { "On Track" } else { "Over Budget" };
    let scope_trend = if alerts.is_empty() { "Stable" } else { "At Risk" };

    tracing::debug!(
        project_id = %project.id,
        progress,
        utilization,
        alerts = alerts.len(),
        "computed risk monitoring"
    );

    RiskMonitoring {
        project_id: project.id.clone(),
        project_name: project.name.clone(),
        current_status: CurrentStatus {
            overall_progress: round1(progress),
            current_week: current_week(progress),
            budget_utilization: round1(utilization),
            health_status: health(&alerts),
        },
        recommendations: real_time_recommendations(&alerts, progress, utilization),
        trend_analysis: TrendAnalysis {
            budget_trend: budget_trend.into(),
            schedule_trend: schedule_trend.into(),
            scope_trend: scope_trend.into(),
            predictive_trending_data: predictive.risk_trending.clone(),
        },
        predictive_insights: PredictiveInsights {
            completion_probability: predictive.success_probability,
            budget_overrun_risk: predictive.budget_risk.risk_level,
            timeline_outlook: predictive.timeline_optimization.timeline_outlook,
        },
        risk_alerts: alerts,
        generated_at: now,
    }
}
