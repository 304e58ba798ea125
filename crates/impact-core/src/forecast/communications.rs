//! Templated stakeholder communications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommunicationFrequency, ProjectForecast};
use crate::budget::{AlertKind, BudgetAlert, BudgetTracking};
use crate::scores::Severity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StakeholderMessages {
    pub executive_leadership: String,
    pub project_team: String,
    pub client_stakeholders: String,
    pub technical_teams: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertNotification {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub action_required: String,
    pub urgent: bool,
}

impl From<&BudgetAlert> for AlertNotification {
    fn from(alert: &BudgetAlert) -> Self {
        Self {
            kind: alert.kind,
            severity: alert.severity,
            message: alert.message.clone(),
            action_required: alert.recommended_action.clone(),
            urgent: alert.severity.is_urgent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StakeholderCommunications {
    pub communication_date: DateTime<Utc>,
    pub executive_summary: String,
    pub detailed_report: String,
    pub stakeholder_messages: StakeholderMessages,
    pub alert_notifications: Vec<AlertNotification>,
    pub recommended_frequency: CommunicationFrequency,
    pub next_communication_date: DateTime<Utc>,
    pub escalation_required: bool,
}

fn executive_summary(project_name: &str, forecast: &ProjectForecast, alerts: &[BudgetAlert]) -> String {
    let urgent = alerts.iter().filter(|a| a.severity.is_urgent()).count();
    let mut summary = format!(
        "Project {project_name} Status Update:\n\nOverall Success Score: {}%\nBudget Health: {}\n",
        forecast.overall_success_score, forecast.budget_health
    );
    if urgent > 0 {
        summary.push_str(&format!("Critical Alerts: {urgent} requiring immediate attention\n"));
    } else {
        summary.push_str("No critical issues identified\n");
    }
    summary
}

fn detailed_report(tracking: &BudgetTracking, forecast: &ProjectForecast) -> String {
    let metrics = &tracking.overall_metrics;
    format!(
        "Detailed Project Status Report\n{rule}\n\n\
         Budget Utilization: {util:.1}%\n\
         Cost Performance Index: {cpi}\n\
         Projected Final Cost: ${cost:.0}\n\
         Overall Success Probability: {success:.1}%\n",
        rule = "=".repeat(50),
        util = metrics.budget_utilization,
        cpi = metrics.cost_performance_index,
        cost = metrics.projected_final_cost,
        success = forecast.overall_success_score,
    )
}

/// Render the communication pack for one project at `now`.
pub fn communicate(
    project_name: &str,
    tracking: &BudgetTracking,
    forecast: &ProjectForecast,
    now: DateTime<Utc>,
) -> StakeholderCommunications {
    let alerts = &tracking.budget_alerts;
    let summary = executive_summary(project_name, forecast, alerts);
    let frequency = forecast.recommended_frequency();

    let mut executive = format!("Executive Leadership Update:\n\n{summary}\n");
    if forecast.budget_health.is_troubled() {
        executive.push_str("Immediate executive attention required for budget situation.\n");
    }

    StakeholderCommunications {
        communication_date: now,
        detailed_report: detailed_report(tracking, forecast),
        stakeholder_messages: StakeholderMessages {
            executive_leadership: executive,
            project_team: "Team Update: Project progressing with focus on budget management and quality delivery."
                .to_string(),
            client_stakeholders: format!(
                "Client Update: Project {project_name} maintaining {}% success probability.",
                forecast.overall_success_score
            ),
            technical_teams: "Technical Update: Focus on technical readiness and resource optimization."
                .to_string(),
        },
        executive_summary: summary,
        alert_notifications: alerts.iter().map(AlertNotification::from).collect(),
        recommended_frequency: frequency,
        next_communication_date: frequency.next_after(now),
        escalation_required: alerts.iter().any(|a| a.severity.is_urgent()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{track, BudgetLedger, TaskActuals};
    use crate::catalog::AssessmentTypeId;
    use crate::forecast::forecast;
    use crate::planner::build_plan;
    use crate::scores::DimensionScores;

    #[test]
    fn calm_project_is_biweekly() {
        let scores = DimensionScores::new();
        let plan = build_plan(AssessmentTypeId::GeneralReadiness, &scores, 4.2);
        let tracking = track(&plan, &BudgetLedger::new(), None);
        let f = forecast(&scores, tracking.overall_metrics.budget_health);
        let now = Utc::now();
        let comms = communicate("Atlas", &tracking, &f, now);

        assert!(comms.executive_summary.starts_with("Project Atlas Status Update:"));
        assert!(comms.executive_summary.contains("No critical issues identified"));
        assert!(!comms.escalation_required);
        assert_eq!(comms.recommended_frequency, CommunicationFrequency::BiWeekly);
        assert_eq!(comms.next_communication_date, now + chrono::Duration::weeks(2));
        assert!(comms.detailed_report.contains("Projected Final Cost: $82000"));
        assert!(comms
            .stakeholder_messages
            .client_stakeholders
            .contains("Project Atlas maintaining 78.8% success probability"));
    }

    #[test]
    fn critical_spend_escalates() {
        let scores = DimensionScores::new();
        let plan = build_plan(AssessmentTypeId::GeneralReadiness, &scores, 4.2);
        let mut ledger = BudgetLedger::new();
        ledger.insert(
            "task_9".into(),
            TaskActuals {
                spent: 80_000.0,
                completion_percentage: 50.0,
                elapsed_weeks: 4.0,
            },
        );
        let tracking = track(&plan, &ledger, None);
        let f = forecast(&scores, tracking.overall_metrics.budget_health);
        let comms = communicate("Atlas", &tracking, &f, Utc::now());

        assert!(comms.escalation_required);
        assert!(comms.alert_notifications[0].urgent);
        assert!(comms.executive_summary.contains("Critical Alerts: 1"));
        assert!(comms
            .stakeholder_messages
            .executive_leadership
            .contains("Immediate executive attention required"));
        assert_eq!(comms.recommended_frequency, CommunicationFrequency::Daily);
    }
}
