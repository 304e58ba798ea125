//! Budget tracker.
//!
//! Combines an implementation plan with the project's spend ledger into
//! task, phase and project budget metrics, earned-value indices and alerts.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::planner::ImplementationPlan;
use crate::scores::{round1, round2, RiskLevel, Severity};

/// Lower bound on a task's CPI when projecting its final cost.
pub const CPI_FLOOR: f64 = 0.1;

/// Overall utilization thresholds, in percent.
pub const WARNING_UTILIZATION: f64 = 75.0;
pub const CRITICAL_UTILIZATION: f64 = 90.0;

/// Task budgets above this are flagged when the task is high-risk.
pub const HIGH_VALUE_TASK: f64 = 5000.0;

/// Runtime actuals recorded against one plan task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskActuals {
    #[serde(default)]
    pub spent: f64,
    #[serde(default)]
    pub completion_percentage: f64,
    #[serde(default)]
    pub elapsed_weeks: f64,
}

/// Actuals keyed by plan task id (`task_1`..`task_10`).
pub type BudgetLedger = BTreeMap<String, TaskActuals>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum BudgetHealth {
    Critical,
    Concerning,
    Good,
    Excellent,
}

impl BudgetHealth {
    pub fn from_cpi(cpi: f64) -> Self {
        if cpi >= 1.1 {
            BudgetHealth::Excellent
        } else if cpi >= 0.95 {
            BudgetHealth::Good
        } else if cpi >= 0.85 {
            BudgetHealth::Concerning
        } else {
            BudgetHealth::Critical
        }
    }

    pub fn is_troubled(self) -> bool {
        matches!(self, BudgetHealth::Concerning | BudgetHealth::Critical)
    }
}

impl fmt::Display for BudgetHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BudgetHealth::Excellent => "Excellent",
            BudgetHealth::Good => "Good",
            BudgetHealth::Concerning => "Concerning",
            BudgetHealth::Critical => "Critical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PerformanceTrend {
    #[serde(rename = "Above Budget")]
    AboveBudget,
    #[serde(rename = "On Budget")]
    OnBudget,
    #[serde(rename = "Under Budget")]
    UnderBudget,
}

impl PerformanceTrend {
    pub fn from_cpi(cpi: f64) -> Self {
        if cpi < 0.95 {
            PerformanceTrend::AboveBudget
        } else if cpi < 1.05 {
            PerformanceTrend::OnBudget
        } else {
            PerformanceTrend::UnderBudget
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskBudget {
    pub week: u8,
    pub task_id: String,
    pub task_name: String,
    pub phase: String,
    pub budgeted_amount: f64,
    pub spent_amount: f64,
    pub remaining_amount: f64,
    pub variance: f64,
    pub variance_percentage: f64,
    pub risk_level: RiskLevel,
    pub completion_percentage: f64,
    pub burn_rate: f64,
    pub projected_final_cost: f64,
    pub cost_performance_index: f64,
}

impl TaskBudget {
    fn earned_value(&self) -> f64 {
        self.budgeted_amount * self.completion_percentage / 100.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseBudget {
    pub phase_name: String,
    pub total_budgeted: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub variance: f64,
    pub variance_percentage: f64,
    pub completion_percentage: f64,
    pub risk_level: RiskLevel,
    pub tasks_count: u32,
    pub on_track_tasks: u32,
    pub at_risk_tasks: u32,
    pub overrun_tasks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverallBudgetMetrics {
    /// Sum of plan task budgets.
    pub total_budgeted: f64,
    /// Project budget, or the plan total when the project has none.
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub budget_utilization: f64,
    pub earned_value: f64,
    pub projected_final_cost: f64,
    pub cost_variance: f64,
    pub cost_variance_percentage: f64,
    pub cost_performance_index: f64,
    pub variance_at_completion: f64,
    pub budget_health: BudgetHealth,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlertKind {
    Critical,
    Warning,
    Risk,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlertCategory {
    #[serde(rename = "Overall Budget")]
    OverallBudget,
    #[serde(rename = "Task Budget")]
    TaskBudget,
    #[serde(rename = "Phase Budget")]
    PhaseBudget,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetAlert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub category: AlertCategory,
    pub severity: Severity,
    pub message: String,
    pub recommended_action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostForecast {
    pub estimated_final_cost: f64,
    pub cost_overrun_risk: f64,
    pub funds_remaining: f64,
    pub performance_trend: PerformanceTrend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetTracking {
    pub task_level_budgets: Vec<TaskBudget>,
    pub phase_level_budgets: Vec<PhaseBudget>,
    pub overall_metrics: OverallBudgetMetrics,
    pub budget_alerts: Vec<BudgetAlert>,
    pub cost_forecasting: CostForecast,
    pub generated_at: DateTime<Utc>,
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

fn task_budget(week: &crate::planner::PlanWeek, actuals: &TaskActuals) -> TaskBudget {
    let budgeted = week.final_budget as f64;
    let spent = actuals.spent;
    let variance = spent - budgeted;
    let earned = budgeted * actuals.completion_percentage / 100.0;
    let cpi = if spent > 0.0 { earned / spent } else { 1.0 };
    let burn_rate = if actuals.elapsed_weeks > 0.0 {
        spent / actuals.elapsed_weeks
    } else {
        0.0
    };

    TaskBudget {
        week: week.week,
        task_id: week.task_id.clone(),
        task_name: week.title.clone(),
        phase: week.phase.clone(),
        budgeted_amount: budgeted,
        spent_amount: round2(spent),
        remaining_amount: round2(budgeted - spent),
        variance: round2(variance),
        variance_percentage: round1(percent_of(variance, budgeted)),
        risk_level: week.risk_level,
        completion_percentage: actuals.completion_percentage,
        burn_rate: round2(burn_rate),
        projected_final_cost: round2(budgeted / cpi.max(CPI_FLOOR)),
        cost_performance_index: round2(cpi),
    }
}

fn phase_budgets(tasks: &[TaskBudget]) -> Vec<PhaseBudget> {
    // Phase labels keep plan order.
    let mut order: Vec<&str> = Vec::new();
    for t in tasks {
        if !order.contains(&t.phase.as_str()) {
            order.push(&t.phase);
        }
    }

    order
        .into_iter()
        .map(|name| {
            let members: Vec<&TaskBudget> = tasks.iter().filter(|t| t.phase == name).collect();
            let budgeted: f64 = members.iter().map(|t| t.budgeted_amount).sum();
            let spent: f64 = members.iter().map(|t| t.spent_amount).sum();
            let count = members.len() as u32;
            let on_track = members.iter().filter(|t| t.risk_level == RiskLevel::Low).count() as u32;
            let at_risk = members.iter().filter(|t| t.risk_level == RiskLevel::High).count() as u32;
            let overrun = members
                .iter()
                .filter(|t| t.spent_amount > t.budgeted_amount)
                .count() as u32;
            let completion = if count > 0 {
                members.iter().map(|t| t.completion_percentage).sum::<f64>() / f64::from(count)
            } else {
                0.0
            };
            let risk_level = if at_risk > on_track {
                RiskLevel::High
            } else if overrun > 0 {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            };

            PhaseBudget {
                phase_name: name.to_string(),
                total_budgeted: budgeted,
                total_spent: round2(spent),
                total_remaining: round2(budgeted - spent),
                variance: round2(spent - budgeted),
                variance_percentage: round1(percent_of(spent - budgeted, budgeted)),
                completion_percentage: round1(completion),
                risk_level,
                tasks_count: count,
                on_track_tasks: on_track,
                at_risk_tasks: at_risk,
                overrun_tasks: overrun,
            }
        })
        .collect()
}

/// `12000.0` -> `12,000`.
fn thousands(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if whole < 0 {
        out.insert(0, '-');
    }
    out
}

/// Alert set for the given utilization, tasks and phases.
pub fn budget_alerts(utilization: f64, tasks: &[TaskBudget], phases: &[PhaseBudget]) -> Vec<BudgetAlert> {
    let mut alerts = Vec::new();

    if utilization > CRITICAL_UTILIZATION {
        alerts.push(BudgetAlert {
            kind: AlertKind::Critical,
            category: AlertCategory::OverallBudget,
            severity: Severity::Critical,
            message: format!("Project budget {utilization:.1}% utilized - immediate action required"),
            recommended_action: "Implement emergency cost controls and review remaining scope".into(),
            threshold: Some(CRITICAL_UTILIZATION),
            current_value: Some(round1(utilization)),
            task_id: None,
            phase_name: None,
        });
    } else if utilization > WARNING_UTILIZATION {
        alerts.push(BudgetAlert {
            kind: AlertKind::Warning,
            category: AlertCategory::OverallBudget,
            severity: Severity::Medium,
            message: format!("Project budget {utilization:.1}% utilized - monitor closely"),
            recommended_action: "Review upcoming expenses and optimize resource allocation".into(),
            threshold: Some(WARNING_UTILIZATION),
            current_value: Some(round1(utilization)),
            task_id: None,
            phase_name: None,
        });
    }

    alerts.extend(
        tasks
            .iter()
            .filter(|t| t.risk_level == RiskLevel::High && t.budgeted_amount > HIGH_VALUE_TASK)
            .map(|t| BudgetAlert {
                kind: AlertKind::Risk,
                category: AlertCategory::TaskBudget,
                severity: Severity::Medium,
                message: format!(
                    "High-risk task '{}' requires attention (${} budget)",
                    t.task_name,
                    thousands(t.budgeted_amount)
                ),
                recommended_action: "Implement additional oversight and controls for this task".into(),
                threshold: None,
                current_value: Some(t.budgeted_amount),
                task_id: Some(t.task_id.clone()),
                phase_name: None,
            }),
    );

    alerts.extend(
        phases
            .iter()
            .filter(|p| p.at_risk_tasks > p.on_track_tasks)
            .map(|p| BudgetAlert {
                kind: AlertKind::Risk,
                category: AlertCategory::PhaseBudget,
                severity: Severity::Medium,
                message: format!(
                    "Phase '{}' has more at-risk tasks ({}) than on-track tasks ({})",
                    p.phase_name, p.at_risk_tasks, p.on_track_tasks
                ),
                recommended_action: "Focus additional resources on this phase".into(),
                threshold: None,
                current_value: Some(f64::from(p.at_risk_tasks)),
                task_id: None,
                phase_name: Some(p.phase_name.clone()),
            }),
    );

    alerts
}

/// Run the tracker.
///
/// `project_budget` overrides the plan total as the denominator for
/// utilization and EAC when it is positive.
pub fn track(plan: &ImplementationPlan, ledger: &BudgetLedger, project_budget: Option<f64>) -> BudgetTracking {
    let empty = TaskActuals::default();
    let tasks: Vec<TaskBudget> = plan
        .weeks
        .values()
        .map(|w| task_budget(w, ledger.get(&w.task_id).unwrap_or(&empty)))
        .collect();
    let phases = phase_budgets(&tasks);

    let total_budgeted: f64 = tasks.iter().map(|t| t.budgeted_amount).sum();
    let total_budget = project_budget.filter(|b| *b > 0.0).unwrap_or(total_budgeted);
    let total_spent: f64 = tasks.iter().map(|t| t.spent_amount).sum();
    let earned: f64 = tasks.iter().map(TaskBudget::earned_value).sum();

    let cpi = if total_spent > 0.0 { earned / total_spent } else { 1.0 };
    let eac = if cpi > 0.0 { total_budget / cpi } else { total_budget };
    let health = BudgetHealth::from_cpi(cpi);
    let utilization = percent_of(total_spent, total_budget);

    let alerts = budget_alerts(utilization, &tasks, &phases);

    let forecast = CostForecast {
        estimated_final_cost: round2(eac),
        cost_overrun_risk: round1(percent_of(eac - total_budget, total_budget)).max(0.0),
        funds_remaining: round2(total_budget - eac).max(0.0),
        performance_trend: PerformanceTrend::from_cpi(cpi),
    };

    tracing::debug!(
        total_budget,
        total_spent,
        cpi,
        health = %health,
        alerts = alerts.len(),
        "computed budget tracking"
    );

    BudgetTracking {
        overall_metrics: OverallBudgetMetrics {
            total_budgeted,
            total_budget,
            total_spent: round2(total_spent),
            total_remaining: round2(total_budget - total_spent),
            budget_utilization: round1(utilization),
            earned_value: round2(earned),
            projected_final_cost: round2(eac),
            cost_variance: round2(total_spent - total_budget),
            cost_variance_percentage: round1(percent_of(total_spent - total_budget, total_budget)),
            cost_performance_index: round2(cpi),
            variance_at_completion: round2(total_budget - eac),
            budget_health: health,
        },
        task_level_budgets: tasks,
        phase_level_budgets: phases,
        budget_alerts: alerts,
        cost_forecasting: forecast,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssessmentTypeId;
    use crate::planner::build_plan;
    use crate::scores::DimensionScores;

    fn plan(overall: f64) -> ImplementationPlan {
        build_plan(AssessmentTypeId::GeneralReadiness, &DimensionScores::new(), overall)
    }

    fn spend(ledger: &mut BudgetLedger, task: &str, spent: f64, completion: f64) {
        ledger.insert(
            task.to_string(),
            TaskActuals {
                spent,
                completion_percentage: completion,
                elapsed_weeks: 1.0,
            },
        );
    }

    #[test]
    fn empty_ledger_is_on_budget() {
        let tracking = track(&plan(4.5), &BudgetLedger::new(), None);
        let overall = &tracking.overall_metrics;
        assert_eq!(overall.total_budget, 82_000.0);
        assert_eq!(overall.cost_performance_index, 1.0);
        assert_eq!(overall.budget_health, BudgetHealth::Good);
        assert_eq!(overall.projected_final_cost, 82_000.0);
        assert!(tracking.budget_alerts.is_empty());
        assert_eq!(tracking.cost_forecasting.performance_trend, PerformanceTrend::OnBudget);
        assert_eq!(tracking.phase_level_budgets.len(), 4);
        assert_eq!(tracking.phase_level_budgets[0].phase_name, "Plan");
        assert_eq!(tracking.phase_level_budgets[0].tasks_count, 3);
    }

    #[test]
    fn task_metrics() {
        let mut ledger = BudgetLedger::new();
        ledger.insert(
            "task_1".into(),
            TaskActuals {
                spent: 4000.0,
                completion_percentage: 25.0,
                elapsed_weeks: 2.0,
            },
        );
        let tracking = track(&plan(4.5), &ledger, None);
        let task = &tracking.task_level_budgets[0];
        assert_eq!(task.budgeted_amount, 8000.0);
        assert_eq!(task.variance, -4000.0);
        assert_eq!(task.remaining_amount, 4000.0);
        assert_eq!(task.burn_rate, 2000.0);
        assert_eq!(task.cost_performance_index, 0.5);
        assert_eq!(task.projected_final_cost, 16_000.0);
    }

    #[test]
    fn projected_cost_uses_cpi_floor() {
        let mut ledger = BudgetLedger::new();
        spend(&mut ledger, "task_2", 3000.0, 0.0);
        let tracking = track(&plan(4.5), &ledger, None);
        assert_eq!(tracking.task_level_budgets[1].projected_final_cost, 60_000.0);
        assert_eq!(tracking.overall_metrics.budget_health, BudgetHealth::Critical);
    }

    #[test]
    fn high_risk_plan_raises_task_and_phase_alerts() {
        let tracking = track(&plan(2.0), &BudgetLedger::new(), None);
        let task_alerts = tracking
            .budget_alerts
            .iter()
            .filter(|a| a.category == AlertCategory::TaskBudget)
            .count();
        let phase_alerts = tracking
            .budget_alerts
            .iter()
            .filter(|a| a.category == AlertCategory::PhaseBudget)
            .count();
        // every High week has a final budget above 5000
        assert_eq!(task_alerts, 10);
        assert_eq!(phase_alerts, 4);
        assert!(tracking.budget_alerts[0]
            .message
            .contains("High-risk task 'Kick-off Week' requires attention ($12,000 budget)"));
    }

    #[test]
    fn utilization_ladder() {
        let low_risk = plan(4.5);
        for (spent, expected) in [
            (70_000.0, None),
            (80_000.0, Some(Severity::Medium)),
            (95_000.0, Some(Severity::Critical)),
        ] {
            let mut ledger = BudgetLedger::new();
            spend(&mut ledger, "task_9", spent, 100.0);
            let tracking = track(&low_risk, &ledger, Some(100_000.0));
            let overall = tracking
                .budget_alerts
                .iter()
                .find(|a| a.category == AlertCategory::OverallBudget)
                .map(|a| a.severity);
            assert_eq!(overall, expected, "spent {spent}");
        }
    }

    #[test]
    fn forecast_reports_overrun() {
        let mut ledger = BudgetLedger::new();
        spend(&mut ledger, "task_1", 10_000.0, 100.0);
        let tracking = track(&plan(4.5), &ledger, Some(100_000.0));
        // earned 8000 / spent 10000
        assert_eq!(tracking.overall_metrics.cost_performance_index, 0.8);
        assert_eq!(tracking.cost_forecasting.estimated_final_cost, 125_000.0);
        assert_eq!(tracking.cost_forecasting.cost_overrun_risk, 25.0);
        assert_eq!(tracking.cost_forecasting.funds_remaining, 0.0);
        assert_eq!(tracking.cost_forecasting.performance_trend, PerformanceTrend::AboveBudget);
    }

    #[test]
    fn thousands_separator() {
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(12_000.0), "12,000");
        assert_eq!(thousands(1_234_567.0), "1,234,567");
    }
}
