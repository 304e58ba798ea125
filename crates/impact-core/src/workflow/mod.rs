//! IMPACT project workflow engine.
//!
//! A [`Project`] owns six [`PhaseInstance`]s plus their tasks, deliverables
//! and milestones. Every mutation here is in-memory and synchronous; the
//! service layer wraps them in a per-project critical section and persists
//! the result.

pub mod generate;
pub mod lifecycle;
pub mod model;
pub mod progress;

pub use generate::ProjectDraft;
pub use lifecycle::{
    gate_verdict, GateReviewInput, PhaseCompletion, PhaseContext, PhaseTransitionRecord, TransitionRequest,
    COMPLETION_THRESHOLD,
};
pub use model::{
    CompletionAnalysis, Deliverable, DeliverableStatus, GateReview, GateVerdict, Milestone, MilestoneStatus,
    PhaseInstance, PhaseStatus, Priority, Project, ProjectStatus, SuccessStatus, Task, TaskStatus,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::budget::TaskActuals;
use crate::catalog::PhaseId;
use crate::error::{CoreError, Result, ValidationError};
use crate::planner::ImplementationPlan;
use crate::scores::round1;

/// Tolerance between stored project progress and the phase mean.
const PROGRESS_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliverableUpdate {
    pub status: Option<DeliverableStatus>,
    pub content: Option<String>,
    pub approval_notes: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseProgressUpdate {
    pub completion_percentage: Option<f64>,
    pub budget_spent: Option<f64>,
    pub success_status: Option<SuccessStatus>,
    pub success_reason: Option<String>,
    pub failure_reason: Option<String>,
    pub lessons_learned: Option<String>,
    pub scope_changes: Option<Vec<String>>,
    pub risks_identified: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub target_completion_date: Option<DateTime<Utc>>,
    pub status: Option<ProjectStatus>,
    pub risks: Option<Vec<String>>,
    pub issues: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseSummary {
    pub phase: PhaseId,
    pub name: String,
    pub status: PhaseStatus,
    pub completion_percentage: f64,
    pub budget_spent: f64,
}

/// Phase counts, budget and success rate of a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowStatus {
    pub project_id: String,
    pub project_status: ProjectStatus,
    pub current_phase: PhaseId,
    pub progress_percentage: f64,
    pub phases_total: usize,
    pub phases_completed: usize,
    pub phases_in_progress: usize,
    pub phases_not_started: usize,
    pub phases_failed: usize,
    pub budget_spent: f64,
    pub total_budget: f64,
    pub budget_utilization: f64,
    pub success_rate: f64,
    pub next_milestone: Option<Milestone>,
    pub phases: Vec<PhaseSummary>,
}

fn non_negative(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CoreError::invalid(field, format!("must be a non-negative number, got {value}")))
    }
}

fn percentage(field: &str, value: f64) -> Result<f64> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(CoreError::invalid(field, format!("must be between 0 and 100, got {value}")))
    }
}

fn toggle(list: &mut Vec<String>, id: &str, present: bool) {
    let pos = list.iter().position(|x| x == id);
    match (pos, present) {
        (None, true) => list.push(id.to_string()),
        (Some(i), false) => {
            list.remove(i);
        }
        _ => {}
    }
}

impl Project {
    fn ensure_phase_open(&self, phase: PhaseId) -> Result<()> {
        match self.phase(phase).map(|p| p.status) {
            Some(status) if status.is_terminal() => {
                Err(CoreError::Conflict(format!("phase {phase} is already {status}")))
            }
            _ => Ok(()),
        }
    }

    /// Patch a task, stamping completion and starting its phase when work begins.
    pub fn update_task(&mut self, task_id: &str, update: &TaskUpdate, now: DateTime<Utc>) -> Result<Task> {
        self.ensure_active()?;
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| CoreError::not_found("task", task_id))?;
        let phase = self.tasks[idx].phase;
        self.ensure_phase_open(phase)?;

        let task = &mut self.tasks[idx];
        if let Some(status) = update.status {
            if !task.status.can_transition_to(&status) {
                return Err(CoreError::Conflict(format!(
                    "task {task_id} cannot move from {:?} to {:?}",
                    task.status, status
                )));
            }
            task.status = status;
            if status == TaskStatus::Completed {
                task.completed_date.get_or_insert(now);
            }
        }
        if let Some(assignee) = &update.assigned_to {
            task.assigned_to = Some(assignee.clone());
        }
        if let Some(due) = update.due_date {
            task.due_date = Some(due);
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(notes) = &update.notes {
            task.notes = Some(notes.clone());
        }
        let task = task.clone();

        if let Some(instance) = self.phase_mut(phase) {
            toggle(&mut instance.tasks_completed, &task.id, task.status == TaskStatus::Completed);
        }
        if task.status.is_started() {
            self.auto_start(phase, now);
        }
        self.recompute_phase(phase);
        tracing::info!(project_id = %self.id, task_id, status = ?task.status, "task updated");
        Ok(task)
    }

    pub fn update_deliverable(
        &mut self,
        deliverable_id: &str,
        update: &DeliverableUpdate,
        now: DateTime<Utc>,
    ) -> Result<Deliverable> {
        self.ensure_active()?;
        let idx = self
            .deliverables
            .iter()
            .position(|d| d.id == deliverable_id)
            .ok_or_else(|| CoreError::not_found("deliverable", deliverable_id))?;
        let phase = self.deliverables[idx].phase;
        self.ensure_phase_open(phase)?;

        let deliverable = &mut self.deliverables[idx];
        if let Some(status) = update.status {
            if !deliverable.status.can_transition_to(&status) {
                return Err(CoreError::Conflict(format!(
                    "deliverable {deliverable_id} cannot move from {:?} to {:?}",
                    deliverable.status, status
                )));
            }
            deliverable.status = status;
            if status.is_done() {
                deliverable.completed_date.get_or_insert(now);
            }
        }
        if let Some(content) = &update.content {
            deliverable.content = Some(content.clone());
        }
        if let Some(notes) = &update.approval_notes {
            deliverable.approval_notes = Some(notes.clone());
        }
        if let Some(assignee) = &update.assigned_to {
            deliverable.assigned_to = Some(assignee.clone());
        }
        if let Some(due) = update.due_date {
            deliverable.due_date = Some(due);
        }
        let deliverable = deliverable.clone();

        if let Some(instance) = self.phase_mut(phase) {
            toggle(
                &mut instance.deliverables_completed,
                &deliverable.id,
                deliverable.status.is_done(),
            );
        }
        if deliverable.status != DeliverableStatus::Pending {
            self.auto_start(phase, now);
        }
        self.recompute_phase(phase);
        tracing::info!(project_id = %self.id, deliverable_id, status = ?deliverable.status, "deliverable updated");
        Ok(deliverable)
    }

    /// Patch the runtime record of a phase. Closed phases only accept
    /// narrative fields.
    pub fn update_phase_progress(
        &mut self,
        phase: PhaseId,
        update: &PhaseProgressUpdate,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_active()?;
        let completion = update
            .completion_percentage
            .map(|v| percentage("completion_percentage", v))
            .transpose()?;
        let spent = update
            .budget_spent
            .map(|v| non_negative("budget_spent", v))
            .transpose()?;
        if completion.is_some() || spent.is_some() {
            self.ensure_phase_open(phase)?;
        }

        let instance = self
            .phase_mut(phase)
            .ok_or_else(|| CoreError::not_found("phase", phase.as_str()))?;
        if let Some(value) = completion {
            instance.completion_percentage = round1(value);
        }
        if let Some(value) = spent {
            instance.budget_spent = value;
        }
        if let Some(status) = update.success_status {
            instance.success_status = Some(status);
        }
        if let Some(reason) = &update.success_reason {
            instance.success_reason = Some(reason.clone());
        }
        if let Some(reason) = &update.failure_reason {
            instance.failure_reason = Some(reason.clone());
        }
        if let Some(lessons) = &update.lessons_learned {
            instance.lessons_learned = Some(lessons.clone());
        }
        if let Some(changes) = &update.scope_changes {
            instance.scope_changes = changes.clone();
        }
        if let Some(risks) = &update.risks_identified {
            instance.risks_identified = risks.clone();
        }

        if completion.is_some_and(|c| c > 0.0) {
            self.auto_start(phase, now);
        }
        self.refresh_progress();
        tracing::info!(project_id = %self.id, phase = %phase, "phase progress updated");
        Ok(())
    }

    /// Apply project-level field changes. Completion is reserved for the
    /// last phase.
    pub fn apply_patch(&mut self, patch: &ProjectPatch) -> Result<()> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyField("name".into()).into());
            }
        }
        if let Some(budget) = patch.budget {
            non_negative("budget", budget)?;
        }
        if let Some(status) = patch.status {
            if status == ProjectStatus::Completed && self.status != ProjectStatus::Completed {
                return Err(CoreError::invalid(
                    "status",
                    "projects complete by completing the track phase",
                ));
            }
            if !self.status.can_transition_to(&status) {
                return Err(CoreError::Conflict(format!(
                    "project cannot move from {} to {status}",
                    self.status
                )));
            }
            self.status = status;
        }
        if let Some(name) = &patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(budget) = patch.budget {
            self.budget = Some(budget);
        }
        if let Some(date) = patch.target_completion_date {
            self.target_completion_date = Some(date);
        }
        if let Some(risks) = &patch.risks {
            self.risks = risks.clone();
        }
        if let Some(issues) = &patch.issues {
            self.issues = issues.clone();
        }
        Ok(())
    }

    /// Record actual spend against a plan task and resum the project spend.
    pub fn record_spend(&mut self, plan: &ImplementationPlan, task_id: &str, actuals: TaskActuals) -> Result<()> {
        self.ensure_active()?;
        if plan.week_for_task(task_id).is_none() {
            return Err(CoreError::not_found("plan task", task_id));
        }
        non_negative("spent", actuals.spent)?;
        non_negative("elapsed_weeks", actuals.elapsed_weeks)?;
        percentage("completion_percentage", actuals.completion_percentage)?;

        self.budget_ledger.insert(task_id.to_string(), actuals);
        self.spent_budget = self.budget_ledger.values().map(|a| a.spent).sum();
        tracing::info!(project_id = %self.id, task_id, spent = self.spent_budget, "budget recorded");
        Ok(())
    }

    /// Phase counts and budget from phase spend against `total_budget`.
    pub fn workflow_status(&self, total_budget: f64) -> WorkflowStatus {
        let count = |status: PhaseStatus| self.phases.iter().filter(|p| p.status == status).count();
        let spent: f64 = self.phases.iter().map(|p| p.budget_spent).sum();
        let successful = self
            .phases
            .iter()
            .filter(|p| p.success_status == Some(SuccessStatus::Successful))
            .count();
        let total = self.phases.len().max(1);

        WorkflowStatus {
            project_id: self.id.clone(),
            project_status: self.status,
            current_phase: self.current_phase,
            progress_percentage: self.progress_percentage,
            phases_total: self.phases.len(),
            phases_completed: count(PhaseStatus::Completed),
            phases_in_progress: count(PhaseStatus::InProgress),
            phases_not_started: count(PhaseStatus::NotStarted),
            phases_failed: count(PhaseStatus::Failed),
            budget_spent: spent,
            total_budget,
            budget_utilization: if total_budget > 0.0 {
                round1(spent / total_budget * 100.0)
            } else {
                0.0
            },
            success_rate: round1(successful as f64 / total as f64 * 100.0),
            next_milestone: self.next_milestone().cloned(),
            phases: self
                .phases
                .iter()
                .map(|p| PhaseSummary {
                    phase: p.phase,
                    name: p.name.clone(),
                    status: p.status,
                    completion_percentage: p.completion_percentage,
                    budget_spent: p.budget_spent,
                })
                .collect(),
        }
    }

    /// Structural invariants checked before every write.
    pub fn check_invariants(&self) -> Result<()> {
        let layout_ok = self.phases.len() == PhaseId::ALL.len()
            && self
                .phases
                .iter()
                .zip(PhaseId::ALL)
                .all(|(instance, id)| instance.phase == id && instance.order == id.order());
        if !layout_ok {
            return Err(CoreError::Internal(format!(
                "project {} does not hold one instance per phase in order",
                self.id
            )));
        }

        let running: Vec<PhaseId> = self
            .phases
            .iter()
            .filter(|p| p.status == PhaseStatus::InProgress)
            .map(|p| p.phase)
            .collect();
        if running.len() > 1 {
            return Err(CoreError::Conflict(format!(
                "phases {running:?} are simultaneously in progress"
            )));
        }
        if let Some(phase) = running.first() {
            if *phase != self.current_phase {
                return Err(CoreError::Internal(format!(
                    "current phase {} differs from running phase {phase}",
                    self.current_phase
                )));
            }
        }

        let mean = progress::project_progress(self.phase_progress.values());
        if (mean - self.progress_percentage).abs() > PROGRESS_TOLERANCE {
            return Err(CoreError::Internal(format!(
                "progress {} drifted from phase mean {mean}",
                self.progress_percentage
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssessmentTypeId;
    use crate::planner::build_plan;
    use crate::scores::DimensionScores;

    fn project() -> Project {
        Project::blank(
            ProjectDraft {
                name: "Atlas".into(),
                ..Default::default()
            },
            "u1",
            "acme",
            Utc::now(),
        )
    }

    #[test]
    fn task_completion_is_stamped_once() {
        let mut p = project();
        let id = p.tasks[0].id.clone();
        let done = TaskUpdate {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let first = p.update_task(&id, &done, Utc::now()).unwrap();
        let stamp = first.completed_date.unwrap();
        let second = p.update_task(&id, &done, Utc::now()).unwrap();
        assert_eq!(second.completed_date, Some(stamp));
        assert_eq!(p.phase(PhaseId::Investigate).unwrap().tasks_completed, vec![id.clone()]);
        // one of seven tasks: 0.6 * 1/7
        assert_eq!(p.phase(PhaseId::Investigate).unwrap().completion_percentage, 8.6);
        p.check_invariants().unwrap();
    }

    #[test]
    fn unknown_task_is_not_found() {
        let mut p = project();
        let err = p.update_task("nope", &TaskUpdate::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "task", .. }));
    }

    #[test]
    fn blocked_completed_task_is_rejected() {
        let mut p = project();
        let id = p.tasks[0].id.clone();
        let set = |s| TaskUpdate {
            status: Some(s),
            ..Default::default()
        };
        p.update_task(&id, &set(TaskStatus::Completed), Utc::now()).unwrap();
        let err = p.update_task(&id, &set(TaskStatus::Blocked), Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn deliverable_approval_counts_fully() {
        let mut p = project();
        let id = p.deliverables[0].id.clone();
        let d = p
            .update_deliverable(
                &id,
                &DeliverableUpdate {
                    status: Some(DeliverableStatus::Approved),
                    approval_notes: Some("signed off".into()),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();
        assert!(d.completed_date.is_some());
        // 0.4 * 1/6
        assert_eq!(p.phase(PhaseId::Investigate).unwrap().completion_percentage, 6.7);
        assert_eq!(p.phase(PhaseId::Investigate).unwrap().status, PhaseStatus::InProgress);
    }

    #[test]
    fn progress_update_validates_ranges() {
        let mut p = project();
        let bad = PhaseProgressUpdate {
            completion_percentage: Some(120.0),
            ..Default::default()
        };
        assert!(p.update_phase_progress(PhaseId::Investigate, &bad, Utc::now()).is_err());
        let ok = PhaseProgressUpdate {
            completion_percentage: Some(60.0),
            budget_spent: Some(4_000.0),
            ..Default::default()
        };
        p.update_phase_progress(PhaseId::Investigate, &ok, Utc::now()).unwrap();
        assert_eq!(p.progress_percentage, 10.0);
        assert_eq!(p.phase_progress[&PhaseId::Investigate], 60.0);
    }

    #[test]
    fn patch_rejects_manual_completion() {
        let mut p = project();
        let patch = ProjectPatch {
            status: Some(ProjectStatus::Completed),
            ..Default::default()
        };
        assert!(p.apply_patch(&patch).is_err());
        let hold = ProjectPatch {
            status: Some(ProjectStatus::OnHold),
            name: Some("Atlas II".into()),
            ..Default::default()
        };
        p.apply_patch(&hold).unwrap();
        assert_eq!(p.name, "Atlas II");
        assert!(p.update_task(&p.tasks[0].id.clone(), &TaskUpdate::default(), Utc::now()).is_err());
    }

    #[test]
    fn spend_is_resummed() {
        let plan = build_plan(AssessmentTypeId::GeneralReadiness, &DimensionScores::new(), 3.0);
        let mut p = project();
        let actuals = |spent| TaskActuals {
            spent,
            completion_percentage: 50.0,
            elapsed_weeks: 1.0,
        };
        p.record_spend(&plan, "task_1", actuals(5_000.0)).unwrap();
        p.record_spend(&plan, "task_2", actuals(2_000.0)).unwrap();
        p.record_spend(&plan, "task_1", actuals(6_000.0)).unwrap();
        assert_eq!(p.spent_budget, 8_000.0);
        assert!(matches!(
            p.record_spend(&plan, "task_11", actuals(1.0)),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn workflow_status_counts_phases() {
        let mut p = project();
        p.update_phase_progress(
            PhaseId::Investigate,
            &PhaseProgressUpdate {
                completion_percentage: Some(30.0),
                budget_spent: Some(9_000.0),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        let s = p.workflow_status(90_000.0);
        assert_eq!(s.phases_total, 6);
        assert_eq!(s.phases_in_progress, 1);
        assert_eq!(s.phases_not_started, 5);
        assert_eq!(s.budget_utilization, 10.0);
        assert_eq!(s.success_rate, 0.0);
        assert!(s.next_milestone.is_some());
    }

    #[test]
    fn invariants_catch_two_running_phases() {
        let mut p = project();
        p.phases[0].status = PhaseStatus::InProgress;
        p.phases[1].status = PhaseStatus::InProgress;
        assert!(matches!(p.check_invariants(), Err(CoreError::Conflict(_))));
    }
}
