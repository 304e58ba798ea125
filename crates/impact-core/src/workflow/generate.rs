//! Work-item generation from the phase catalog.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::model::{
    Deliverable, DeliverableStatus, Milestone, MilestoneStatus, PhaseInstance, Priority, Project,
    ProjectStatus, Task, TaskStatus,
};
use crate::catalog::PhaseId;

const KEY_ACTIVITY: &str = "key_activity";

/// Weeks between milestone targets.
pub const WEEKS_PER_PHASE: i64 = 4;

/// Caller-supplied fields of a new project.
#[derive(Debug, Clone, Default)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub budget: Option<f64>,
    pub target_completion_date: Option<DateTime<Utc>>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// One task per key activity of `phase`.
pub fn tasks_for_phase(project_id: &str, phase: PhaseId) -> Vec<Task> {
    phase
        .spec()
        .key_activities
        .iter()
        .map(|activity| Task {
            id: new_id(),
            project_id: project_id.to_string(),
            phase,
            title: (*activity).to_string(),
            description: format!("Complete the key activity: {activity}"),
            category: KEY_ACTIVITY.to_string(),
            status: TaskStatus::Pending,
            assigned_to: None,
            due_date: None,
            completed_date: None,
            priority: Priority::Medium,
            notes: None,
            dependencies: Vec::new(),
        })
        .collect()
}

pub fn deliverables_for_phase(project_id: &str, phase: PhaseId) -> Vec<Deliverable> {
    phase
        .spec()
        .deliverables
        .iter()
        .map(|d| Deliverable {
            id: new_id(),
            project_id: project_id.to_string(),
            phase,
            name: d.name.to_string(),
            kind: d.kind.to_string(),
            required: d.required,
            status: DeliverableStatus::Pending,
            assigned_to: None,
            due_date: None,
            completed_date: None,
            content: None,
            approval_notes: None,
        })
        .collect()
}

/// The phase-closing milestone, due `order * 4` weeks after `start`.
pub fn milestone_for_phase(project_id: &str, phase: PhaseId, start: DateTime<Utc>) -> Milestone {
    let spec = phase.spec();
    Milestone {
        id: new_id(),
        project_id: project_id.to_string(),
        phase,
        title: format!("Complete {} Phase", spec.name),
        description: format!("All tasks and deliverables for the {} phase completed.", spec.name),
        target_date: start + Duration::weeks(i64::from(phase.order()) * WEEKS_PER_PHASE),
        completion_date: None,
        status: MilestoneStatus::Pending,
        success_criteria: spec.completion_criteria.iter().map(|c| (*c).to_string()).collect(),
    }
}

impl Project {
    /// Generate tasks, deliverables and the milestone for `phase` unless
    /// any already exist. Returns whether anything was generated.
    pub fn ensure_phase_work(&mut self, phase: PhaseId, start: DateTime<Utc>) -> bool {
        if self.has_work_for(phase) {
            return false;
        }
        let tasks = tasks_for_phase(&self.id, phase);
        let deliverables = deliverables_for_phase(&self.id, phase);
        tracing::debug!(
            project_id = %self.id,
            phase = %phase,
            tasks = tasks.len(),
            deliverables = deliverables.len(),
            "generated phase work"
        );
        self.tasks.extend(tasks);
        self.deliverables.extend(deliverables);
        self.milestones.push(milestone_for_phase(&self.id, phase, start));
        true
    }

    fn skeleton(draft: ProjectDraft, owner_id: &str, organization: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            owner_id: owner_id.to_string(),
            organization: organization.to_string(),
            assessment_id: None,
            name: draft.name,
            description: draft.description,
            current_phase: PhaseId::Investigate,
            status: ProjectStatus::Active,
            start_date: now,
            target_completion_date: draft.target_completion_date,
            actual_completion_date: None,
            budget: draft.budget,
            spent_budget: 0.0,
            progress_percentage: 0.0,
            phase_progress: PhaseId::ALL.iter().map(|p| (*p, 0.0)).collect(),
            phases: PhaseId::ALL.iter().map(|p| PhaseInstance::new(*p)).collect(),
            tasks: Vec::new(),
            deliverables: Vec::new(),
            milestones: Vec::new(),
            gate_reviews: Vec::new(),
            risks: Vec::new(),
            issues: Vec::new(),
            budget_ledger: Default::default(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// A blank project. Only `investigate` work is generated; later phases
    /// are generated when the project transitions into them.
    pub fn blank(draft: ProjectDraft, owner_id: &str, organization: &str, now: DateTime<Utc>) -> Self {
        let mut project = Self::skeleton(draft, owner_id, organization, now);
        project.ensure_phase_work(PhaseId::Investigate, now);
        project.refresh_progress();
        project
    }

    /// A fully generated six-phase project seeded by an assessment.
    ///
    /// The target date defaults to `now + suggested_weeks` and the budget
    /// to `plan_total`.
    pub fn from_assessment(
        draft: ProjectDraft,
        owner_id: &str,
        organization: &str,
        assessment_id: &str,
        suggested_weeks: u32,
        plan_total: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let mut project = Self::skeleton(draft, owner_id, organization, now);
        project.assessment_id = Some(assessment_id.to_string());
        project
            .target_completion_date
            .get_or_insert(now + Duration::weeks(i64::from(suggested_weeks)));
        if project.budget.is_none() {
            project.budget = Some(plan_total as f64);
        }
        for phase in PhaseId::ALL {
            project.ensure_phase_work(phase, now);
        }
        project.refresh_progress();
        project
    }
}
