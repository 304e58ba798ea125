//! Project documents and their status machines.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::budget::BudgetLedger;
use crate::catalog::PhaseId;

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    OnHold,
    Completed,
}

impl ProjectStatus {
    /// `Completed` is terminal and only reached by completing the last phase.
    pub fn can_transition_to(&self, to: &ProjectStatus) -> bool {
        match self {
            ProjectStatus::Active => matches!(to, ProjectStatus::Active | ProjectStatus::OnHold | ProjectStatus::Completed),
            ProjectStatus::OnHold => matches!(to, ProjectStatus::OnHold | ProjectStatus::Active),
            ProjectStatus::Completed => matches!(to, ProjectStatus::Completed),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase instance status.
///
///   not_started ──(first task started)──> in_progress
///   in_progress ──(completion >= 80, accepted)──> completed
///   in_progress ──(marked failed)──> failed
///
/// `completed` and `failed` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl PhaseStatus {
    pub fn can_transition_to(&self, to: &PhaseStatus) -> bool {
        match self {
            PhaseStatus::NotStarted => matches!(to, PhaseStatus::InProgress),
            PhaseStatus::InProgress => matches!(to, PhaseStatus::Completed | PhaseStatus::Failed),
            PhaseStatus::Completed | PhaseStatus::Failed => false,
        }
    }

    pub fn valid_transitions(&self) -> &[PhaseStatus] {
        match self {
            PhaseStatus::NotStarted => &[PhaseStatus::InProgress],
            PhaseStatus::InProgress => &[PhaseStatus::Completed, PhaseStatus::Failed],
            PhaseStatus::Completed | PhaseStatus::Failed => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PhaseStatus::Completed | PhaseStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhaseStatus::NotStarted => "not_started",
            PhaseStatus::InProgress => "in_progress",
            PhaseStatus::Completed => "completed",
            PhaseStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded on a closed phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuccessStatus {
    Successful,
    PartiallySuccessful,
    Unsuccessful,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Blocked,
}

impl TaskStatus {
    /// Same-state updates are accepted so retried writes stay idempotent.
    pub fn can_transition_to(&self, to: &TaskStatus) -> bool {
        if self == to {
            return true;
        }
        match self {
            TaskStatus::Pending => matches!(to, TaskStatus::InProgress | TaskStatus::Completed | TaskStatus::Blocked),
            TaskStatus::InProgress => matches!(to, TaskStatus::Completed | TaskStatus::Blocked | TaskStatus::Pending),
            TaskStatus::Blocked => matches!(to, TaskStatus::Pending | TaskStatus::InProgress),
            TaskStatus::Completed => matches!(to, TaskStatus::InProgress),
        }
    }

    /// Contribution to phase progress.
    pub fn progress(self) -> f64 {
        match self {
            TaskStatus::Completed => 1.0,
            TaskStatus::InProgress => 0.5,
            TaskStatus::Pending | TaskStatus::Blocked => 0.0,
        }
    }

    /// Whether this status means work has begun.
    pub fn is_started(self) -> bool {
        matches!(self, TaskStatus::InProgress | TaskStatus::Completed)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Approved,
}

impl DeliverableStatus {
    pub fn can_transition_to(&self, to: &DeliverableStatus) -> bool {
        if self == to {
            return true;
        }
        !matches!(self, DeliverableStatus::Approved)
    }

    pub fn progress(self) -> f64 {
        match self {
            DeliverableStatus::Approved => 1.0,
            DeliverableStatus::Completed => 0.9,
            DeliverableStatus::InProgress => 0.5,
            DeliverableStatus::Pending => 0.0,
        }
    }

    pub fn is_done(self) -> bool {
        matches!(self, DeliverableStatus::Completed | DeliverableStatus::Approved)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Summary produced when a phase is closed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionAnalysis {
    pub phase: PhaseId,
    pub completion_percentage: f64,
    pub success_status: SuccessStatus,
    pub tasks_total: usize,
    pub tasks_completed: usize,
    pub deliverables_total: usize,
    pub deliverables_completed: usize,
    pub outstanding_required_deliverables: Vec<String>,
    pub budget_planned: f64,
    pub budget_spent: f64,
    pub budget_variance: f64,
    /// Lessons from this and every earlier closed phase, oldest first.
    pub lessons_learned: Vec<String>,
    pub next_phase: Option<PhaseId>,
    pub next_phase_focus: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Runtime state of one IMPACT phase inside a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseInstance {
    pub phase: PhaseId,
    pub name: String,
    pub order: u8,
    #[serde(default)]
    pub status: PhaseStatus,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completion_percentage: f64,
    #[serde(default)]
    pub budget_spent: f64,
    #[serde(default)]
    pub success_status: Option<SuccessStatus>,
    #[serde(default)]
    pub success_reason: Option<String>,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub lessons_learned: Option<String>,
    #[serde(default)]
    pub scope_changes: Vec<String>,
    #[serde(default)]
    pub tasks_completed: Vec<String>,
    #[serde(default)]
    pub deliverables_completed: Vec<String>,
    #[serde(default)]
    pub risks_identified: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub completion_analysis: Option<CompletionAnalysis>,
}

impl PhaseInstance {
    pub fn new(phase: PhaseId) -> Self {
        Self {
            phase,
            name: phase.name().to_string(),
            order: phase.order(),
            status: PhaseStatus::NotStarted,
            start_date: None,
            completion_date: None,
            completion_percentage: 0.0,
            budget_spent: 0.0,
            success_status: None,
            success_reason: None,
            failure_reason: None,
            lessons_learned: None,
            scope_changes: Vec::new(),
            tasks_completed: Vec::new(),
            deliverables_completed: Vec::new(),
            risks_identified: Vec::new(),
            recommendations: Vec::new(),
            completion_analysis: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub phase: PhaseId,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deliverable {
    pub id: String,
    pub project_id: String,
    pub phase: PhaseId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub required: bool,
    #[serde(default)]
    pub status: DeliverableStatus,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub approval_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Milestone {
    pub id: String,
    pub project_id: String,
    pub phase: PhaseId,
    pub title: String,
    pub description: String,
    pub target_date: DateTime<Utc>,
    #[serde(default)]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: MilestoneStatus,
    #[serde(default)]
    pub success_criteria: Vec<String>,
}

/// Readiness verdict of a gate review for the following phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GateVerdict {
    Ready,
    Conditional,
    NotReady,
}

/// Append-only end-of-phase checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateReview {
    pub id: String,
    pub project_id: String,
    pub phase: PhaseId,
    pub reviewer_id: String,
    pub review_date: DateTime<Utc>,
    pub completion_percentage: f64,
    pub deliverables_status: BTreeMap<String, DeliverableStatus>,
    pub success_criteria_met: Vec<String>,
    pub issues_identified: Vec<String>,
    pub recommendations: Vec<String>,
    pub next_phase_readiness: GateVerdict,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A long-lived IMPACT project document.
///
/// Work items are stored inline for read locality. `version` is bumped on
/// every successful write and guards the compare-and-swap in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub owner_id: String,
    pub organization: String,
    #[serde(default)]
    pub assessment_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub current_phase: PhaseId,
    #[serde(default)]
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub target_completion_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_completion_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub spent_budget: f64,
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub phase_progress: BTreeMap<PhaseId, f64>,
    pub phases: Vec<PhaseInstance>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub gate_reviews: Vec<GateReview>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub issues: Vec<String>,
    /// Actual spend per plan task id (`task_1`..`task_10`).
    #[serde(default)]
    pub budget_ledger: BudgetLedger,
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn phase(&self, phase: PhaseId) -> Option<&PhaseInstance> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    pub fn phase_mut(&mut self, phase: PhaseId) -> Option<&mut PhaseInstance> {
        self.phases.iter_mut().find(|p| p.phase == phase)
    }

    pub fn tasks_in(&self, phase: PhaseId) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.phase == phase)
    }

    pub fn deliverables_in(&self, phase: PhaseId) -> impl Iterator<Item = &Deliverable> {
        self.deliverables.iter().filter(move |d| d.phase == phase)
    }

    /// Whether work items for `phase` have been generated yet.
    pub fn has_work_for(&self, phase: PhaseId) -> bool {
        self.tasks.iter().any(|t| t.phase == phase)
            || self.deliverables.iter().any(|d| d.phase == phase)
            || self.milestones.iter().any(|m| m.phase == phase)
    }

    pub fn in_progress_phase(&self) -> Option<PhaseId> {
        self.phases
            .iter()
            .find(|p| p.status == PhaseStatus::InProgress)
            .map(|p| p.phase)
    }

    /// Project budget when set, otherwise `fallback`.
    pub fn total_budget_or(&self, fallback: f64) -> f64 {
        match self.budget {
            Some(b) if b > 0.0 => b,
            _ => fallback,
        }
    }

    /// Next pending milestone by target date.
    pub fn next_milestone(&self) -> Option<&Milestone> {
        self.milestones
            .iter()
            .filter(|m| m.status == MilestoneStatus::Pending)
            .min_by_key(|m| m.target_date)
    }
}
