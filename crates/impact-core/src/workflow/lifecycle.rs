//! Phase transitions, completion analysis and gate reviews.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{
    CompletionAnalysis, GateReview, GateVerdict, MilestoneStatus, PhaseStatus, Project, ProjectStatus,
    SuccessStatus, TaskStatus,
};
use crate::catalog::PhaseId;
use crate::error::{CoreError, Result};
use crate::planner::ImplementationPlan;
use crate::scores::round1;

/// Minimum completion percent for closing a phase.
pub const COMPLETION_THRESHOLD: f64 = 80.0;

/// Gate reviews below this completion are `not_ready`.
const CONDITIONAL_THRESHOLD: f64 = 60.0;

/// Plan and scorer outputs a phase closure draws on.
#[derive(Debug, Clone, Copy)]
pub struct PhaseContext<'a> {
    pub plan: &'a ImplementationPlan,
    pub phase_recommendations: &'a BTreeMap<PhaseId, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub from_phase: PhaseId,
    pub to_phase: PhaseId,
    pub transition_date: DateTime<Utc>,
    #[serde(default)]
    pub completion_notes: String,
    #[serde(default)]
    pub lessons_learned: Option<String>,
    #[serde(default)]
    pub gate_review_id: Option<String>,
}

/// Journal entry for an accepted transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseTransitionRecord {
    pub id: String,
    pub project_id: String,
    pub from_phase: PhaseId,
    pub to_phase: PhaseId,
    pub transition_date: DateTime<Utc>,
    pub completion_notes: String,
    pub lessons_learned: Option<String>,
    pub gate_review_id: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseCompletion {
    #[serde(default)]
    pub lessons_learned: Option<String>,
    #[serde(default)]
    pub success_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateReviewInput {
    #[serde(default)]
    pub success_criteria_met: Vec<String>,
    #[serde(default)]
    pub issues_identified: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Overrides the computed verdict.
    #[serde(default)]
    pub next_phase_readiness: Option<GateVerdict>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn phase_missing(phase: PhaseId) -> CoreError {
    CoreError::Internal(format!("project has no instance for phase {phase}"))
}

/// Verdict from completion and outstanding required deliverables.
pub fn gate_verdict(completion: f64, outstanding_required: usize) -> GateVerdict {
    if completion >= COMPLETION_THRESHOLD && outstanding_required == 0 {
        GateVerdict::Ready
    } else if completion >= CONDITIONAL_THRESHOLD {
        GateVerdict::Conditional
    } else {
        GateVerdict::NotReady
    }
}

impl Project {
    /// Reject mutations of projects that are on hold or finished.
    pub fn ensure_active(&self) -> Result<()> {
        match self.status {
            ProjectStatus::Active => Ok(()),
            other => Err(CoreError::Conflict(format!("project {} is {other}", self.id))),
        }
    }

    /// Names of required deliverables of `phase` not yet completed.
    pub fn outstanding_required(&self, phase: PhaseId) -> Vec<String> {
        self.deliverables_in(phase)
            .filter(|d| d.required && !d.status.is_done())
            .map(|d| d.name.clone())
            .collect()
    }

    /// Start `phase` if it is the current phase and nothing else is running.
    pub(crate) fn auto_start(&mut self, phase: PhaseId, now: DateTime<Utc>) {
        if phase != self.current_phase || self.in_progress_phase().is_some() {
            return;
        }
        if let Some(instance) = self.phase_mut(phase) {
            if instance.status == PhaseStatus::NotStarted {
                instance.status = PhaseStatus::InProgress;
                instance.start_date.get_or_insert(now);
                tracing::info!(phase = %phase, "phase started");
            }
        }
    }

    /// Point `current_phase` at the running phase, or the earliest phase
    /// not yet started, generating its work if needed.
    pub(crate) fn sync_current_phase(&mut self, now: DateTime<Utc>) {
        let next = self.in_progress_phase().or_else(|| {
            self.phases
                .iter()
                .find(|p| p.status == PhaseStatus::NotStarted)
                .map(|p| p.phase)
        });
        if let Some(phase) = next {
            if phase.order() >= self.current_phase.order() {
                self.current_phase = phase;
            }
            self.ensure_phase_work(phase, now);
        }
    }

    fn completion_analysis(&self, phase: PhaseId, ctx: PhaseContext<'_>, now: DateTime<Utc>) -> Result<CompletionAnalysis> {
        let instance = self.phase(phase).ok_or_else(|| phase_missing(phase))?;
        let tasks_total = self.tasks_in(phase).count();
        let tasks_completed = self
            .tasks_in(phase)
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let deliverables_total = self.deliverables_in(phase).count();
        let deliverables_completed = self.deliverables_in(phase).filter(|d| d.status.is_done()).count();
        let outstanding = self.outstanding_required(phase);

        let planned = ctx.plan.planned_budget_for(phase) as f64;
        let lessons = self
            .phases
            .iter()
            .filter(|p| p.order <= instance.order)
            .filter_map(|p| p.lessons_learned.clone())
            .collect();
        let next_phase = phase.next();

        Ok(CompletionAnalysis {
            phase,
            completion_percentage: instance.completion_percentage,
            success_status: if outstanding.is_empty() {
                SuccessStatus::Successful
            } else {
                SuccessStatus::PartiallySuccessful
            },
            tasks_total,
            tasks_completed,
            deliverables_total,
            deliverables_completed,
            outstanding_required_deliverables: outstanding,
            budget_planned: planned,
            budget_spent: instance.budget_spent,
            budget_variance: round1(instance.budget_spent - planned),
            lessons_learned: lessons,
            next_phase,
            next_phase_focus: next_phase.and_then(|n| ctx.phase_recommendations.get(&n).cloned()),
            generated_at: now,
        })
    }

    /// Move an in-progress phase to `completed` and attach its analysis.
    fn close_phase(
        &mut self,
        phase: PhaseId,
        completion: PhaseCompletion,
        ctx: PhaseContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<CompletionAnalysis> {
        let instance = self.phase(phase).ok_or_else(|| phase_missing(phase))?;
        if !instance.status.can_transition_to(&PhaseStatus::Completed) {
            return Err(CoreError::Conflict(format!(
                "phase {phase} is {} and cannot be completed",
                instance.status
            )));
        }
        if instance.completion_percentage < COMPLETION_THRESHOLD {
            return Err(CoreError::PreconditionFailed(format!(
                "phase {phase} is {:.1}% complete, {COMPLETION_THRESHOLD}% required",
                instance.completion_percentage
            )));
        }

        if let Some(instance) = self.phase_mut(phase) {
            if completion.lessons_learned.is_some() {
                instance.lessons_learned = completion.lessons_learned;
            }
            if completion.success_reason.is_some() {
                instance.success_reason = completion.success_reason;
            }
        }
        let analysis = self.completion_analysis(phase, ctx, now)?;

        let instance = self.phase_mut(phase).ok_or_else(|| phase_missing(phase))?;
        instance.status = PhaseStatus::Completed;
        instance.completion_date = Some(now);
        instance.success_status = Some(analysis.success_status);
        instance.recommendations = analysis.next_phase_focus.iter().cloned().collect();
        instance.completion_analysis = Some(analysis.clone());

        for milestone in self.milestones.iter_mut().filter(|m| m.phase == phase) {
            milestone.status = MilestoneStatus::Completed;
            milestone.completion_date.get_or_insert(now);
        }

        if phase == PhaseId::Track {
            self.status = ProjectStatus::Completed;
            self.actual_completion_date = Some(now);
            tracing::info!(project_id = %self.id, "project completed");
        }
        tracing::info!(project_id = %self.id, phase = %phase, "phase completed");
        Ok(analysis)
    }

    /// Complete `phase` without starting the next one.
    ///
    /// # Errors
    /// `Conflict` unless the phase is in progress; `PreconditionFailed`
    /// below 80% completion.
    pub fn complete_phase(
        &mut self,
        phase: PhaseId,
        completion: PhaseCompletion,
        ctx: PhaseContext<'_>,
        now: DateTime<Utc>,
    ) -> Result<CompletionAnalysis> {
        self.ensure_active()?;
        let analysis = self.close_phase(phase, completion, ctx, now)?;
        if self.status == ProjectStatus::Active {
            self.sync_current_phase(now);
        }
        self.refresh_progress();
        Ok(analysis)
    }

    /// Validate and apply a transition between consecutive phases.
    ///
    /// # Errors
    /// `Conflict` for out-of-order transitions, a failed or unstarted source
    /// phase, or a target phase that already started. `PreconditionFailed`
    /// when the source phase is below 80% completion.
    pub fn transition(
        &mut self,
        request: &TransitionRequest,
        ctx: PhaseContext<'_>,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PhaseTransitionRecord> {
        self.ensure_active()?;
        let (from, to) = (request.from_phase, request.to_phase);
        if from.order() + 1 != to.order() {
            return Err(CoreError::Conflict(format!(
                "invalid phase transition {from} -> {to}: phases must be completed sequentially"
            )));
        }
        if to.order() < self.current_phase.order() {
            return Err(CoreError::Conflict(format!(
                "project is already past {to} (current phase {})",
                self.current_phase
            )));
        }
        if let Some(id) = &request.gate_review_id {
            if !self.gate_reviews.iter().any(|g| &g.id == id) {
                return Err(CoreError::not_found("gate review", id.clone()));
            }
        }

        let from_status = self.phase(from).ok_or_else(|| phase_missing(from))?.status;
        let to_status = self.phase(to).ok_or_else(|| phase_missing(to))?.status;
        match from_status {
            PhaseStatus::Failed => {
                return Err(CoreError::Conflict(format!("phase {from} has failed")));
            }
            PhaseStatus::NotStarted => {
                return Err(CoreError::Conflict(format!("phase {from} has not started")));
            }
            PhaseStatus::InProgress | PhaseStatus::Completed => {}
        }
        if to_status != PhaseStatus::NotStarted {
            return Err(CoreError::Conflict(format!("phase {to} is already {to_status}")));
        }

        if from_status == PhaseStatus::InProgress {
            let completion = PhaseCompletion {
                lessons_learned: request.lessons_learned.clone(),
                success_reason: None,
            };
            self.close_phase(from, completion, ctx, request.transition_date)?;
        }

        let instance = self.phase_mut(to).ok_or_else(|| phase_missing(to))?;
        instance.status = PhaseStatus::InProgress;
        instance.start_date.get_or_insert(request.transition_date);
        self.current_phase = to;
        self.ensure_phase_work(to, request.transition_date);
        self.refresh_progress();

        tracing::info!(project_id = %self.id, from = %from, to = %to, "phase transitioned");
        Ok(PhaseTransitionRecord {
            id: Uuid::new_v4().to_string(),
            project_id: self.id.clone(),
            from_phase: from,
            to_phase: to,
            transition_date: request.transition_date,
            completion_notes: request.completion_notes.clone(),
            lessons_learned: request.lessons_learned.clone(),
            gate_review_id: request.gate_review_id.clone(),
            user_id: user_id.to_string(),
            created_at: now,
        })
    }

    /// Move an in-progress phase to `failed`.
    pub fn mark_phase_failed(&mut self, phase: PhaseId, reason: &str, now: DateTime<Utc>) -> Result<()> {
        self.ensure_active()?;
        let instance = self.phase_mut(phase).ok_or_else(|| phase_missing(phase))?;
        if !instance.status.can_transition_to(&PhaseStatus::Failed) {
            return Err(CoreError::Conflict(format!(
                "phase {phase} is {} and cannot be marked failed",
                instance.status
            )));
        }
        instance.status = PhaseStatus::Failed;
        instance.completion_date = Some(now);
        instance.success_status = Some(SuccessStatus::Unsuccessful);
        instance.failure_reason = Some(reason.to_string());
        tracing::info!(project_id = %self.id, phase = %phase, "phase failed");

        self.sync_current_phase(now);
        self.refresh_progress();
        Ok(())
    }

    /// Append a gate review for `phase` at its current progress.
    pub fn add_gate_review(
        &mut self,
        phase: PhaseId,
        input: GateReviewInput,
        reviewer_id: &str,
        now: DateTime<Utc>,
    ) -> Result<GateReview> {
        self.ensure_active()?;
        let completion = self.phase(phase).ok_or_else(|| phase_missing(phase))?.completion_percentage;
        let outstanding = self.outstanding_required(phase).len();
        let review = GateReview {
            id: Uuid::new_v4().to_string(),
            project_id: self.id.clone(),
            phase,
            reviewer_id: reviewer_id.to_string(),
            review_date: now,
            completion_percentage: completion,
            deliverables_status: self
                .deliverables_in(phase)
                .map(|d| (d.name.clone(), d.status))
                .collect(),
            success_criteria_met: input.success_criteria_met,
            issues_identified: input.issues_identified,
            recommendations: input.recommendations,
            next_phase_readiness: input
                .next_phase_readiness
                .unwrap_or_else(|| gate_verdict(completion, outstanding)),
            notes: input.notes,
        };
        self.gate_reviews.push(review.clone());
        Ok(review)
    }
}
