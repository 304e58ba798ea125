//! Service layer.
//!
//! [`ImpactService`] wraps the pure engine with caller authorization,
//! persistence and activity journalling. Every project mutation runs inside
//! a per-project critical section: load, apply, check invariants, then a
//! versioned compare-and-swap write.

pub mod locks;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::{self, PredictiveSnapshot};
use crate::budget::{self, BudgetTracking, TaskActuals};
use crate::catalog::{AssessmentTypeId, PhaseId};
use crate::error::{CoreError, Result, ValidationError};
use crate::events::{ActivityEvent, ActivityRecord, ActivitySink, Notification};
use crate::forecast::{self, DeliveryOutcomes, ExcellenceTracking, ProjectForecast, StakeholderCommunications};
use crate::monitoring::{self, RiskMonitoring};
use crate::planner::{self, ImplementationPlan};
use crate::readiness::{
    self, AnthropicNarrator, Assessment, AssessmentInput, NarrativeGenerator, NarrativeRequest, TemplateNarrator,
};
use crate::scores::DimensionScores;
use crate::storage::{AssessmentStore, Config, Database, JournalStore, ProjectStore};
use crate::workflow::{
    CompletionAnalysis, Deliverable, DeliverableUpdate, GateReview, GateReviewInput, PhaseCompletion, PhaseContext,
    PhaseInstance, PhaseProgressUpdate, PhaseTransitionRecord, Project, ProjectDraft, ProjectPatch, ProjectStatus,
    Task, TaskUpdate, TransitionRequest, WorkflowStatus,
};
use locks::{acquire, ProjectLocks};

/// Compare-and-swap attempts before a write gives up with `Conflict`.
pub const MAX_WRITE_ATTEMPTS: usize = 3;

/// Readiness assumed for projects without an assessment.
const NEUTRAL_OVERALL: f64 = 3.0;

/// Everything the service persists to.
pub trait Store: AssessmentStore + ProjectStore + JournalStore {}

impl<T: AssessmentStore + ProjectStore + JournalStore> Store for T {}

/// Authenticated identity behind a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub organization: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            organization: organization.into(),
            is_admin: false,
        }
    }

    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    fn ensure_identified(&self) -> Result<()> {
        if self.user_id.trim().is_empty() || self.organization.trim().is_empty() {
            return Err(CoreError::Unauthenticated);
        }
        Ok(())
    }

    fn can_read(&self, organization: &str) -> bool {
        self.is_admin || self.organization == organization
    }

    fn can_write(&self, owner_id: &str) -> bool {
        self.is_admin || self.user_id == owner_id
    }
}

/// Assessment-derived inputs of one project.
struct ProjectBasis {
    assessment_type: AssessmentTypeId,
    scores: DimensionScores,
    overall: f64,
    plan: ImplementationPlan,
    phase_recommendations: BTreeMap<PhaseId, String>,
    linked: bool,
}

impl ProjectBasis {
    fn neutral() -> Self {
        let kind = AssessmentTypeId::GeneralReadiness;
        let scores = DimensionScores::new();
        Self {
            assessment_type: kind,
            plan: planner::build_plan(kind, &scores, NEUTRAL_OVERALL),
            phase_recommendations: readiness::phase_recommendations(kind),
            scores,
            overall: NEUTRAL_OVERALL,
            linked: false,
        }
    }

    fn from_assessment(assessment: &Assessment) -> Self {
        Self {
            assessment_type: assessment.assessment_type,
            scores: assessment.dimension_scores(),
            overall: assessment.overall_score(),
            plan: assessment.implementation_plan.clone(),
            phase_recommendations: assessment.report.phase_recommendations.clone(),
            linked: true,
        }
    }

    fn ctx(&self) -> PhaseContext<'_> {
        PhaseContext {
            plan: &self.plan,
            phase_recommendations: &self.phase_recommendations,
        }
    }
}

/// Engine facade used by the CLI and any other front end.
pub struct ImpactService {
    store: Arc<dyn Store>,
    locks: ProjectLocks,
    narrator: Box<dyn NarrativeGenerator>,
    sinks: Vec<Box<dyn ActivitySink>>,
    default_total_budget: f64,
}

impl ImpactService {
    pub fn new(store: Arc<dyn Store>, narrator: Box<dyn NarrativeGenerator>) -> Self {
        Self {
            store,
            locks: ProjectLocks::new(),
            narrator,
            sinks: Vec::new(),
            default_total_budget: crate::storage::config::AnalyticsConfig::default().default_total_budget,
        }
    }

    /// Open the configured database and pick a narrator: the Anthropic
    /// client when an api key is active, the template otherwise.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn Store> = Arc::new(Database::open(config)?);
        let narrator: Box<dyn NarrativeGenerator> = match config.narrative.active_key() {
            Some(key) => Box::new(AnthropicNarrator::new(&config.narrative, key)?),
            None => {
                tracing::debug!("no narrative api key, using template narrator");
                Box::new(TemplateNarrator)
            }
        };
        Ok(Self::new(store, narrator).with_default_budget(config.analytics.default_total_budget))
    }

    pub fn with_sink(mut self, sink: Box<dyn ActivitySink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_default_budget(mut self, budget: f64) -> Self {
        self.default_total_budget = budget;
        self
    }

    fn emit(&self, caller: &Caller, event: ActivityEvent, now: DateTime<Utc>) {
        let record = ActivityRecord::new(&caller.user_id, event, now);
        if let Err(e) = self.store.append_activity(&record) {
            tracing::warn!(error = %e, kind = record.event.kind(), "failed to journal activity");
        }
        for sink in &self.sinks {
            if let Err(e) = sink.record(&record) {
                tracing::warn!(error = %e, kind = record.event.kind(), "activity sink failed");
            }
        }
    }

    fn notify(&self, project: &Project, title: &str, message: String, now: DateTime<Utc>) {
        let notification = Notification::new(&project.owner_id, &project.id, title, message, now);
        if let Err(e) = self.store.push_notification(&notification) {
            tracing::warn!(error = %e, project_id = %project.id, "failed to push notification");
        }
    }

    // Assessments

    /// Score, plan and narrate a submission, then persist it.
    ///
    /// # Errors
    /// `InvalidInput` for a bad submission; upstream errors from the
    /// narrator abort before anything is stored.
    pub fn create_assessment(
        &self,
        caller: &Caller,
        input: &AssessmentInput,
        now: DateTime<Utc>,
    ) -> Result<Assessment> {
        caller.ensure_identified()?;
        let scores = input.validate()?;
        let kind = input.assessment_type;
        let report = readiness::score_dimensions(kind, &scores);
        let plan = planner::build_plan(kind, &scores, report.overall_score);
        let recommended = planner::recommended_project(kind, report.overall_score);
        let narrative = self
            .narrator
            .generate(&NarrativeRequest::from_report(&input.project_name, &report))?;

        let assessment = Assessment::new(
            &caller.user_id,
            &caller.organization,
            kind,
            input.project_name.trim(),
            input.scores.clone(),
            report,
            plan,
            recommended,
            narrative,
            now,
        );
        self.store.insert_assessment(&assessment)?;
        tracing::info!(assessment_id = %assessment.id, assessment_type = %kind, "assessment created");
        self.emit(
            caller,
            ActivityEvent::AssessmentCreated {
                assessment_id: assessment.id.clone(),
                assessment_type: kind,
                overall_score: assessment.overall_score(),
            },
            now,
        );
        Ok(assessment)
    }

    pub fn get_assessment(&self, caller: &Caller, id: &str) -> Result<Assessment> {
        caller.ensure_identified()?;
        let assessment = self
            .store
            .get_assessment(id)?
            .ok_or_else(|| CoreError::not_found("assessment", id))?;
        if !caller.can_read(&assessment.organization) {
            return Err(CoreError::forbidden("assessment", id));
        }
        Ok(assessment)
    }

    pub fn list_assessments(&self, caller: &Caller) -> Result<Vec<Assessment>> {
        caller.ensure_identified()?;
        self.store.list_assessments(&caller.organization)
    }

    // Projects

    fn validate_draft(draft: &ProjectDraft) -> Result<()> {
        if draft.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name".into()).into());
        }
        if draft.budget.is_some_and(|b| !b.is_finite() || b < 0.0) {
            return Err(CoreError::invalid("budget", "must be a non-negative number"));
        }
        Ok(())
    }

    fn insert_new_project(&self, caller: &Caller, project: Project, now: DateTime<Utc>) -> Result<Project> {
        project.check_invariants()?;
        self.store.insert_project(&project)?;
        tracing::info!(project_id = %project.id, name = %project.name, "project created");
        self.emit(
            caller,
            ActivityEvent::ProjectCreated {
                project_id: project.id.clone(),
                name: project.name.clone(),
                assessment_id: project.assessment_id.clone(),
            },
            now,
        );
        Ok(project)
    }

    /// Create a blank project with only `investigate` work generated.
    pub fn create_project(&self, caller: &Caller, mut draft: ProjectDraft, now: DateTime<Utc>) -> Result<Project> {
        caller.ensure_identified()?;
        draft.name = draft.name.trim().to_string();
        Self::validate_draft(&draft)?;
        let project = Project::blank(draft, &caller.user_id, &caller.organization, now);
        self.insert_new_project(caller, project, now)
    }

    /// Create a fully generated project seeded by an assessment's plan.
    /// An empty draft name takes the assessment's project name.
    pub fn create_project_from_assessment(
        &self,
        caller: &Caller,
        assessment_id: &str,
        mut draft: ProjectDraft,
        now: DateTime<Utc>,
    ) -> Result<Project> {
        let assessment = self.get_assessment(caller, assessment_id)?;
        draft.name = draft.name.trim().to_string();
        if draft.name.is_empty() {
            draft.name = assessment.project_name.clone();
        }
        if draft.description.is_empty() {
            draft.description = format!(
                "{} initiative seeded by assessment {}",
                assessment.assessment_type.display_name(),
                assessment.id
            );
        }
        Self::validate_draft(&draft)?;
        let project = Project::from_assessment(
            draft,
            &caller.user_id,
            &caller.organization,
            &assessment.id,
            assessment.recommended_project.suggested_duration_weeks,
            assessment.implementation_plan.summary.total_budget,
            now,
        );
        self.insert_new_project(caller, project, now)
    }

    pub fn get_project(&self, caller: &Caller, id: &str) -> Result<Project> {
        caller.ensure_identified()?;
        let project = self.load_project(id)?;
        if !caller.can_read(&project.organization) {
            return Err(CoreError::forbidden("project", id));
        }
        Ok(project)
    }

    pub fn list_projects(&self, caller: &Caller) -> Result<Vec<Project>> {
        caller.ensure_identified()?;
        self.store.list_projects(&caller.organization)
    }

    fn load_project(&self, id: &str) -> Result<Project> {
        self.store
            .get_project(id)?
            .ok_or_else(|| CoreError::not_found("project", id))
    }

    /// A project the caller may modify or run owner-level analytics on.
    fn owned_project(&self, caller: &Caller, id: &str) -> Result<Project> {
        caller.ensure_identified()?;
        let project = self.load_project(id)?;
        if !caller.can_write(&project.owner_id) {
            return Err(CoreError::forbidden("project", id));
        }
        Ok(project)
    }

    fn basis(&self, project: &Project) -> Result<ProjectBasis> {
        let Some(id) = project.assessment_id.as_deref() else {
            return Ok(ProjectBasis::neutral());
        };
        match self.store.get_assessment(id)? {
            Some(assessment) => Ok(ProjectBasis::from_assessment(&assessment)),
            None => {
                tracing::warn!(project_id = %project.id, assessment_id = id, "linked assessment missing");
                Ok(ProjectBasis::neutral())
            }
        }
    }

    /// Project budget, else the plan total of a linked assessment, else the
    /// configured default.
    fn total_budget(&self, project: &Project, basis: &ProjectBasis) -> f64 {
        let fallback = if basis.linked {
            basis.plan.summary.total_budget as f64
        } else {
            self.default_total_budget
        };
        project.total_budget_or(fallback)
    }

    /// Run `apply` against the latest stored project under its write lock.
    ///
    /// Retries the versioned write up to [`MAX_WRITE_ATTEMPTS`] times when
    /// another writer got there first. Errors from `apply` or the invariant
    /// check leave the stored project untouched.
    fn mutate<T>(
        &self,
        caller: &Caller,
        project_id: &str,
        now: DateTime<Utc>,
        apply: impl FnMut(&mut Project) -> Result<T>,
    ) -> Result<(Project, T)> {
        self.mutate_with(caller, project_id, now, apply, |project, expected, _| {
            self.store.compare_and_swap(project, expected)
        })
    }

    /// [`mutate`](Self::mutate) with a custom versioned write. `commit`
    /// returns `false` when the stored version moved on.
    fn mutate_with<T>(
        &self,
        caller: &Caller,
        project_id: &str,
        now: DateTime<Utc>,
        mut apply: impl FnMut(&mut Project) -> Result<T>,
        commit: impl Fn(&Project, u64, &T) -> Result<bool>,
    ) -> Result<(Project, T)> {
        caller.ensure_identified()?;
        let lock = self.locks.lock_for(project_id);
        let _guard = acquire(&lock);

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut project = self.load_project(project_id)?;
            if !caller.can_write(&project.owner_id) {
                return Err(CoreError::forbidden("project", project_id));
            }
            let expected = project.version;
            let out = apply(&mut project)?;
            project.check_invariants()?;
            project.version = expected + 1;
            project.updated_at = now;

            if commit(&project, expected, &out)? {
                return Ok((project, out));
            }
            tracing::warn!(project_id, attempt, "project version changed underneath write, retrying");
        }
        Err(CoreError::Conflict(format!(
            "project {project_id} was modified concurrently, giving up after {MAX_WRITE_ATTEMPTS} attempts"
        )))
    }

    pub fn update_project(
        &self,
        caller: &Caller,
        project_id: &str,
        patch: &ProjectPatch,
        now: DateTime<Utc>,
    ) -> Result<Project> {
        let (project, ()) = self.mutate(caller, project_id, now, |p| p.apply_patch(patch))?;
        self.emit(
            caller,
            ActivityEvent::ProjectUpdated {
                project_id: project.id.clone(),
            },
            now,
        );
        Ok(project)
    }

    pub fn update_task(
        &self,
        caller: &Caller,
        project_id: &str,
        task_id: &str,
        update: &TaskUpdate,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        let (_, task) = self.mutate(caller, project_id, now, |p| p.update_task(task_id, update, now))?;
        self.emit(
            caller,
            ActivityEvent::TaskUpdated {
                project_id: project_id.to_string(),
                task_id: task.id.clone(),
                status: task.status,
            },
            now,
        );
        Ok(task)
    }

    pub fn update_deliverable(
        &self,
        caller: &Caller,
        project_id: &str,
        deliverable_id: &str,
        update: &DeliverableUpdate,
        now: DateTime<Utc>,
    ) -> Result<Deliverable> {
        let (_, deliverable) = self.mutate(caller, project_id, now, |p| {
            p.update_deliverable(deliverable_id, update, now)
        })?;
        self.emit(
            caller,
            ActivityEvent::DeliverableUpdated {
                project_id: project_id.to_string(),
                deliverable_id: deliverable.id.clone(),
                status: deliverable.status,
            },
            now,
        );
        Ok(deliverable)
    }

    pub fn update_phase_progress(
        &self,
        caller: &Caller,
        project_id: &str,
        phase: PhaseId,
        update: &PhaseProgressUpdate,
        now: DateTime<Utc>,
    ) -> Result<PhaseInstance> {
        let (_, instance) = self.mutate(caller, project_id, now, |p| {
            p.update_phase_progress(phase, update, now)?;
            p.phase(phase)
                .cloned()
                .ok_or_else(|| CoreError::not_found("phase", phase.as_str()))
        })?;
        self.emit(
            caller,
            ActivityEvent::PhaseProgressUpdated {
                project_id: project_id.to_string(),
                phase,
                completion_percentage: instance.completion_percentage,
            },
            now,
        );
        Ok(instance)
    }

    /// Validate and apply a phase transition, then notify the owner. The
    /// new phase state and its journal row are written together.
    pub fn transition_phase(
        &self,
        caller: &Caller,
        project_id: &str,
        request: &TransitionRequest,
        now: DateTime<Utc>,
    ) -> Result<PhaseTransitionRecord> {
        let basis = self.basis(&self.owned_project(caller, project_id)?)?;
        let (project, record) = self.mutate_with(
            caller,
            project_id,
            now,
            |p| p.transition(request, basis.ctx(), &caller.user_id, now),
            |p, expected, record| self.store.compare_and_swap_with_transition(p, expected, record),
        )?;

        self.emit(
            caller,
            ActivityEvent::PhaseTransitioned {
                project_id: project_id.to_string(),
                from_phase: record.from_phase,
                to_phase: record.to_phase,
            },
            now,
        );
        self.notify(
            &project,
            "Phase transition",
            format!(
                "Project '{}' moved from {} to {}",
                project.name,
                record.from_phase.name(),
                record.to_phase.name()
            ),
            now,
        );
        Ok(record)
    }

    /// Complete a phase without starting the next one.
    pub fn complete_phase(
        &self,
        caller: &Caller,
        project_id: &str,
        phase: PhaseId,
        completion: &PhaseCompletion,
        now: DateTime<Utc>,
    ) -> Result<CompletionAnalysis> {
        let basis = self.basis(&self.owned_project(caller, project_id)?)?;
        let (project, analysis) = self.mutate(caller, project_id, now, |p| {
            p.complete_phase(phase, completion.clone(), basis.ctx(), now)
        })?;

        self.emit(
            caller,
            ActivityEvent::PhaseCompleted {
                project_id: project_id.to_string(),
                phase,
            },
            now,
        );
        if project.status == ProjectStatus::Completed {
            self.notify(
                &project,
                "Project completed",
                format!("Project '{}' completed all IMPACT phases", project.name),
                now,
            );
        }
        Ok(analysis)
    }

    pub fn fail_phase(
        &self,
        caller: &Caller,
        project_id: &str,
        phase: PhaseId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<PhaseInstance> {
        if reason.trim().is_empty() {
            return Err(ValidationError::EmptyField("reason".into()).into());
        }
        let (_, instance) = self.mutate(caller, project_id, now, |p| {
            p.mark_phase_failed(phase, reason, now)?;
            p.phase(phase)
                .cloned()
                .ok_or_else(|| CoreError::not_found("phase", phase.as_str()))
        })?;
        self.emit(
            caller,
            ActivityEvent::PhaseFailed {
                project_id: project_id.to_string(),
                phase,
            },
            now,
        );
        Ok(instance)
    }

    pub fn add_gate_review(
        &self,
        caller: &Caller,
        project_id: &str,
        phase: PhaseId,
        input: &GateReviewInput,
        now: DateTime<Utc>,
    ) -> Result<GateReview> {
        let (_, review) = self.mutate(caller, project_id, now, |p| {
            p.add_gate_review(phase, input.clone(), &caller.user_id, now)
        })?;
        self.emit(
            caller,
            ActivityEvent::GateReviewAdded {
                project_id: project_id.to_string(),
                review_id: review.id.clone(),
                phase,
                verdict: review.next_phase_readiness,
            },
            now,
        );
        Ok(review)
    }

    /// Record actual spend against a plan task and return the refreshed
    /// budget tracking.
    pub fn record_spend(
        &self,
        caller: &Caller,
        project_id: &str,
        task_id: &str,
        actuals: TaskActuals,
        now: DateTime<Utc>,
    ) -> Result<BudgetTracking> {
        let basis = self.basis(&self.owned_project(caller, project_id)?)?;
        let (project, ()) = self.mutate(caller, project_id, now, |p| {
            p.record_spend(&basis.plan, task_id, actuals.clone())
        })?;
        self.emit(
            caller,
            ActivityEvent::BudgetRecorded {
                project_id: project_id.to_string(),
                task_id: task_id.to_string(),
                spent: actuals.spent,
            },
            now,
        );
        let total = self.total_budget(&project, &basis);
        Ok(budget::track(&basis.plan, &project.budget_ledger, Some(total)))
    }

    pub fn list_transitions(&self, caller: &Caller, project_id: &str) -> Result<Vec<PhaseTransitionRecord>> {
        self.get_project(caller, project_id)?;
        self.store.list_transitions(project_id)
    }

    pub fn workflow_status(&self, caller: &Caller, project_id: &str) -> Result<WorkflowStatus> {
        let project = self.get_project(caller, project_id)?;
        let basis = self.basis(&project)?;
        Ok(project.workflow_status(self.total_budget(&project, &basis)))
    }

    pub fn notifications(&self, caller: &Caller) -> Result<Vec<Notification>> {
        caller.ensure_identified()?;
        self.store.list_notifications(&caller.user_id)
    }

    pub fn activities(&self, caller: &Caller, limit: usize) -> Result<Vec<ActivityRecord>> {
        caller.ensure_identified()?;
        self.store.list_activities(&caller.user_id, limit)
    }

    // Analytics projections, owner-only.

    pub fn predictive_snapshot(&self, caller: &Caller, project_id: &str) -> Result<PredictiveSnapshot> {
        let project = self.owned_project(caller, project_id)?;
        let basis = self.basis(&project)?;
        let total = self.total_budget(&project, &basis);
        Ok(analytics::snapshot(basis.assessment_type, &basis.scores, basis.overall, total))
    }

    pub fn risk_monitoring(&self, caller: &Caller, project_id: &str, now: DateTime<Utc>) -> Result<RiskMonitoring> {
        let project = self.owned_project(caller, project_id)?;
        let basis = self.basis(&project)?;
        let total = self.total_budget(&project, &basis);
        let predictive = analytics::snapshot(basis.assessment_type, &basis.scores, basis.overall, total);
        Ok(monitoring::monitor(&project, total, &predictive, now))
    }

    pub fn budget_tracking(&self, caller: &Caller, project_id: &str) -> Result<BudgetTracking> {
        let project = self.owned_project(caller, project_id)?;
        let basis = self.basis(&project)?;
        let total = self.total_budget(&project, &basis);
        Ok(budget::track(&basis.plan, &project.budget_ledger, Some(total)))
    }

    pub fn forecast(&self, caller: &Caller, project_id: &str) -> Result<ProjectForecast> {
        let project = self.owned_project(caller, project_id)?;
        let basis = self.basis(&project)?;
        let total = self.total_budget(&project, &basis);
        let tracking = budget::track(&basis.plan, &project.budget_ledger, Some(total));
        Ok(forecast::forecast(&basis.scores, tracking.overall_metrics.budget_health))
    }

    pub fn communications(
        &self,
        caller: &Caller,
        project_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StakeholderCommunications> {
        let project = self.owned_project(caller, project_id)?;
        let basis = self.basis(&project)?;
        let total = self.total_budget(&project, &basis);
        let tracking = budget::track(&basis.plan, &project.budget_ledger, Some(total));
        let forecast = forecast::forecast(&basis.scores, tracking.overall_metrics.budget_health);
        Ok(forecast::communicate(&project.name, &tracking, &forecast, now))
    }

    /// Manufacturing excellence tracking with the project's total budget as
    /// the implementation investment.
    pub fn excellence(&self, caller: &Caller, project_id: &str) -> Result<ExcellenceTracking> {
        let project = self.owned_project(caller, project_id)?;
        let basis = self.basis(&project)?;
        let total = self.total_budget(&project, &basis);
        let tracking = budget::track(&basis.plan, &project.budget_ledger, Some(total));
        let outcomes = DeliveryOutcomes::compute(&basis.scores, tracking.overall_metrics.budget_health);
        Ok(forecast::track_excellence(&basis.scores, &outcomes, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::workflow::TaskStatus;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<String>>);

    impl ActivitySink for Arc<RecordingSink> {
        fn record(&self, record: &ActivityRecord) -> Result<()> {
            self.0.lock().unwrap().push(record.event.kind().to_string());
            Ok(())
        }
    }

    struct FailingSink;

    impl ActivitySink for FailingSink {
        fn record(&self, _: &ActivityRecord) -> Result<()> {
            Err(CoreError::Internal("sink down".into()))
        }
    }

    struct StalledNarrator;

    impl NarrativeGenerator for StalledNarrator {
        fn generate(&self, _: &NarrativeRequest) -> Result<String> {
            Err(CoreError::UpstreamTimeout {
                service: "anthropic".into(),
                timeout_secs: 60,
            })
        }
    }

    fn service() -> ImpactService {
        let store: Arc<dyn Store> = Arc::new(Database::open_memory().unwrap());
        ImpactService::new(store, Box::new(TemplateNarrator))
    }

    fn alice() -> Caller {
        Caller::new("alice", "acme")
    }

    fn draft(name: &str) -> ProjectDraft {
        ProjectDraft {
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn assessment_is_scored_and_stored() {
        let svc = service();
        let input = AssessmentInput::uniform(AssessmentTypeId::GeneralReadiness, "Atlas", 3);
        let a = svc.create_assessment(&alice(), &input, Utc::now()).unwrap();
        assert_eq!(a.report.overall_score, 3.0);
        assert!(a.narrative.contains("Readiness Analysis"));
        assert_eq!(svc.get_assessment(&alice(), &a.id).unwrap(), a);
        assert_eq!(svc.list_assessments(&alice()).unwrap().len(), 1);

        let outsider = Caller::new("mallory", "globex");
        assert_eq!(
            svc.get_assessment(&outsider, &a.id).unwrap_err().kind(),
            ErrorKind::Forbidden
        );
        assert!(svc.get_assessment(&outsider.admin(), &a.id).is_ok());
    }

    #[test]
    fn narrator_failure_stores_nothing() {
        let store: Arc<dyn Store> = Arc::new(Database::open_memory().unwrap());
        let svc = ImpactService::new(store, Box::new(StalledNarrator));
        let input = AssessmentInput::uniform(AssessmentTypeId::SoftwareImplementation, "ERP cutover", 4);

        let err = svc.create_assessment(&alice(), &input, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamTimeout);
        assert!(svc.list_assessments(&alice()).unwrap().is_empty());
        assert!(svc.activities(&alice(), 10).unwrap().is_empty());
    }

    #[test]
    fn anonymous_caller_is_rejected() {
        let svc = service();
        let err = svc.list_projects(&Caller::new("", "acme")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn duplicate_project_name_conflicts() {
        let svc = service();
        svc.create_project(&alice(), draft("Atlas"), Utc::now()).unwrap();
        let err = svc.create_project(&alice(), draft(" Atlas "), Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let other = svc.create_project(&alice(), draft("Borealis"), Utc::now()).unwrap();
        let rename = ProjectPatch {
            name: Some("Atlas".into()),
            ..Default::default()
        };
        let err = svc.update_project(&alice(), &other.id, &rename, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn only_owner_or_admin_mutates() {
        let svc = service();
        let p = svc.create_project(&alice(), draft("Atlas"), Utc::now()).unwrap();
        let task_id = p.tasks[0].id.clone();
        let update = TaskUpdate {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };

        let bob = Caller::new("bob", "acme");
        assert!(svc.get_project(&bob, &p.id).is_ok());
        let err = svc.update_task(&bob, &p.id, &task_id, &update, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let task = svc
            .update_task(&bob.admin(), &p.id, &task_id, &update, Utc::now())
            .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        let stored = svc.get_project(&alice(), &p.id).unwrap();
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn missing_project_is_not_found() {
        let svc = service();
        let err = svc
            .update_task(&alice(), "nope", "t", &TaskUpdate::default(), Utc::now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn failed_mutation_leaves_project_untouched() {
        let svc = service();
        let p = svc.create_project(&alice(), draft("Atlas"), Utc::now()).unwrap();
        let bad = PhaseProgressUpdate {
            completion_percentage: Some(150.0),
            ..Default::default()
        };
        assert!(svc
            .update_phase_progress(&alice(), &p.id, PhaseId::Investigate, &bad, Utc::now())
            .is_err());
        assert_eq!(svc.get_project(&alice(), &p.id).unwrap(), p);
    }

    #[test]
    fn sinks_see_events_and_failures_are_swallowed() {
        let recorder = Arc::new(RecordingSink::default());
        let svc = service()
            .with_sink(Box::new(Arc::clone(&recorder)))
            .with_sink(Box::new(FailingSink));
        let p = svc.create_project(&alice(), draft("Atlas"), Utc::now()).unwrap();
        svc.add_gate_review(&alice(), &p.id, PhaseId::Investigate, &GateReviewInput::default(), Utc::now())
            .unwrap();
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["project_created".to_string(), "gate_review_added".to_string()]
        );
        assert_eq!(svc.activities(&alice(), 10).unwrap().len(), 2);
    }

    #[test]
    fn blank_projects_use_default_budget() {
        let svc = service().with_default_budget(50_000.0);
        let p = svc.create_project(&alice(), draft("Atlas"), Utc::now()).unwrap();
        let status = svc.workflow_status(&alice(), &p.id).unwrap();
        assert_eq!(status.total_budget, 50_000.0);
        let tracking = svc.budget_tracking(&alice(), &p.id).unwrap();
        assert_eq!(tracking.overall_metrics.total_budget, 50_000.0);
        assert_eq!(tracking.overall_metrics.total_spent, 0.0);
    }
}
