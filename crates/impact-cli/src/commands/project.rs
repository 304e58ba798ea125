//! Project workflow commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use impact_core::workflow::{
    DeliverableStatus, DeliverableUpdate, GateReviewInput, GateVerdict, PhaseCompletion, PhaseProgressUpdate,
    Priority, ProjectPatch, SuccessStatus, TaskStatus, TaskUpdate, TransitionRequest,
};
use impact_core::{Config, PhaseId, ProjectDraft, ProjectStatus, TaskActuals};

use super::{non_empty, open_service, parse_date, parse_enum, print_json, CliResult, Identity};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a blank project
    Create {
        /// Project name
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        budget: Option<f64>,
        /// Target completion date
        #[arg(long, value_parser = parse_date)]
        target: Option<DateTime<Utc>>,
    },
    /// Create a fully generated project from an assessment
    FromAssessment {
        /// Assessment id
        assessment_id: String,
        /// Project name (defaults to the assessment's project)
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long, value_parser = parse_date)]
        target: Option<DateTime<Utc>>,
    },
    /// Show a project
    Show { id: String },
    /// List projects of the caller's organization
    List,
    /// Patch project fields
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        budget: Option<f64>,
        #[arg(long, value_parser = parse_date)]
        target: Option<DateTime<Utc>>,
        /// active | on_hold
        #[arg(long, value_parser = parse_enum::<ProjectStatus>)]
        status: Option<ProjectStatus>,
        /// Replaces the risk list, repeatable
        #[arg(long = "risk")]
        risks: Vec<String>,
        /// Replaces the issue list, repeatable
        #[arg(long = "issue")]
        issues: Vec<String>,
    },
    /// Update a task
    Task {
        project_id: String,
        task_id: String,
        #[arg(long, value_parser = parse_enum::<TaskStatus>)]
        status: Option<TaskStatus>,
        #[arg(long)]
        assign: Option<String>,
        #[arg(long, value_parser = parse_date)]
        due: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_enum::<Priority>)]
        priority: Option<Priority>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Update a deliverable
    Deliverable {
        project_id: String,
        deliverable_id: String,
        #[arg(long, value_parser = parse_enum::<DeliverableStatus>)]
        status: Option<DeliverableStatus>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        approval_notes: Option<String>,
        #[arg(long)]
        assign: Option<String>,
        #[arg(long, value_parser = parse_date)]
        due: Option<DateTime<Utc>>,
    },
    /// Move the project to its next phase
    Transition {
        project_id: String,
        #[arg(long, value_parser = parse_enum::<PhaseId>)]
        from: PhaseId,
        #[arg(long, value_parser = parse_enum::<PhaseId>)]
        to: PhaseId,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long)]
        lessons: Option<String>,
        #[arg(long)]
        gate_review: Option<String>,
    },
    /// Update phase progress fields
    Progress {
        project_id: String,
        #[arg(value_parser = parse_enum::<PhaseId>)]
        phase: PhaseId,
        #[arg(long)]
        completion: Option<f64>,
        #[arg(long)]
        budget_spent: Option<f64>,
        #[arg(long, value_parser = parse_enum::<SuccessStatus>)]
        success_status: Option<SuccessStatus>,
        #[arg(long)]
        success_reason: Option<String>,
        #[arg(long)]
        failure_reason: Option<String>,
        #[arg(long)]
        lessons: Option<String>,
        #[arg(long = "scope-change")]
        scope_changes: Vec<String>,
        #[arg(long = "risk")]
        risks: Vec<String>,
    },
    /// Complete a phase and print its completion analysis
    CompletePhase {
        project_id: String,
        #[arg(value_parser = parse_enum::<PhaseId>)]
        phase: PhaseId,
        #[arg(long)]
        lessons: Option<String>,
        #[arg(long)]
        success_reason: Option<String>,
    },
    /// Mark an in-progress phase as failed
    FailPhase {
        project_id: String,
        #[arg(value_parser = parse_enum::<PhaseId>)]
        phase: PhaseId,
        #[arg(long)]
        reason: String,
    },
    /// Record a gate review
    GateReview {
        project_id: String,
        #[arg(value_parser = parse_enum::<PhaseId>)]
        phase: PhaseId,
        #[arg(long = "criterion")]
        criteria: Vec<String>,
        #[arg(long = "issue")]
        issues: Vec<String>,
        #[arg(long = "recommendation")]
        recommendations: Vec<String>,
        /// Overrides the computed verdict: ready | conditional | not_ready
        #[arg(long, value_parser = parse_enum::<GateVerdict>)]
        verdict: Option<GateVerdict>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Record actual spend against a plan task (task_1..task_10)
    Spend {
        project_id: String,
        task_id: String,
        #[arg(long)]
        spent: f64,
        #[arg(long, default_value_t = 0.0)]
        completion: f64,
        #[arg(long, default_value_t = 0.0)]
        elapsed_weeks: f64,
    },
    /// Transition journal of a project
    Transitions { project_id: String },
    /// Phase counts, budget and success rate
    WorkflowStatus { project_id: String },
    /// Notifications for the caller
    Notifications,
    /// Recent activity of the caller
    Activities {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

pub fn run(action: ProjectAction, identity: &Identity, config: &Config) -> CliResult {
    let caller = identity.caller()?;
    let service = open_service(config)?;
    let now = Utc::now();

    match action {
        ProjectAction::Create {
            name,
            description,
            budget,
            target,
        } => {
            let draft = ProjectDraft {
                name,
                description,
                budget,
                target_completion_date: target,
            };
            print_json(&service.create_project(&caller, draft, now)?)
        }
        ProjectAction::FromAssessment {
            assessment_id,
            name,
            description,
            budget,
            target,
        } => {
            let draft = ProjectDraft {
                name,
                description,
                budget,
                target_completion_date: target,
            };
            print_json(&service.create_project_from_assessment(&caller, &assessment_id, draft, now)?)
        }
        ProjectAction::Show { id } => print_json(&service.get_project(&caller, &id)?),
        ProjectAction::List => print_json(&service.list_projects(&caller)?),
        ProjectAction::Update {
            id,
            name,
            description,
            budget,
            target,
            status,
            risks,
            issues,
        } => {
            let patch = ProjectPatch {
                name,
                description,
                budget,
                target_completion_date: target,
                status,
                risks: non_empty(risks),
                issues: non_empty(issues),
            };
            print_json(&service.update_project(&caller, &id, &patch, now)?)
        }
        ProjectAction::Task {
            project_id,
            task_id,
            status,
            assign,
            due,
            priority,
            notes,
        } => {
            let update = TaskUpdate {
                status,
                assigned_to: assign,
                due_date: due,
                priority,
                notes,
            };
            print_json(&service.update_task(&caller, &project_id, &task_id, &update, now)?)
        }
        ProjectAction::Deliverable {
            project_id,
            deliverable_id,
            status,
            content,
            approval_notes,
            assign,
            due,
        } => {
            let update = DeliverableUpdate {
                status,
                content,
                approval_notes,
                assigned_to: assign,
                due_date: due,
            };
            print_json(&service.update_deliverable(&caller, &project_id, &deliverable_id, &update, now)?)
        }
        ProjectAction::Transition {
            project_id,
            from,
            to,
            notes,
            lessons,
            gate_review,
        } => {
            let request = TransitionRequest {
                from_phase: from,
                to_phase: to,
                transition_date: now,
                completion_notes: notes,
                lessons_learned: lessons,
                gate_review_id: gate_review,
            };
            print_json(&service.transition_phase(&caller, &project_id, &request, now)?)
        }
        ProjectAction::Progress {
            project_id,
            phase,
            completion,
            budget_spent,
            success_status,
            success_reason,
            failure_reason,
            lessons,
            scope_changes,
            risks,
        } => {
            let update = PhaseProgressUpdate {
                completion_percentage: completion,
                budget_spent,
                success_status,
                success_reason,
                failure_reason,
                lessons_learned: lessons,
                scope_changes: non_empty(scope_changes),
                risks_identified: non_empty(risks),
            };
            print_json(&service.update_phase_progress(&caller, &project_id, phase, &update, now)?)
        }
        ProjectAction::CompletePhase {
            project_id,
            phase,
            lessons,
            success_reason,
        } => {
            let completion = PhaseCompletion {
                lessons_learned: lessons,
                success_reason,
            };
            print_json(&service.complete_phase(&caller, &project_id, phase, &completion, now)?)
        }
        ProjectAction::FailPhase {
            project_id,
            phase,
            reason,
        } => print_json(&service.fail_phase(&caller, &project_id, phase, &reason, now)?),
        ProjectAction::GateReview {
            project_id,
            phase,
            criteria,
            issues,
            recommendations,
            verdict,
            notes,
        } => {
            let input = GateReviewInput {
                success_criteria_met: criteria,
                issues_identified: issues,
                recommendations,
                next_phase_readiness: verdict,
                notes,
            };
            print_json(&service.add_gate_review(&caller, &project_id, phase, &input, now)?)
        }
        ProjectAction::Spend {
            project_id,
            task_id,
            spent,
            completion,
            elapsed_weeks,
        } => {
            let actuals = TaskActuals {
                spent,
                completion_percentage: completion,
                elapsed_weeks,
            };
            print_json(&service.record_spend(&caller, &project_id, &task_id, actuals, now)?)
        }
        ProjectAction::Transitions { project_id } => print_json(&service.list_transitions(&caller, &project_id)?),
        ProjectAction::WorkflowStatus { project_id } => print_json(&service.workflow_status(&caller, &project_id)?),
        ProjectAction::Notifications => print_json(&service.notifications(&caller)?),
        ProjectAction::Activities { limit } => print_json(&service.activities(&caller, limit)?),
    }
}
