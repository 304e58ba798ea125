//! Project lifecycle through the service layer.

use std::sync::Arc;
use std::thread;

use chrono::{Duration, Utc};
use impact_core::readiness::TemplateNarrator;
use impact_core::service::Store;
use impact_core::workflow::{
    DeliverableStatus, DeliverableUpdate, GateReviewInput, GateVerdict, PhaseCompletion, PhaseProgressUpdate,
    PhaseStatus, ProjectPatch, TaskStatus, TaskUpdate, TransitionRequest,
};
use impact_core::{
    AssessmentInput, AssessmentTypeId, Caller, Database, ErrorKind, ImpactService, PhaseId, ProjectDraft,
    ProjectStatus, TaskActuals,
};

fn service() -> ImpactService {
    let store: Arc<dyn Store> = Arc::new(Database::open_memory().unwrap());
    ImpactService::new(store, Box::new(TemplateNarrator))
}

fn alice() -> Caller {
    Caller::new("alice", "acme")
}

fn progress(pct: f64) -> PhaseProgressUpdate {
    PhaseProgressUpdate {
        completion_percentage: Some(pct),
        ..Default::default()
    }
}

fn step(from: PhaseId, to: PhaseId) -> TransitionRequest {
    TransitionRequest {
        from_phase: from,
        to_phase: to,
        transition_date: Utc::now(),
        completion_notes: format!("{from} closed"),
        lessons_learned: Some(format!("lesson from {from}")),
        gate_review_id: None,
    }
}

#[test]
fn assessment_to_completed_project() {
    let svc = service();
    let now = Utc::now();
    let input = AssessmentInput::uniform(AssessmentTypeId::SoftwareImplementation, "ERP cutover", 4);
    let assessment = svc.create_assessment(&alice(), &input, now).unwrap();

    let project = svc
        .create_project_from_assessment(&alice(), &assessment.id, ProjectDraft::default(), now)
        .unwrap();
    assert_eq!(project.name, "ERP cutover");
    assert_eq!(project.budget, Some(assessment.implementation_plan.summary.total_budget as f64));
    let weeks = i64::from(assessment.recommended_project.suggested_duration_weeks);
    assert_eq!(project.target_completion_date, Some(now + Duration::weeks(weeks)));
    for phase in PhaseId::ALL {
        assert!(project.has_work_for(phase), "no work generated for {phase}");
    }

    // A second project from the same assessment is refused.
    let again = svc
        .create_project_from_assessment(
            &alice(),
            &assessment.id,
            ProjectDraft {
                name: "Other".into(),
                ..Default::default()
            },
            now,
        )
        .unwrap_err();
    assert_eq!(again.kind(), ErrorKind::Conflict);

    let mut phase = PhaseId::Investigate;
    while let Some(next) = phase.next() {
        svc.update_phase_progress(&alice(), &project.id, phase, &progress(90.0), now)
            .unwrap();
        let record = svc.transition_phase(&alice(), &project.id, &step(phase, next), now).unwrap();
        assert_eq!(record.user_id, "alice");
        phase = next;
    }

    svc.update_phase_progress(&alice(), &project.id, PhaseId::Track, &progress(95.0), now)
        .unwrap();
    let analysis = svc
        .complete_phase(&alice(), &project.id, PhaseId::Track, &PhaseCompletion::default(), now)
        .unwrap();
    assert_eq!(analysis.next_phase, None);
    assert_eq!(analysis.lessons_learned.len(), 5);

    let done = svc.get_project(&alice(), &project.id).unwrap();
    assert_eq!(done.status, ProjectStatus::Completed);
    assert!(done.phases.iter().all(|p| p.status == PhaseStatus::Completed));
    assert_eq!(svc.list_transitions(&alice(), &project.id).unwrap().len(), 5);

    let notifications = svc.notifications(&alice()).unwrap();
    assert_eq!(notifications.len(), 6);
    assert!(notifications.iter().any(|n| n.title == "Project completed"));

    let err = svc
        .update_phase_progress(&alice(), &project.id, PhaseId::Track, &progress(100.0), now)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn out_of_order_transition_conflicts() {
    let svc = service();
    let now = Utc::now();
    let project = svc
        .create_project(
            &alice(),
            ProjectDraft {
                name: "Atlas".into(),
                ..Default::default()
            },
            now,
        )
        .unwrap();
    svc.update_phase_progress(&alice(), &project.id, PhaseId::Investigate, &progress(100.0), now)
        .unwrap();

    let err = svc
        .transition_phase(&alice(), &project.id, &step(PhaseId::Investigate, PhaseId::Pilot), now)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(svc.list_transitions(&alice(), &project.id).unwrap().is_empty());
}

#[test]
fn work_items_drive_phase_progress() {
    let svc = service();
    let now = Utc::now();
    let project = svc
        .create_project(
            &alice(),
            ProjectDraft {
                name: "Atlas".into(),
                ..Default::default()
            },
            now,
        )
        .unwrap();
    assert!(!project.has_work_for(PhaseId::Mobilize));

    let task_id = project.tasks_in(PhaseId::Investigate).next().unwrap().id.clone();
    let started = TaskUpdate {
        status: Some(TaskStatus::InProgress),
        ..Default::default()
    };
    svc.update_task(&alice(), &project.id, &task_id, &started, now).unwrap();

    let current = svc.get_project(&alice(), &project.id).unwrap();
    let investigate = current.phase(PhaseId::Investigate).unwrap();
    assert_eq!(investigate.status, PhaseStatus::InProgress);
    assert!(investigate.completion_percentage > 0.0);

    for deliverable in current.deliverables_in(PhaseId::Investigate) {
        let update = DeliverableUpdate {
            status: Some(DeliverableStatus::Approved),
            ..Default::default()
        };
        let d = svc
            .update_deliverable(&alice(), &project.id, &deliverable.id, &update, now)
            .unwrap();
        assert!(d.completed_date.is_some());
    }
    let review = svc
        .add_gate_review(&alice(), &project.id, PhaseId::Investigate, &GateReviewInput::default(), now)
        .unwrap();
    assert_eq!(review.next_phase_readiness, GateVerdict::NotReady);
    assert!(review.deliverables_status.values().all(|s| *s == DeliverableStatus::Approved));
}

#[test]
fn on_hold_projects_reject_work() {
    let svc = service();
    let now = Utc::now();
    let project = svc
        .create_project(
            &alice(),
            ProjectDraft {
                name: "Atlas".into(),
                ..Default::default()
            },
            now,
        )
        .unwrap();
    let hold = ProjectPatch {
        status: Some(ProjectStatus::OnHold),
        ..Default::default()
    };
    svc.update_project(&alice(), &project.id, &hold, now).unwrap();

    let err = svc
        .update_phase_progress(&alice(), &project.id, PhaseId::Investigate, &progress(10.0), now)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let complete = ProjectPatch {
        status: Some(ProjectStatus::Completed),
        ..Default::default()
    };
    assert!(svc.update_project(&alice(), &project.id, &complete, now).is_err());
}

#[test]
fn concurrent_task_updates_are_serialized() {
    let svc = Arc::new(service());
    let now = Utc::now();
    let project = svc
        .create_project(
            &alice(),
            ProjectDraft {
                name: "Atlas".into(),
                ..Default::default()
            },
            now,
        )
        .unwrap();
    let task_ids: Vec<String> = project.tasks.iter().map(|t| t.id.clone()).collect();

    let handles: Vec<_> = task_ids
        .iter()
        .cloned()
        .map(|task_id| {
            let svc = Arc::clone(&svc);
            let project_id = project.id.clone();
            thread::spawn(move || {
                let update = TaskUpdate {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                };
                svc.update_task(&alice(), &project_id, &task_id, &update, Utc::now())
                    .unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let stored = svc.get_project(&alice(), &project.id).unwrap();
    assert_eq!(stored.version, task_ids.len() as u64);
    assert!(stored.tasks.iter().all(|t| t.status == TaskStatus::Completed));
    stored.check_invariants().unwrap();
}

#[test]
fn spend_feeds_budget_analytics() {
    let svc = service();
    let now = Utc::now();
    let input = AssessmentInput::uniform(AssessmentTypeId::GeneralReadiness, "Atlas", 3);
    let assessment = svc.create_assessment(&alice(), &input, now).unwrap();
    let project = svc
        .create_project_from_assessment(&alice(), &assessment.id, ProjectDraft::default(), now)
        .unwrap();

    let actuals = TaskActuals {
        spent: 4_000.0,
        completion_percentage: 100.0,
        elapsed_weeks: 1.0,
    };
    let tracking = svc
        .record_spend(&alice(), &project.id, "task_1", actuals, now)
        .unwrap();
    assert_eq!(tracking.overall_metrics.total_spent, 4_000.0);

    let stored = svc.get_project(&alice(), &project.id).unwrap();
    assert_eq!(stored.spent_budget, 4_000.0);

    let err = svc
        .record_spend(&alice(), &project.id, "task_11", TaskActuals::default(), now)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let bob = Caller::new("bob", "acme");
    assert_eq!(
        svc.budget_tracking(&bob, &project.id).unwrap_err().kind(),
        ErrorKind::Forbidden
    );
    let monitoring = svc.risk_monitoring(&alice(), &project.id, now).unwrap();
    assert_eq!(monitoring.project_id, project.id);
    let comms = svc.communications(&alice(), &project.id, now).unwrap();
    assert!(comms.next_communication_date > now);
    svc.forecast(&alice(), &project.id).unwrap();
    svc.excellence(&alice(), &project.id).unwrap();
    svc.predictive_snapshot(&alice(), &project.id).unwrap();
}
