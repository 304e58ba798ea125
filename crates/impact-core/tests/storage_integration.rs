//! On-disk persistence across reopened databases.

use std::sync::Arc;

use chrono::Utc;
use impact_core::readiness::TemplateNarrator;
use impact_core::service::Store;
use impact_core::storage::migrations;
use impact_core::storage::{JournalStore, ProjectStore};
use impact_core::workflow::{PhaseProgressUpdate, TransitionRequest};
use impact_core::{AssessmentInput, AssessmentTypeId, Caller, Config, Database, ImpactService, PhaseId, ProjectDraft};

fn open(path: &std::path::Path) -> ImpactService {
    let store: Arc<dyn Store> = Arc::new(Database::open_at(path).unwrap());
    ImpactService::new(store, Box::new(TemplateNarrator))
}

#[test]
fn documents_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("impact_test.db");
    let alice = Caller::new("alice", "acme");
    let now = Utc::now();

    let (assessment_id, project_id) = {
        let svc = open(&path);
        let input = AssessmentInput::uniform(AssessmentTypeId::BusinessProcess, "Invoice automation", 4);
        let assessment = svc.create_assessment(&alice, &input, now).unwrap();
        let project = svc
            .create_project_from_assessment(&alice, &assessment.id, ProjectDraft::default(), now)
            .unwrap();
        let update = PhaseProgressUpdate {
            completion_percentage: Some(90.0),
            ..Default::default()
        };
        svc.update_phase_progress(&alice, &project.id, PhaseId::Investigate, &update, now)
            .unwrap();
        let request = TransitionRequest {
            from_phase: PhaseId::Investigate,
            to_phase: PhaseId::Mobilize,
            transition_date: now,
            completion_notes: "scope agreed".into(),
            lessons_learned: None,
            gate_review_id: None,
        };
        svc.transition_phase(&alice, &project.id, &request, now).unwrap();
        (assessment.id, project.id)
    };

    let svc = open(&path);
    let assessment = svc.get_assessment(&alice, &assessment_id).unwrap();
    assert_eq!(assessment.overall_score(), 4.0);
    let project = svc.get_project(&alice, &project_id).unwrap();
    assert_eq!(project.current_phase, PhaseId::Mobilize);
    assert_eq!(project.assessment_id.as_deref(), Some(assessment_id.as_str()));
    assert_eq!(svc.list_transitions(&alice, &project_id).unwrap().len(), 1);
    assert!(!svc.notifications(&alice).unwrap().is_empty());
}

#[test]
fn unjournalled_transition_is_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("impact_test.db");
    let alice = Caller::new("alice", "acme");
    let now = Utc::now();
    let svc = open(&path);

    let draft = ProjectDraft {
        name: "Atlas".into(),
        ..Default::default()
    };
    let project = svc.create_project(&alice, draft, now).unwrap();
    let update = PhaseProgressUpdate {
        completion_percentage: Some(90.0),
        ..Default::default()
    };
    svc.update_phase_progress(&alice, &project.id, PhaseId::Investigate, &update, now)
        .unwrap();
    let request = TransitionRequest {
        from_phase: PhaseId::Investigate,
        to_phase: PhaseId::Mobilize,
        transition_date: now,
        completion_notes: "scope agreed".into(),
        lessons_learned: None,
        gate_review_id: None,
    };

    let side = rusqlite::Connection::open(&path).unwrap();
    side.execute_batch("ALTER TABLE phase_transitions RENAME TO phase_transitions_offline")
        .unwrap();
    assert!(svc.transition_phase(&alice, &project.id, &request, now).is_err());

    let unchanged = svc.get_project(&alice, &project.id).unwrap();
    assert_eq!(unchanged.current_phase, PhaseId::Investigate);
    assert_eq!(unchanged.version, project.version + 1);

    side.execute_batch("ALTER TABLE phase_transitions_offline RENAME TO phase_transitions")
        .unwrap();
    assert!(svc.list_transitions(&alice, &project.id).unwrap().is_empty());
    let record = svc.transition_phase(&alice, &project.id, &request, now).unwrap();
    assert_eq!(record.to_phase, PhaseId::Mobilize);
    assert_eq!(svc.list_transitions(&alice, &project.id).unwrap().len(), 1);
    assert_eq!(
        svc.get_project(&alice, &project.id).unwrap().current_phase,
        PhaseId::Mobilize
    );
}

#[test]
fn reopened_store_keeps_version_guard() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("impact_test.db");
    let now = Utc::now();
    let draft = ProjectDraft {
        name: "Atlas".into(),
        ..Default::default()
    };
    let project = impact_core::Project::blank(draft, "alice", "acme", now);
    Database::open_at(&path).unwrap().insert_project(&project).unwrap();

    let db = Database::open_at(&path).unwrap();
    let mut next = project.clone();
    next.version = 1;
    assert!(db.compare_and_swap(&next, 0).unwrap());
    assert!(!db.compare_and_swap(&next, 0).unwrap());
    assert!(db.list_activities("alice", 10).unwrap().is_empty());
}

#[test]
fn schema_is_current_after_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("impact_test.db");
    drop(Database::open_at(&path).unwrap());

    let conn = rusqlite::Connection::open(&path).unwrap();
    assert_eq!(migrations::get_schema_version(&conn).unwrap(), 2);
    migrations::migrate(&conn).unwrap();
    assert_eq!(migrations::get_schema_version(&conn).unwrap(), 2);
}

#[test]
fn config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.set("database.name", "impact_staging").unwrap();
    config.set("analytics.default_total_budget", "75000").unwrap();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.database.name, "impact_staging");
    assert_eq!(loaded.analytics.default_total_budget, 75_000.0);
}
