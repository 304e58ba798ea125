use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{AssessmentTypeId, PhaseId};
use crate::workflow::{DeliverableStatus, GateVerdict, TaskStatus};

/// Every workflow mutation produces an ActivityEvent.
/// Sinks receive them after the primary write has succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ActivityEvent {
    AssessmentCreated {
        assessment_id: String,
        assessment_type: AssessmentTypeId,
        overall_score: f64,
    },
    ProjectCreated {
        project_id: String,
        name: String,
        assessment_id: Option<String>,
    },
    ProjectUpdated {
        project_id: String,
    },
    TaskUpdated {
        project_id: String,
        task_id: String,
        status: TaskStatus,
    },
    DeliverableUpdated {
        project_id: String,
        deliverable_id: String,
        status: DeliverableStatus,
    },
    PhaseProgressUpdated {
        project_id: String,
        phase: PhaseId,
        completion_percentage: f64,
    },
    PhaseTransitioned {
        project_id: String,
        from_phase: PhaseId,
        to_phase: PhaseId,
    },
    PhaseCompleted {
        project_id: String,
        phase: PhaseId,
    },
    PhaseFailed {
        project_id: String,
        phase: PhaseId,
    },
    GateReviewAdded {
        project_id: String,
        review_id: String,
        phase: PhaseId,
        verdict: GateVerdict,
    },
    BudgetRecorded {
        project_id: String,
        task_id: String,
        spent: f64,
    },
}

impl ActivityEvent {
    /// Tag stored alongside the record for filtering.
    pub fn kind(&self) -> &'static str {
        match self {
            ActivityEvent::AssessmentCreated { .. } => "assessment_created",
            ActivityEvent::ProjectCreated { .. } => "project_created",
            ActivityEvent::ProjectUpdated { .. } => "project_updated",
            ActivityEvent::TaskUpdated { .. } => "task_updated",
            ActivityEvent::DeliverableUpdated { .. } => "deliverable_updated",
            ActivityEvent::PhaseProgressUpdated { .. } => "phase_progress_updated",
            ActivityEvent::PhaseTransitioned { .. } => "phase_transitioned",
            ActivityEvent::PhaseCompleted { .. } => "phase_completed",
            ActivityEvent::PhaseFailed { .. } => "phase_failed",
            ActivityEvent::GateReviewAdded { .. } => "gate_review_added",
            ActivityEvent::BudgetRecorded { .. } => "budget_recorded",
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        match self {
            ActivityEvent::AssessmentCreated { .. } => None,
            ActivityEvent::ProjectCreated { project_id, .. }
            | ActivityEvent::ProjectUpdated { project_id }
            | ActivityEvent::TaskUpdated { project_id, .. }
            | ActivityEvent::DeliverableUpdated { project_id, .. }
            | ActivityEvent::PhaseProgressUpdated { project_id, .. }
            | ActivityEvent::PhaseTransitioned { project_id, .. }
            | ActivityEvent::PhaseCompleted { project_id, .. }
            | ActivityEvent::PhaseFailed { project_id, .. }
            | ActivityEvent::GateReviewAdded { project_id, .. }
            | ActivityEvent::BudgetRecorded { project_id, .. } => Some(project_id),
        }
    }
}

/// A journalled activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityRecord {
    pub id: String,
    pub user_id: String,
    pub event: ActivityEvent,
    pub at: DateTime<Utc>,
}

impl ActivityRecord {
    pub fn new(user_id: &str, event: ActivityEvent, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            event,
            at,
        }
    }
}

/// Message pushed to a project owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: &str,
        project_id: &str,
        title: impl Into<String>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            project_id: project_id.to_string(),
            title: title.into(),
            message: message.into(),
            created_at,
        }
    }
}

/// Fire-and-forget receiver of activity records. Errors are logged by the
/// caller and never fail the mutation.
pub trait ActivitySink: Send + Sync {
    fn record(&self, record: &ActivityRecord) -> crate::error::Result<()>;
}

/// Emits every record as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ActivitySink for TracingSink {
    fn record(&self, record: &ActivityRecord) -> crate::error::Result<()> {
        tracing::info!(
            user_id = %record.user_id,
            kind = record.event.kind(),
            project_id = record.event.project_id().unwrap_or("-"),
            "activity"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = ActivityEvent::PhaseTransitioned {
            project_id: "p1".into(),
            from_phase: PhaseId::Investigate,
            to_phase: PhaseId::Mobilize,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PhaseTransitioned");
        assert_eq!(json["to_phase"], "mobilize");
        assert_eq!(event.kind(), "phase_transitioned");
        assert_eq!(event.project_id(), Some("p1"));
    }

    #[test]
    fn assessment_events_have_no_project() {
        let event = ActivityEvent::AssessmentCreated {
            assessment_id: "a1".into(),
            assessment_type: AssessmentTypeId::GeneralReadiness,
            overall_score: 3.0,
        };
        assert_eq!(event.project_id(), None);
        assert!(TracingSink.record(&ActivityRecord::new("u1", event, Utc::now())).is_ok());
    }
}
