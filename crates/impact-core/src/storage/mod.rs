pub mod config;
pub mod database;
pub mod migrations;

pub use config::Config;
pub use database::Database;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::events::{ActivityRecord, Notification};
use crate::readiness::Assessment;
use crate::workflow::{PhaseTransitionRecord, Project};

/// Returns `~/.config/impact[-dev]/` based on IMPACT_ENV.
///
/// Set IMPACT_ENV=dev to use the development data directory, or
/// IMPACT_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("IMPACT_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .ok_or_else(|| ConfigError::DataDir("home directory not found".into()))?
                .join(".config");
            let env = std::env::var("IMPACT_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("impact-dev")
            } else {
                base_dir.join("impact")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Assessment documents.
pub trait AssessmentStore: Send + Sync {
    fn insert_assessment(&self, assessment: &Assessment) -> Result<()>;
    fn get_assessment(&self, id: &str) -> Result<Option<Assessment>>;
    /// Assessments visible to `organization`, newest first.
    fn list_assessments(&self, organization: &str) -> Result<Vec<Assessment>>;
}

/// Project documents with optimistic concurrency.
pub trait ProjectStore: Send + Sync {
    /// Insert a new project. A duplicate name within the organization or a
    /// second project for the same assessment is a `Conflict`.
    fn insert_project(&self, project: &Project) -> Result<()>;
    fn get_project(&self, id: &str) -> Result<Option<Project>>;
    fn list_projects(&self, organization: &str) -> Result<Vec<Project>>;
    /// Write `project` only if the stored version is still `expected_version`.
    /// Returns whether the write happened.
    fn compare_and_swap(&self, project: &Project, expected_version: u64) -> Result<bool>;
    /// [`compare_and_swap`](Self::compare_and_swap) plus the journal row for
    /// `record`, committed together or not at all.
    fn compare_and_swap_with_transition(
        &self,
        project: &Project,
        expected_version: u64,
        record: &PhaseTransitionRecord,
    ) -> Result<bool>;
}

/// Append-only journals: transitions, activities and notifications.
pub trait JournalStore: Send + Sync {
    fn append_transition(&self, record: &PhaseTransitionRecord) -> Result<()>;
    fn list_transitions(&self, project_id: &str) -> Result<Vec<PhaseTransitionRecord>>;
    fn append_activity(&self, record: &ActivityRecord) -> Result<()>;
    fn list_activities(&self, user_id: &str, limit: usize) -> Result<Vec<ActivityRecord>>;
    fn push_notification(&self, notification: &Notification) -> Result<()>;
    fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>>;
}
