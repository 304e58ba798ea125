//! SQLite-based document storage.
//!
//! Provides persistent storage for:
//! - Assessments and projects as JSON documents with indexed columns
//! - Versioned project writes (compare-and-swap on `version`)
//! - Append-only transition, activity and notification journals

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;

use super::{migrations, AssessmentStore, Config, JournalStore, ProjectStore};
use crate::error::{CoreError, DatabaseError, Result};
use crate::events::{ActivityRecord, Notification};
use crate::readiness::Assessment;
use crate::workflow::{PhaseTransitionRecord, Project};

/// SQLite database holding every IMPACT document.
pub struct Database {
    conn: Mutex<Connection>,
}

fn decode<T: DeserializeOwned>(doc: &str) -> Result<T> {
    Ok(serde_json::from_str(doc)?)
}

fn decode_all<T: DeserializeOwned>(docs: Vec<String>) -> Result<Vec<T>> {
    docs.iter().map(|d| decode(d)).collect()
}

/// Versioned write; `false` when the stored version moved on.
fn update_project(conn: &Connection, project: &Project, expected_version: u64) -> Result<bool> {
    let doc = serde_json::to_string(project)?;
    let changed = conn.execute(
        "UPDATE projects SET name = ?1, version = ?2, doc = ?3, updated_at = ?4
         WHERE id = ?5 AND version = ?6",
        params![
            project.name,
            project.version as i64,
            doc,
            project.updated_at.to_rfc3339(),
            project.id,
            expected_version as i64,
        ],
    )?;
    Ok(changed == 1)
}

fn insert_transition(conn: &Connection, record: &PhaseTransitionRecord) -> Result<()> {
    let doc = serde_json::to_string(record)?;
    conn.execute(
        "INSERT INTO phase_transitions (id, project_id, doc, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![record.id, record.project_id, doc, record.created_at.to_rfc3339()],
    )?;
    Ok(())
}

impl Database {
    /// Open the database named by `config` in the data directory.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_at(&config.database_path()?)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Internal("database connection mutex poisoned".into()))
    }

    fn query_docs(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;
        let docs = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    fn query_doc(&self, sql: &str, id: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let doc = conn
            .query_row(sql, params![id], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(doc)
    }
}

impl AssessmentStore for Database {
    fn insert_assessment(&self, assessment: &Assessment) -> Result<()> {
        let doc = serde_json::to_string(assessment)?;
        self.conn()?.execute(
            "INSERT INTO assessments (id, user_id, organization, assessment_type, project_name, doc, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                assessment.id,
                assessment.user_id,
                assessment.organization,
                assessment.assessment_type.as_str(),
                assessment.project_name,
                doc,
                assessment.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get_assessment(&self, id: &str) -> Result<Option<Assessment>> {
        self.query_doc("SELECT doc FROM assessments WHERE id = ?1", id)?
            .map(|d| decode(&d))
            .transpose()
    }

    fn list_assessments(&self, organization: &str) -> Result<Vec<Assessment>> {
        decode_all(self.query_docs(
            "SELECT doc FROM assessments WHERE organization = ?1 ORDER BY created_at DESC",
            params![organization],
        )?)
    }
}

impl ProjectStore for Database {
    fn insert_project(&self, project: &Project) -> Result<()> {
        let doc = serde_json::to_string(project)?;
        self.conn()?.execute(
            "INSERT INTO projects (id, owner_id, organization, name, assessment_id, version, doc, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                project.id,
                project.owner_id,
                project.organization,
                project.name,
                project.assessment_id,
                project.version as i64,
                doc,
                project.created_at.to_rfc3339(),
                project.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get_project(&self, id: &str) -> Result<Option<Project>> {
        self.query_doc("SELECT doc FROM projects WHERE id = ?1", id)?
            .map(|d| decode(&d))
            .transpose()
    }

    fn list_projects(&self, organization: &str) -> Result<Vec<Project>> {
        decode_all(self.query_docs(
            "SELECT doc FROM projects WHERE organization = ?1 ORDER BY created_at DESC",
            params![organization],
        )?)
    }

    fn compare_and_swap(&self, project: &Project, expected_version: u64) -> Result<bool> {
        update_project(&*self.conn()?, project, expected_version)
    }

    fn compare_and_swap_with_transition(
        &self,
        project: &Project,
        expected_version: u64,
        record: &PhaseTransitionRecord,
    ) -> Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        if !update_project(&tx, project, expected_version)? {
            return Ok(false);
        }
        insert_transition(&tx, record)?;
        tx.commit()?;
        Ok(true)
    }
}

impl JournalStore for Database {
    fn append_transition(&self, record: &PhaseTransitionRecord) -> Result<()> {
        insert_transition(&*self.conn()?, record)
    }

    fn list_transitions(&self, project_id: &str) -> Result<Vec<PhaseTransitionRecord>> {
        decode_all(self.query_docs(
            "SELECT doc FROM phase_transitions WHERE project_id = ?1 ORDER BY created_at, rowid",
            params![project_id],
        )?)
    }

    fn append_activity(&self, record: &ActivityRecord) -> Result<()> {
        let doc = serde_json::to_string(record)?;
        self.conn()?.execute(
            "INSERT INTO user_activities (id, user_id, project_id, kind, doc, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.user_id,
                record.event.project_id(),
                record.event.kind(),
                doc,
                record.at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn list_activities(&self, user_id: &str, limit: usize) -> Result<Vec<ActivityRecord>> {
        decode_all(self.query_docs(
            "SELECT doc FROM user_activities WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            params![user_id, limit as i64],
        )?)
    }

    fn push_notification(&self, notification: &Notification) -> Result<()> {
        let doc = serde_json::to_string(notification)?;
        self.conn()?.execute(
            "INSERT INTO user_notifications (id, user_id, doc, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                notification.id,
                notification.user_id,
                doc,
                notification.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>> {
        decode_all(self.query_docs(
            "SELECT doc FROM user_notifications WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
            params![user_id],
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PhaseId;
    use crate::error::ErrorKind;
    use crate::workflow::ProjectDraft;
    use chrono::Utc;

    fn project(name: &str, org: &str) -> Project {
        Project::blank(
            ProjectDraft {
                name: name.into(),
                ..Default::default()
            },
            "u1",
            org,
            Utc::now(),
        )
    }

    #[test]
    fn project_roundtrip() {
        let db = Database::open_memory().unwrap();
        let p = project("Atlas", "acme");
        db.insert_project(&p).unwrap();
        let loaded = db.get_project(&p.id).unwrap().unwrap();
        assert_eq!(loaded, p);
        assert!(db.get_project("missing").unwrap().is_none());
        assert_eq!(db.list_projects("acme").unwrap().len(), 1);
        assert!(db.list_projects("other").unwrap().is_empty());
    }

    #[test]
    fn duplicate_name_in_org_is_conflict() {
        let db = Database::open_memory().unwrap();
        db.insert_project(&project("Atlas", "acme")).unwrap();
        let err = db.insert_project(&project("Atlas", "acme")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        db.insert_project(&project("Atlas", "globex")).unwrap();
    }

    #[test]
    fn assessment_seeds_one_project() {
        let db = Database::open_memory().unwrap();
        let mut a = project("A", "acme");
        a.assessment_id = Some("as1".into());
        let mut b = project("B", "acme");
        b.assessment_id = Some("as1".into());
        db.insert_project(&a).unwrap();
        assert_eq!(db.insert_project(&b).unwrap_err().kind(), ErrorKind::Conflict);
    }

    #[test]
    fn compare_and_swap_rejects_stale_version() {
        let db = Database::open_memory().unwrap();
        let mut p = project("Atlas", "acme");
        db.insert_project(&p).unwrap();

        p.version = 1;
        p.description = "first".into();
        assert!(db.compare_and_swap(&p, 0).unwrap());

        let mut stale = p.clone();
        stale.version = 1;
        stale.description = "stale".into();
        assert!(!db.compare_and_swap(&stale, 0).unwrap());

        let stored = db.get_project(&p.id).unwrap().unwrap();
        assert_eq!(stored.description, "first");
        assert_eq!(stored.version, 1);
    }

    fn transition(project_id: &str) -> PhaseTransitionRecord {
        let now = Utc::now();
        PhaseTransitionRecord {
            id: "tr1".into(),
            project_id: project_id.into(),
            from_phase: PhaseId::Investigate,
            to_phase: PhaseId::Mobilize,
            transition_date: now,
            completion_notes: String::new(),
            lessons_learned: None,
            gate_review_id: None,
            user_id: "u1".into(),
            created_at: now,
        }
    }

    #[test]
    fn transition_write_is_all_or_nothing() {
        let db = Database::open_memory().unwrap();
        let mut p = project("Atlas", "acme");
        db.insert_project(&p).unwrap();
        let record = transition(&p.id);

        p.version = 1;
        p.current_phase = PhaseId::Mobilize;
        assert!(!db.compare_and_swap_with_transition(&p, 7, &record).unwrap());
        assert!(db.list_transitions(&p.id).unwrap().is_empty());

        // A journal row that cannot be written rolls the project write back.
        db.append_transition(&record).unwrap();
        assert!(db.compare_and_swap_with_transition(&p, 0, &record).is_err());
        let stored = db.get_project(&p.id).unwrap().unwrap();
        assert_eq!(stored.version, 0);
        assert_eq!(stored.current_phase, PhaseId::Investigate);
        assert_eq!(db.list_transitions(&p.id).unwrap().len(), 1);

        let fresh = PhaseTransitionRecord {
            id: "tr2".into(),
            ..record
        };
        assert!(db.compare_and_swap_with_transition(&p, 0, &fresh).unwrap());
        assert_eq!(db.get_project(&p.id).unwrap().unwrap().current_phase, PhaseId::Mobilize);
        assert_eq!(db.list_transitions(&p.id).unwrap().len(), 2);
    }

    #[test]
    fn notifications_are_per_user() {
        let db = Database::open_memory().unwrap();
        let n = Notification::new("u1", "p1", "Phase transitioned", "now in mobilize", Utc::now());
        db.push_notification(&n).unwrap();
        assert_eq!(db.list_notifications("u1").unwrap(), vec![n]);
        assert!(db.list_notifications("u2").unwrap().is_empty());
    }
}
