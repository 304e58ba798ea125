//! Database schema migrations.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT version FROM schema_version", [], |row| row.get::<_, i32>(0)) {
        Ok(v) => Ok(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: assessment and project documents.
///
/// Projects are unique by name within an organization, and an assessment
/// seeds at most one project.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS assessments (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL,
            organization    TEXT NOT NULL,
            assessment_type TEXT NOT NULL,
            project_name    TEXT NOT NULL,
            doc             TEXT NOT NULL,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS projects (
            id            TEXT PRIMARY KEY,
            owner_id      TEXT NOT NULL,
            organization  TEXT NOT NULL,
            name          TEXT NOT NULL,
            assessment_id TEXT,
            version       INTEGER NOT NULL DEFAULT 0,
            doc           TEXT NOT NULL,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_assessments_org ON assessments(organization, created_at);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_projects_org_name ON projects(organization, name);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_projects_assessment
            ON projects(assessment_id) WHERE assessment_id IS NOT NULL;",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: append-only journals.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS phase_transitions (
            id          TEXT PRIMARY KEY,
            project_id  TEXT NOT NULL,
            doc         TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_activities (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            project_id  TEXT,
            kind        TEXT NOT NULL,
            doc         TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_notifications (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            doc         TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transitions_project ON phase_transitions(project_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_activities_user ON user_activities(user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_notifications_user ON user_notifications(user_id, created_at);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
        let names = tables(&conn);
        for table in [
            "assessments",
            "phase_transitions",
            "projects",
            "schema_version",
            "user_activities",
            "user_notifications",
        ] {
            assert!(names.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_incremental_migration() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 1);
        assert!(!tables(&conn).contains(&"phase_transitions".to_string()));

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 2);
        assert!(tables(&conn).contains(&"phase_transitions".to_string()));
    }
}
