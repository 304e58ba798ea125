//! Core error types for impact-core.
//!
//! Errors are raised as typed values by the engine and classified into a
//! small set of [`ErrorKind`]s. An outer boundary (CLI, HTTP adapter) maps
//! kinds to exit codes or status codes and renders an [`ErrorBody`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for impact-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Unknown entity or catalog key
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Caller is not the owner of the entity and is not an admin
    #[error("Not authorized to access {entity} {id}")]
    Forbidden { entity: &'static str, id: String },

    /// No caller identity was supplied
    #[error("Not authenticated")]
    Unauthenticated,

    /// Uniqueness or ordering violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation attempted before its precondition holds
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// External collaborator did not answer within its deadline
    #[error("Upstream '{service}' timed out after {timeout_secs}s")]
    UpstreamTimeout { service: String, timeout_secs: u64 },

    /// External collaborator answered with a failure
    #[error("Upstream '{service}' failed: {message}")]
    Upstream { service: String, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Internal(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home/data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A dimension declared by the assessment type was not scored
    #[error("Missing score for dimension '{dimension}'")]
    MissingDimension { dimension: String },

    /// A scored dimension is not part of the assessment type
    #[error("Unknown dimension '{dimension}' for assessment type '{assessment_type}'")]
    UnknownDimension {
        dimension: String,
        assessment_type: String,
    },

    /// Score outside `1..=5`
    #[error("Score for '{dimension}' must be between 1 and 5, got {score}")]
    ScoreOutOfRange { dimension: String, score: i64 },

    /// Empty required string
    #[error("'{0}' must not be empty")]
    EmptyField(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Classification of a [`CoreError`] for boundary mapping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    Unauthenticated,
    Forbidden,
    NotFound,
    Conflict,
    PreconditionFailed,
    UpstreamTimeout,
    UpstreamError,
    Internal,
}

impl ErrorKind {
    /// HTTP status an HTTP adapter should answer with.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidInput => 422,
            ErrorKind::Unauthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::PreconditionFailed => 400,
            ErrorKind::UpstreamTimeout => 504,
            ErrorKind::UpstreamError => 502,
            ErrorKind::Internal => 500,
        }
    }
}

/// User-visible failure body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub detail: String,
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn forbidden(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::Forbidden {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation(ValidationError::InvalidValue {
            field: field.into(),
            message: message.into(),
        })
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) | CoreError::Json(_) => ErrorKind::InvalidInput,
            CoreError::Config(ConfigError::InvalidValue { .. } | ConfigError::UnknownKey(_)) => {
                ErrorKind::InvalidInput
            }
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Forbidden { .. } => ErrorKind::Forbidden,
            CoreError::Unauthenticated => ErrorKind::Unauthenticated,
            CoreError::Conflict(_) => ErrorKind::Conflict,
            CoreError::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            CoreError::UpstreamTimeout { .. } => ErrorKind::UpstreamTimeout,
            CoreError::Upstream { .. } => ErrorKind::UpstreamError,
            CoreError::Database(_) | CoreError::Config(_) | CoreError::Io(_) | CoreError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Render the `{detail}` body. Internal failures are logged in full and
    /// replaced by an opaque reference.
    pub fn to_body(&self) -> ErrorBody {
        if self.kind() == ErrorKind::Internal {
            let reference = uuid::Uuid::new_v4();
            tracing::error!(error = %self, %reference, "internal error");
            ErrorBody {
                detail: format!("Internal error (reference {reference})"),
            }
        } else {
            ErrorBody {
                detail: self.to_string(),
            }
        }
    }
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked
                    || err.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, msg) = &err {
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
                return CoreError::Conflict(
                    msg.clone()
                        .unwrap_or_else(|| "unique constraint violated".to_string()),
                );
            }
        }
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
