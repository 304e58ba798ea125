//! # IMPACT Core Library
//!
//! This library provides the business logic for IMPACT, a change-readiness
//! assessment and implementation engine. Every operation is available through
//! [`ImpactService`]; the `impact` CLI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Catalog**: Static assessment types, dimensions and the six IMPACT phases
//! - **Readiness**: Dimension scoring, force/inertia/resistance analysis and
//!   narrative generation (template or Anthropic Messages API)
//! - **Planner**: Ten-week implementation plan with per-task budgets
//! - **Analytics**: Predictive estimators for task success, budget overrun,
//!   scope creep and timeline
//! - **Workflow**: Project lifecycle state machine over phases, tasks,
//!   deliverables, milestones and gate reviews
//! - **Budget / Forecast / Monitoring**: Earned-value tracking, delivery
//!   forecasts, stakeholder communications and risk monitoring
//! - **Storage**: SQLite document storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`ImpactService`]: Authorized, persisted entry point for all operations
//! - [`Project`]: The long-lived project document
//! - [`Database`]: Assessment, project and journal persistence
//! - [`Config`]: Application configuration management
//! - [`NarrativeGenerator`]: Trait for readiness narrative backends

pub mod analytics;
pub mod budget;
pub mod catalog;
pub mod error;
pub mod events;
pub mod forecast;
pub mod monitoring;
pub mod planner;
pub mod readiness;
pub mod scores;
pub mod service;
pub mod storage;
pub mod workflow;

pub use analytics::PredictiveSnapshot;
pub use budget::{BudgetHealth, BudgetTracking, TaskActuals};
pub use catalog::{AssessmentTypeId, PhaseId};
pub use error::{ConfigError, CoreError, DatabaseError, ErrorBody, ErrorKind, ValidationError};
pub use events::{ActivityEvent, ActivityRecord, ActivitySink, Notification, TracingSink};
pub use forecast::{ExcellenceTracking, ProjectForecast, StakeholderCommunications};
pub use monitoring::RiskMonitoring;
pub use planner::{ImplementationPlan, RecommendedProject};
pub use readiness::{Assessment, AssessmentInput, NarrativeGenerator, ReadinessReport};
pub use scores::{DimensionScores, RiskLevel};
pub use service::{Caller, ImpactService, Store};
pub use storage::{Config, Database};
pub use workflow::{Project, ProjectDraft, ProjectStatus};
