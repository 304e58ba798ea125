use chrono::Utc;
use clap::Subcommand;
use impact_core::Config;

use super::{open_service, print_json, CliResult, Identity};

#[derive(Subcommand)]
pub enum AnalyticsAction {
    /// Alerts, trends and predictive insights
    RiskMonitoring { project_id: String },
    /// Earned-value budget tracking
    Budget { project_id: String },
    /// Delivery outcome forecast
    Forecast { project_id: String },
    /// Stakeholder communication pack
    Communications { project_id: String },
    /// Predictive task, budget, scope and timeline estimates
    Predictive { project_id: String },
    /// Manufacturing excellence tracking
    Excellence { project_id: String },
}

pub fn run(action: AnalyticsAction, identity: &Identity, config: &Config) -> CliResult {
    let caller = identity.caller()?;
    let service = open_service(config)?;
    let now = Utc::now();

    match action {
        AnalyticsAction::RiskMonitoring { project_id } => print_json(&service.risk_monitoring(&caller, &project_id, now)?),
        AnalyticsAction::Budget { project_id } => print_json(&service.budget_tracking(&caller, &project_id)?),
        AnalyticsAction::Forecast { project_id } => print_json(&service.forecast(&caller, &project_id)?),
        AnalyticsAction::Communications { project_id } => {
            print_json(&service.communications(&caller, &project_id, now)?)
        }
        AnalyticsAction::Predictive { project_id } => print_json(&service.predictive_snapshot(&caller, &project_id)?),
        AnalyticsAction::Excellence { project_id } => print_json(&service.excellence(&caller, &project_id)?),
    }
}
