use clap::Subcommand;
use impact_core::catalog;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List assessment types
    Types,
    /// Show one assessment type with its dimensions
    Type {
        /// Type id (e.g. "software_implementation")
        id: String,
    },
    /// List the six IMPACT phases
    Phases,
    /// Show one phase
    Phase {
        /// Phase id (e.g. "pilot")
        id: String,
    },
}

pub fn run(action: CatalogAction) -> CliResult {
    match action {
        CatalogAction::Types => print_json(&catalog::list_assessment_types()),
        CatalogAction::Type { id } => print_json(catalog::get_type(&id)?),
        CatalogAction::Phases => print_json(&catalog::list_phases()),
        CatalogAction::Phase { id } => print_json(catalog::get_phase(&id)?),
    }
}
