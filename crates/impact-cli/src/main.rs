use clap::{CommandFactory, Parser, Subcommand};
use impact_core::{Config, CoreError, ErrorBody};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Identity;

#[derive(Parser)]
#[command(name = "impact", version, about = "IMPACT change-readiness CLI")]
struct Cli {
    /// Calling user id
    #[arg(long, global = true, env = "IMPACT_USER")]
    user: Option<String>,
    /// Calling user's organization
    #[arg(long, global = true, env = "IMPACT_ORG")]
    org: Option<String>,
    /// Act with administrator rights
    #[arg(long, global = true)]
    admin: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assessment types and IMPACT phases
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Readiness assessments
    Assessment {
        #[command(subcommand)]
        action: commands::assessment::AssessmentAction,
    },
    /// Project workflow
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },
    /// Project analytics
    Analytics {
        #[command(subcommand)]
        action: commands::analytics::AnalyticsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// `IMPACT_LOG`, then the configured filter, then `warn`. Logs go to stderr.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_env("IMPACT_LOG")
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_tracing(&config);

    let identity = Identity {
        user: cli.user,
        org: cli.org,
        admin: cli.admin,
    };
    let result = match cli.command {
        Commands::Catalog { action } => commands::catalog::run(action),
        Commands::Assessment { action } => commands::assessment::run(action, &identity, &config),
        Commands::Project { action } => commands::project::run(action, &identity, &config),
        Commands::Analytics { action } => commands::analytics::run(action, &identity, &config),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "impact", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        let body = match e.downcast_ref::<CoreError>() {
            Some(core) => core.to_body(),
            None => ErrorBody { detail: e.to_string() },
        };
        match serde_json::to_string(&body) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
