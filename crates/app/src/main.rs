//! Terminal front end for the timed qualification exam.

use std::process;

use clap::{Parser, Subcommand};
use exam_core::model::ApplicationId;

mod commands;
mod config;
mod display;
mod logging;

use config::{AppConfig, ConfigArgs};

#[derive(Parser)]
#[command(name = "exam", version, about = "Timed single-attempt qualification exam")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sit the exam as the configured candidate
    Take,

    /// Show whether the configured candidate may start an attempt
    Status,

    /// Create an application record the exam result gets attached to
    SeedApplication {
        /// Application identifier
        #[arg(long, default_value = "1")]
        id: ApplicationId,

        /// Application status
        #[arg(long, default_value = "pending")]
        status: String,
    },
}

#[tokio::main]
async fn main() {
    // .env must be loaded before clap reads the EXAM_* variables.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from(cli.config);
    logging::init(&config.log);

    let result = match cli.command {
        Commands::Take => commands::take::execute(&config).await,
        Commands::Status => commands::status::execute(&config).await,
        Commands::SeedApplication { id, status } => {
            commands::seed::execute(&config, id, &status).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
