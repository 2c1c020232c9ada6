use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chemviz_core::dataset::DatasetId;
use chemviz_infrastructure::ConfigService;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod logging;
mod prompt;
mod render;
mod shell;

use commands::LoginArgs;

#[derive(Parser)]
#[command(name = "chemviz", version)]
#[command(about = "Chemviz CLI - client for the chemical equipment dataset visualizer", long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/chemviz/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend API base URL, e.g. http://127.0.0.1:8000/api
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    #[arg(short, long, global = true, env = "CHEMVIZ_USER")]
    username: Option<String>,

    /// Prompted for when not given
    #[arg(long, global = true, env = "CHEMVIZ_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify credentials and show upload history
    Login,
    /// List the most recent uploads
    History,
    /// Upload a CSV or Excel dataset and show its summary
    Upload { file: PathBuf },
    /// Show the summary of a dataset
    Summary {
        id: DatasetId,
        /// Print the raw summary document as JSON
        #[arg(long)]
        json: bool,
        /// Also draw the chart projections
        #[arg(long)]
        charts: bool,
    },
    /// Download the PDF report of a dataset
    Report {
        id: DatasetId,
        /// Directory to save into
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Delete a dataset from history
    Delete { id: DatasetId },
    /// Create a new account
    Register {
        #[arg(long)]
        email: Option<String>,
    },
    /// Interactive shell
    Shell,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let mut config = config_service.get_config()?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
        config.validate()?;
    }

    let _log_guard = logging::init(&config.logging)?;
    tracing::debug!("[Cli] Using API at {}", config.api.base_url);

    let login = LoginArgs {
        username: cli.username,
        password: cli.password,
    };

    match cli.command {
        Commands::Login => commands::run_login(&config, login).await,
        Commands::History => commands::run_history(&config, login).await,
        Commands::Upload { file } => commands::run_upload(&config, login, &file).await,
        Commands::Summary { id, json, charts } => {
            commands::run_summary(&config, login, id, json, charts).await
        }
        Commands::Report { id, out } => commands::run_report(&config, login, id, out).await,
        Commands::Delete { id } => commands::run_delete(&config, login, id).await,
        Commands::Register { email } => commands::run_register(&config, login, email).await,
        Commands::Shell => shell::run(&config, login).await,
        Commands::Config => commands::run_config(&config, config_service.path()),
    }
}
