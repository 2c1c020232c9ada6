//! One-shot subcommands.
//!
//! Nothing survives between processes, so every command that touches a
//! protected endpoint verifies the credentials first.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chemviz_application::{SessionController, messages};
use chemviz_core::config::{ClientConfig, SessionSettings};
use chemviz_core::dataset::DatasetId;
use chemviz_infrastructure::{FileReportSink, read_upload_file};
use chemviz_interaction::HttpDatasetApi;
use colored::Colorize;

use crate::{prompt, render};

/// Credentials given on the command line, if any.
#[derive(Debug, Clone, Default)]
pub struct LoginArgs {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Wires a controller to the HTTP API and a report directory.
pub fn build_controller(
    config: &ClientConfig,
    settings: SessionSettings,
    download_dir: Option<PathBuf>,
) -> SessionController {
    let api = Arc::new(HttpDatasetApi::new(&config.api));
    let directory = download_dir
        .or_else(|| config.download.directory.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    SessionController::new(api, Arc::new(FileReportSink::new(directory)), settings)
}

/// Session settings for commands that pick their own dataset.
fn one_shot_settings(config: &ClientConfig) -> SessionSettings {
    SessionSettings {
        auto_select_newest: false,
        ..config.session.clone()
    }
}

/// Turns a controller failure into the status text the user should see.
async fn checked<T>(
    controller: &SessionController,
    result: chemviz_core::Result<T>,
) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            let text = controller
                .status()
                .await
                .filter(|status| status.is_error())
                .map(|status| status.text)
                .unwrap_or_else(|| e.to_string());
            Err(anyhow::Error::new(e).context(text))
        }
    }
}

async fn print_status(controller: &SessionController) {
    if let Some(status) = controller.status().await {
        println!("{}", render::status_line(&status));
    }
}

pub async fn login(controller: &SessionController, args: LoginArgs) -> Result<()> {
    let (username, password) = prompt::credentials(args.username, args.password)?;
    checked(controller, controller.verify(&username, &password).await).await?;
    Ok(())
}

pub async fn run_login(config: &ClientConfig, args: LoginArgs) -> Result<()> {
    let controller = build_controller(config, config.session.clone(), None);
    login(&controller, args).await?;

    let state = controller.snapshot().await;
    println!("{}", messages::LOGIN_SUCCESS.green());
    println!("{}", render::history_table(&state.history, state.selection));
    if let (Some(id), Some(summary)) = (state.selection, &state.summary) {
        println!();
        println!("{}", render::summary_report(id, summary));
    }
    Ok(())
}

pub async fn run_history(config: &ClientConfig, args: LoginArgs) -> Result<()> {
    let controller = build_controller(config, one_shot_settings(config), None);
    login(&controller, args).await?;

    println!("{}", render::history_table(&controller.history().await, None));
    Ok(())
}

pub async fn run_upload(config: &ClientConfig, args: LoginArgs, file: &Path) -> Result<()> {
    // Local checks run before anything goes over the network.
    let upload = read_upload_file(file, &config.upload.allowed_extensions)
        .await
        .with_context(|| format!("cannot upload {}", file.display()))?;

    let controller = build_controller(config, one_shot_settings(config), None);
    login(&controller, args).await?;

    controller.select_file(upload).await;
    let entry = checked(&controller, controller.upload().await).await?;
    print_status(&controller).await;

    if let Some(summary) = controller.summary().await {
        println!();
        println!("{}", render::summary_report(entry.id, &summary));
    }
    Ok(())
}

pub async fn run_summary(
    config: &ClientConfig,
    args: LoginArgs,
    id: DatasetId,
    json: bool,
    charts: bool,
) -> Result<()> {
    let controller = build_controller(config, one_shot_settings(config), None);
    login(&controller, args).await?;

    let summary = checked(&controller, controller.fetch_summary(id).await).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", render::summary_report(id, &summary));
    if charts {
        if let Some(projections) = controller.chart_projections().await {
            println!();
            println!("{}", render::charts(&projections));
        }
    }
    Ok(())
}

pub async fn run_report(
    config: &ClientConfig,
    args: LoginArgs,
    id: DatasetId,
    out: Option<PathBuf>,
) -> Result<()> {
    let controller = build_controller(config, one_shot_settings(config), out);
    login(&controller, args).await?;

    let path = checked(&controller, controller.download_report(id).await).await?;
    print_status(&controller).await;
    println!("{}", path.display().to_string().bright_black());
    Ok(())
}

pub async fn run_delete(config: &ClientConfig, args: LoginArgs, id: DatasetId) -> Result<()> {
    let controller = build_controller(config, one_shot_settings(config), None);
    login(&controller, args).await?;

    checked(&controller, controller.delete_entry(id).await).await?;
    print_status(&controller).await;
    println!("{}", render::history_table(&controller.history().await, None));
    Ok(())
}

pub async fn run_register(
    config: &ClientConfig,
    args: LoginArgs,
    email: Option<String>,
) -> Result<()> {
    let controller = build_controller(config, one_shot_settings(config), None);
    let (username, password) = prompt::credentials(args.username, args.password)?;

    checked(
        &controller,
        controller
            .register(&username, &password, email.as_deref())
            .await,
    )
    .await?;
    print_status(&controller).await;
    Ok(())
}

pub fn run_config(config: &ClientConfig, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        println!("{}", format!("# {}", path.display()).bright_black());
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
