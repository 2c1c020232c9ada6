use anyhow::Result;
use chemviz_core::config::LoggingSettings;
use chemviz_infrastructure::ChemVizPaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured level. The returned guard flushes the
/// log file and must live until the process exits.
pub fn init(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if !settings.file {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()?;
        return Ok(None);
    }

    let directory = ChemVizPaths::logs_dir()?;
    std::fs::create_dir_all(&directory)?;
    let appender = tracing_appender::rolling::daily(&directory, "chemviz.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()?;

    tracing::debug!("[Logging] Writing log files to {}", directory.display());
    Ok(Some(guard))
}
