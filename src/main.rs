use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use registry_cleaner::cleaner;
use registry_cleaner::cli::Cli;
use registry_cleaner::registry::DockerRegistry;

/// Log to stderr, or to a JSON log file when one is requested.
/// The returned guard must live until the process exits.
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
        return Ok(None);
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid log file path: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(writer))
        .init();

    Ok(Some(guard))
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let Some(config) = cli.config() else {
        Cli::command().print_help()?;
        return Ok(ExitCode::from(2));
    };

    let log_file = cli.log_file();
    let _guard = init_logging(log_file.as_deref())?;

    let registry = DockerRegistry::new(&config.registry_url, config.credentials())
        .context("Failed to create registry client")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(cleaner::run(&config, &registry, &mut std::io::stdout()));

    match result {
        Ok(report) => {
            println!("{}", report.summary());
            Ok(if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
