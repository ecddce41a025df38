use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use todomaster::cli::{Cli, CliCommand};
use todomaster::ClientConfig;

const DEFAULT_LOG_DIRECTIVE: &str = "warn";

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = todomaster::config::from_cli(&cli)?;

    match cli.command.clone() {
        Some(CliCommand::Tui) | None => {
            init_file_tracing(cli.log_filter.as_deref(), &config)?;
            tracing::info!(base_url = config.base_url(), "starting terminal ui");
            todomaster::tui::run(config)?;
        }
        Some(command) => {
            init_stderr_tracing(cli.log_filter.as_deref())?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            todomaster::commands::run_blocking(&config, command, &mut handle)?;
        }
    }

    Ok(())
}

fn env_filter(filter: Option<&str>) -> Result<EnvFilter> {
    let directive: Directive = filter
        .unwrap_or(DEFAULT_LOG_DIRECTIVE)
        .parse()
        .context("invalid --log directive")?;
    Ok(EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy())
}

fn init_stderr_tracing(filter: Option<&str>) -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(filter)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
    Ok(())
}

/// The terminal owns stdout/stderr while the TUI runs, so logs go to a file.
fn init_file_tracing(filter: Option<&str>, config: &ClientConfig) -> Result<()> {
    fs::create_dir_all(config.data_dir()).with_context(|| {
        format!(
            "Failed to create data directory at {}",
            config.data_dir().display()
        )
    })?;
    let path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(filter)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}
