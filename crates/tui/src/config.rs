use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

pub use todomaster_core::config::*;
use todomaster_core::{HttpTaskClient, TaskStore};

use crate::cli::Cli;

pub fn from_cli(cli: &Cli) -> Result<ClientConfig> {
    ClientConfig::discover(ConfigOverrides {
        base_url: cli.api_url.clone(),
        timeout_ms: cli.timeout_ms,
        health_interval: cli.health_interval.map(Duration::from_secs),
        data_dir: cli.data_dir.clone(),
    })
}

/// Store backed by the HTTP client for `config`.
pub fn build_store(config: &ClientConfig) -> Result<Arc<TaskStore>> {
    let client = HttpTaskClient::new(config).context("failed to initialize task service client")?;
    Ok(Arc::new(TaskStore::new(Arc::new(client))))
}
