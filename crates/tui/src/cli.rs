use std::path::PathBuf;

use clap::{value_parser, Args, Parser, Subcommand};

use crate::capture::CaptureInput;
use crate::model::{StatusFilter, TaskPatch};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "todomaster",
    version,
    about = "Keyboard-first client for a remote todo service.",
    after_help = "Examples:\n  todomaster                      Launch the TUI (same as `todomaster tui`)\n  todomaster list --status active --search milk\n  todomaster add Buy milk --description \"two litres\"\n  todomaster done 65a1f0c2\n  todomaster --api-url http://tasks.local:5000/api health"
)]
pub struct Cli {
    /// Base URL of the task service API
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long = "timeout-ms", value_name = "MS", global = true, value_parser = value_parser!(u64))]
    pub timeout_ms: Option<u64>,

    /// Seconds between background health probes in the TUI (0 disables)
    #[arg(long = "health-interval", value_name = "SECONDS", global = true, value_parser = value_parser!(u64))]
    pub health_interval: Option<u64>,

    /// Override the data directory used for preferences and logs
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Tracing filter (e.g. "info", "todomaster_core=debug")
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Launch the interactive terminal UI (default command)
    Tui,
    /// Print tasks matching a status filter and search term
    List(ListArgs),
    /// Fetch one task from the service and print its details
    Show(IdArgs),
    /// Create a task
    Add(AddArgs),
    /// Mark a task completed
    Done(IdArgs),
    /// Mark a task active again
    Reopen(IdArgs),
    /// Change a task's title or description
    Edit(EditArgs),
    /// Delete one or more tasks by id
    Delete(DeleteArgs),
    /// Check whether the task service is reachable
    Health,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Status filter
    #[arg(long, value_enum, default_value_t = StatusFilter::All)]
    pub status: StatusFilter,

    /// Case-insensitive substring matched against title and description
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Task title
    #[arg(value_name = "TITLE", required = true)]
    pub text: Vec<String>,

    /// Optional longer description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct IdArgs {
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    #[arg(value_name = "ID")]
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New description (pass an empty string to clear it)
    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// One or more task ids to delete
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<String>,
}

impl From<AddArgs> for CaptureInput {
    fn from(args: AddArgs) -> Self {
        CaptureInput {
            text: args.text,
            description: args.description,
        }
    }
}

impl From<&EditArgs> for TaskPatch {
    fn from(args: &EditArgs) -> Self {
        TaskPatch {
            title: args.title.as_deref().map(|title| title.trim().to_string()),
            description: args
                .description
                .as_deref()
                .map(|description| description.trim().to_string()),
            completed: None,
        }
    }
}
