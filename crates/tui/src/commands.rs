use std::fmt;
use std::io::Write;

use anyhow::{anyhow, Context, Result};
use todomaster_core::{delete_tasks, DeleteResult, Task, TaskPatch, TaskStore, ViewSnapshot};

use crate::capture::CaptureInput;
use crate::cli::{CliCommand, DeleteArgs, EditArgs, ListArgs};
use crate::config::{build_store, ClientConfig};

/// Run a one-shot command on a fresh runtime.
pub fn run_blocking<W: Write>(config: &ClientConfig, command: CliCommand, writer: W) -> Result<()> {
    let store = build_store(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(execute(&store, command, writer))
}

pub async fn execute<W: Write>(store: &TaskStore, command: CliCommand, mut writer: W) -> Result<()> {
    match command {
        CliCommand::List(args) => handle_list(store, &args, &mut writer).await,
        CliCommand::Show(args) => {
            let task = store.fetch_task(&args.id).await?;
            write_details(&task, &mut writer)
        }
        CliCommand::Add(args) => {
            let input = CaptureInput::from(args).into_new_task()?;
            let task = store.add_task(input).await?;
            writeln!(writer, "Added {}", TaskLine(&task))?;
            Ok(())
        }
        CliCommand::Done(args) => {
            let task = store
                .update_task(&args.id, TaskPatch::completed(true))
                .await?;
            writeln!(writer, "Completed {}", TaskLine(&task))?;
            Ok(())
        }
        CliCommand::Reopen(args) => {
            let task = store
                .update_task(&args.id, TaskPatch::completed(false))
                .await?;
            writeln!(writer, "Reopened {}", TaskLine(&task))?;
            Ok(())
        }
        CliCommand::Edit(args) => handle_edit(store, &args, &mut writer).await,
        CliCommand::Delete(args) => handle_delete(store, &args, &mut writer).await,
        CliCommand::Health => {
            if store.check_health().await {
                writeln!(writer, "Connected")?;
                Ok(())
            } else {
                writeln!(writer, "Offline")?;
                Err(anyhow!("task service is not responding"))
            }
        }
        CliCommand::Tui => Err(anyhow!("launch interactive surfaces directly")),
    }
}

async fn handle_list<W: Write>(store: &TaskStore, args: &ListArgs, mut writer: W) -> Result<()> {
    store.load().await?;
    store.set_status_filter(args.status);
    store.set_search_term(args.search.clone().unwrap_or_default());
    write_snapshot(&store.view(), &mut writer)
}

async fn handle_edit<W: Write>(store: &TaskStore, args: &EditArgs, mut writer: W) -> Result<()> {
    let patch = TaskPatch::from(args);
    if patch.is_empty() {
        return Err(anyhow!("nothing to change: pass --title and/or --description"));
    }
    let task = store.update_task(&args.id, patch).await?;
    writeln!(writer, "Updated {}", TaskLine(&task))?;
    Ok(())
}

async fn handle_delete<W: Write>(store: &TaskStore, args: &DeleteArgs, mut writer: W) -> Result<()> {
    let results = delete_tasks(store, &args.ids).await;
    let summary = DeleteSummary::from_results(&results);
    summary.write_to(&mut writer)?;
    if summary.failed.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("{} deletion(s) failed", summary.failed.len()))
    }
}

fn write_snapshot<W: Write>(snapshot: &ViewSnapshot, mut writer: W) -> Result<()> {
    let counts = snapshot.counts;
    writeln!(
        writer,
        "{} total · {} active · {} completed",
        counts.total, counts.active, counts.completed
    )?;
    if let Some(empty) = snapshot.empty_state() {
        writeln!(writer, "{}", empty.headline())?;
        writeln!(writer, "{}", empty.hint())?;
        return Ok(());
    }
    for task in &snapshot.tasks {
        writeln!(writer, "{}", TaskLine(task))?;
    }
    Ok(())
}

fn write_details<W: Write>(task: &Task, mut writer: W) -> Result<()> {
    writeln!(writer, "ID:          {}", task.id)?;
    writeln!(writer, "Title:       {}", task.title)?;
    if !task.description.is_empty() {
        writeln!(writer, "Description: {}", task.description)?;
    }
    let status = if task.completed { "completed" } else { "active" };
    writeln!(writer, "Status:      {}", status)?;
    writeln!(writer, "Created:     {}", task.created_at.to_rfc3339())?;
    if let Some(updated_at) = task.updated_at {
        writeln!(writer, "Updated:     {}", updated_at.to_rfc3339())?;
    }
    Ok(())
}

struct TaskLine<'a>(&'a Task);

impl fmt::Display for TaskLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let task = self.0;
        let mark = if task.completed { "x" } else { " " };
        write!(f, "[{}] {}  {}", mark, task.id, task.title)?;
        if !task.description.is_empty() {
            write!(f, " - {}", task.description)?;
        }
        Ok(())
    }
}

struct DeleteSummary {
    deleted: usize,
    missing: Vec<String>,
    failed: Vec<(String, String)>,
}

impl DeleteSummary {
    fn from_results(results: &[DeleteResult]) -> Self {
        let mut deleted = 0usize;
        let mut missing = Vec::new();
        let mut failed = Vec::new();
        for result in results {
            match (&result.error, result.deleted) {
                (Some(error), _) => failed.push((result.id.clone(), error.clone())),
                (None, true) => deleted += 1,
                (None, false) => missing.push(result.id.clone()),
            }
        }
        Self {
            deleted,
            missing,
            failed,
        }
    }

    fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", SummaryLine::deleted(self.deleted))?;
        if !self.missing.is_empty() {
            writeln!(writer, "Not found: {}", self.missing.join(", "))?;
        }
        for (id, error) in &self.failed {
            writeln!(writer, "Failed: {id} ({error})")?;
        }
        Ok(())
    }
}

enum SummaryLine {
    Deleted(usize),
    NoneDeleted,
}

impl SummaryLine {
    fn deleted(count: usize) -> Self {
        if count > 0 {
            SummaryLine::Deleted(count)
        } else {
            SummaryLine::NoneDeleted
        }
    }
}

impl fmt::Display for SummaryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryLine::Deleted(count) => {
                write!(
                    f,
                    "Deleted {} task{}",
                    count,
                    if *count == 1 { "" } else { "s" }
                )
            }
            SummaryLine::NoneDeleted => write!(f, "No tasks deleted"),
        }
    }
}
