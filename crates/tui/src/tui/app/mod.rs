use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

use ratatui::style::Style;
use ratatui::widgets::TableState;
use tokio::runtime::Handle;

use super::buffer::TextBuffer;
use super::constants::*;
use super::filters::{next_status, prev_status};
use super::helpers::Palette;
use crate::capture::CaptureInput;
use crate::core::{
    Action, Level, Notification, OperationState, Preferences, TaskResult, TaskStore, ViewSnapshot,
};
use crate::model::{Task, TaskPatch, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};

mod input;
mod render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Add,
    Edit,
    Search,
    Help,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfirmChoice {
    Yes,
    No,
}

impl ConfirmChoice {
    fn toggle(self) -> Self {
        match self {
            ConfirmChoice::Yes => ConfirmChoice::No,
            ConfirmChoice::No => ConfirmChoice::Yes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Title,
    Description,
}

/// Add/edit overlay state. `editing` holds the original record when editing.
#[derive(Debug, Clone)]
struct TaskForm {
    title: TextBuffer,
    description: TextBuffer,
    focus: FormField,
    editing: Option<Task>,
    submitting: bool,
}

impl TaskForm {
    fn blank() -> Self {
        Self {
            title: TextBuffer::with_limit(TITLE_MAX_CHARS),
            description: TextBuffer::with_limit(DESCRIPTION_MAX_CHARS),
            focus: FormField::Title,
            editing: None,
            submitting: false,
        }
    }

    fn for_task(task: &Task) -> Self {
        let mut form = Self::blank();
        form.title.set(task.title.clone());
        form.description.set(task.description.clone());
        form.editing = Some(task.clone());
        form
    }

    fn focused_mut(&mut self) -> &mut TextBuffer {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
        }
    }

    fn switch_focus(&mut self) {
        self.focus = match self.focus {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Title,
        };
    }

    /// Only the fields that differ from the record being edited.
    fn patch(&self) -> TaskPatch {
        let title = self.title.as_str().trim().to_string();
        let description = self.description.as_str().trim().to_string();
        let mut patch = TaskPatch::default();
        if let Some(original) = &self.editing {
            if original.title != title {
                patch.title = Some(title);
            }
            if original.description != description {
                patch.description = Some(description);
            }
        }
        patch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    kind: StatusKind,
    created_at: Instant,
}

impl StatusMessage {
    fn new<T: Into<String>>(text: T, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    fn style(&self, palette: &Palette) -> Style {
        let color = match self.kind {
            StatusKind::Info => palette.fg_accent,
            StatusKind::Success => palette.success,
            StatusKind::Warning => palette.warning,
            StatusKind::Error => palette.error,
        };
        Style::default().fg(color)
    }
}

impl From<Notification> for StatusMessage {
    fn from(notification: Notification) -> Self {
        let kind = match notification.level {
            Level::Success => StatusKind::Success,
            Level::Warning => StatusKind::Warning,
            Level::Error => StatusKind::Error,
        };
        StatusMessage::new(notification.message, kind)
    }
}

/// Resolution of an intent spawned on the runtime.
#[derive(Debug)]
enum Outcome {
    Loaded,
    Added(TaskResult<Task>),
    Edited(TaskResult<Task>),
    Toggled(TaskResult<Task>),
    Deleted(TaskResult<()>),
}

pub(crate) struct App {
    store: Arc<TaskStore>,
    runtime: Handle,
    outcome_tx: Sender<Outcome>,
    outcome_rx: Receiver<Outcome>,
    pending: usize,
    preferences: Preferences,
    palette: Palette,
    data_dir: PathBuf,
    base_url: String,
    snapshot: ViewSnapshot,
    busy: bool,
    selected: usize,
    table_state: TableState,
    input_mode: InputMode,
    form: TaskForm,
    search: TextBuffer,
    status: Option<StatusMessage>,
    confirm_choice: ConfirmChoice,
    /// The record the open delete dialog was raised for.
    pending_delete: Option<Task>,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(
        store: Arc<TaskStore>,
        runtime: Handle,
        preferences: Preferences,
        data_dir: PathBuf,
        base_url: impl Into<String>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let snapshot = store.view();
        let mut search = TextBuffer::with_limit(TITLE_MAX_CHARS);
        search.set(snapshot.filter.search.clone());
        Self {
            palette: Palette::for_theme(preferences.theme),
            store,
            runtime,
            outcome_tx,
            outcome_rx,
            pending: 0,
            preferences,
            data_dir,
            base_url: base_url.into(),
            snapshot,
            busy: false,
            selected: 0,
            table_state: TableState::default(),
            input_mode: InputMode::Normal,
            form: TaskForm::blank(),
            search,
            status: None,
            confirm_choice: ConfirmChoice::No,
            pending_delete: None,
            should_quit: false,
        }
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Apply resolved intents, surface notifications and re-project.
    pub(crate) fn on_tick(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
        }
        self.sync();
        if let Some(status) = &self.status {
            if status.created_at.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
    }

    fn sync(&mut self) {
        for notification in self.store.drain_notifications() {
            self.status = Some(notification.into());
        }
        self.snapshot = self.store.view();
        self.busy = [Action::Add, Action::Update, Action::Delete]
            .into_iter()
            .any(|action| self.store.operation(action) == OperationState::Pending);
        self.clamp_selection();
    }

    fn spawn<F>(&mut self, intent: F)
    where
        F: std::future::Future<Output = Outcome> + Send + 'static,
    {
        self.pending += 1;
        let tx = self.outcome_tx.clone();
        self.runtime.spawn(async move {
            // The receiver only goes away when the UI has exited.
            let _ = tx.send(intent.await);
        });
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        self.pending = self.pending.saturating_sub(1);
        match outcome {
            Outcome::Added(result) => {
                self.form.submitting = false;
                if let Ok(task) = result {
                    if self.input_mode == InputMode::Add {
                        self.close_form();
                    }
                    self.sync();
                    self.select_task_by_id(&task.id);
                }
            }
            Outcome::Edited(result) => {
                self.form.submitting = false;
                if result.is_ok() && self.input_mode == InputMode::Edit {
                    self.close_form();
                }
            }
            Outcome::Toggled(Err(err)) | Outcome::Deleted(Err(err)) => {
                // Store failures also queue a notification, which replaces
                // this on the next sync.
                self.set_status_error(err.to_string());
            }
            Outcome::Loaded | Outcome::Toggled(Ok(_)) | Outcome::Deleted(Ok(())) => {}
        }
    }

    pub(crate) fn reload(&mut self) {
        self.set_status_info(STATUS_REFRESHING);
        let store = self.store.clone();
        self.spawn(async move {
            if let Err(err) = store.load().await {
                tracing::debug!(error = %err, "reload failed");
            }
            Outcome::Loaded
        });
    }

    fn selected_task(&self) -> Option<&Task> {
        self.snapshot.tasks.get(self.selected)
    }

    fn clamp_selection(&mut self) {
        if self.snapshot.tasks.is_empty() {
            self.selected = 0;
            self.table_state.select(None);
        } else {
            self.selected = self.selected.min(self.snapshot.tasks.len() - 1);
            self.table_state.select(Some(self.selected));
        }
    }

    fn select_next(&mut self) {
        if self.snapshot.tasks.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.snapshot.tasks.len() - 1);
        self.table_state.select(Some(self.selected));
    }

    fn select_prev(&mut self) {
        if self.snapshot.tasks.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(1);
        self.table_state.select(Some(self.selected));
    }

    fn select_first(&mut self) {
        self.selected = 0;
        self.clamp_selection();
    }

    fn select_last(&mut self) {
        self.selected = self.snapshot.tasks.len().saturating_sub(1);
        self.clamp_selection();
    }

    fn select_task_by_id(&mut self, id: &str) {
        if let Some(idx) = self.snapshot.tasks.iter().position(|task| task.id == id) {
            self.selected = idx;
            self.table_state.select(Some(idx));
        }
    }

    fn next_status_tab(&mut self) {
        self.store
            .set_status_filter(next_status(self.snapshot.filter.status));
        self.select_first();
        self.sync();
    }

    fn prev_status_tab(&mut self) {
        self.store
            .set_status_filter(prev_status(self.snapshot.filter.status));
        self.select_first();
        self.sync();
    }

    fn begin_add(&mut self) {
        self.form = TaskForm::blank();
        self.input_mode = InputMode::Add;
        self.set_status_info(STATUS_ENTER_ADD);
    }

    fn begin_edit(&mut self) {
        match self.selected_task() {
            Some(task) => {
                self.form = TaskForm::for_task(task);
                self.input_mode = InputMode::Edit;
                self.set_status_info(STATUS_ENTER_EDIT);
            }
            None => self.set_status_info(STATUS_NOTHING_SELECTED),
        }
    }

    fn close_form(&mut self) {
        self.form = TaskForm::blank();
        self.input_mode = InputMode::Normal;
    }

    fn submit_form(&mut self) {
        if self.form.submitting {
            return;
        }
        match self.input_mode {
            InputMode::Add => self.submit_add(),
            InputMode::Edit => self.submit_edit(),
            _ => {}
        }
    }

    fn submit_add(&mut self) {
        let capture = CaptureInput::from_title(self.form.title.as_str())
            .with_description(self.form.description.as_str());
        let input = match capture.into_new_task() {
            Ok(input) => input,
            Err(err) => {
                self.set_status_error(err.to_string());
                return;
            }
        };
        self.form.submitting = true;
        let store = self.store.clone();
        self.spawn(async move { Outcome::Added(store.add_task(input).await) });
    }

    fn submit_edit(&mut self) {
        let Some(id) = self.form.editing.as_ref().map(|task| task.id.clone()) else {
            self.close_form();
            return;
        };
        let patch = self.form.patch();
        if patch.is_empty() {
            self.close_form();
            self.set_status_info("No changes");
            return;
        }
        if let Err(err) = patch.validate() {
            self.set_status_error(err.to_string());
            return;
        }
        self.form.submitting = true;
        let store = self.store.clone();
        self.spawn(async move { Outcome::Edited(store.update_task(&id, patch).await) });
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task().map(|task| task.id.clone()) else {
            self.set_status_info(STATUS_NOTHING_SELECTED);
            return;
        };
        let store = self.store.clone();
        self.spawn(async move { Outcome::Toggled(store.toggle_task(&id).await) });
    }

    fn prompt_delete(&mut self) {
        let Some(task) = self.selected_task().cloned() else {
            self.set_status_info(STATUS_NOTHING_SELECTED);
            return;
        };
        self.pending_delete = Some(task);
        self.confirm_choice = ConfirmChoice::No;
        self.input_mode = InputMode::ConfirmDelete;
        self.set_status_info(STATUS_CONFIRM_DELETE);
    }

    fn perform_delete(&mut self) {
        self.input_mode = InputMode::Normal;
        let Some(task) = self.pending_delete.take() else {
            return;
        };
        let store = self.store.clone();
        self.spawn(async move { Outcome::Deleted(store.remove_task(&task.id).await) });
    }

    fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.input_mode = InputMode::Normal;
        self.set_status_info("Deletion cancelled");
    }

    fn begin_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.set_status_info(STATUS_SEARCH);
    }

    fn apply_search(&mut self) {
        self.store.set_search_term(self.search.as_str());
        self.select_first();
        self.sync();
    }

    fn clear_search(&mut self) {
        self.search.clear();
        self.apply_search();
    }

    fn toggle_theme(&mut self) {
        self.preferences.theme = self.preferences.theme.toggled();
        self.palette = Palette::for_theme(self.preferences.theme);
        match self.preferences.save(&self.data_dir) {
            Ok(()) => self.set_status_info(format!("Theme: {}", self.preferences.theme.as_str())),
            Err(err) => {
                tracing::warn!(error = %err, "failed to save preferences");
                self.set_status_error(format!("Could not save theme: {err}"));
            }
        }
    }

    fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
        self.set_status_info(STATUS_HELP);
    }

    pub(crate) fn set_status_info<T: Into<String>>(&mut self, message: T) {
        self.status = Some(StatusMessage::new(message, StatusKind::Info));
    }

    pub(crate) fn set_status_error<T: Into<String>>(&mut self, message: T) {
        self.status = Some(StatusMessage::new(message, StatusKind::Error));
    }

    /// Block until every spawned intent has resolved.
    #[cfg(test)]
    fn settle(&mut self) {
        while self.pending > 0 {
            match self
                .outcome_rx
                .recv_timeout(std::time::Duration::from_secs(2))
            {
                Ok(outcome) => self.apply_outcome(outcome),
                Err(_) => panic!("intent did not resolve"),
            }
        }
        self.sync();
    }
}
