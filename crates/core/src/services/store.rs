use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::client::TaskService;
use crate::error::{TaskError, TaskResult};
use crate::model::{NewTask, StatusFilter, Task, TaskPatch, ViewFilter};
use crate::notify::{Notification, Notifier};
use crate::services::projection::ViewSnapshot;

pub const MSG_ADDED: &str = "Task added";
pub const MSG_UPDATED: &str = "Task updated";
pub const MSG_DELETED: &str = "Task deleted";
pub const MSG_ADD_FAILED: &str = "Failed to add task";
pub const MSG_UPDATE_FAILED: &str = "Failed to update task";
pub const MSG_DELETE_FAILED: &str = "Failed to delete task";
pub const MSG_LOAD_FAILED: &str = "Failed to load tasks";
pub const MSG_FETCH_FAILED: &str = "Failed to fetch task";
pub const MSG_OFFLINE: &str = "Task service is not responding";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Load,
    Add,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Load => "load",
            Action::Add => "add",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OperationState {
    #[default]
    Idle,
    Pending,
    Committed,
    Failed(String),
}

#[derive(Debug, Default)]
struct OperationTracker {
    in_flight: usize,
    last: OperationState,
}

impl OperationTracker {
    fn state(&self) -> OperationState {
        if self.in_flight > 0 {
            OperationState::Pending
        } else {
            self.last.clone()
        }
    }
}

#[derive(Debug)]
struct StoreState {
    tasks: Vec<Task>,
    online: bool,
    operations: HashMap<Action, OperationTracker>,
}

/// Owns the canonical task collection and mediates every mutation against the
/// remote service.
///
/// The collection changes only after the service confirms an operation. The
/// state lock is never held across an `.await`, so resolution handlers apply
/// one at a time. Operations on the same record are not serialized: whichever
/// response resolves last wins.
pub struct TaskStore {
    service: Arc<dyn TaskService>,
    state: Mutex<StoreState>,
    filter: Mutex<ViewFilter>,
    notifier: Notifier,
}

impl TaskStore {
    pub fn new(service: Arc<dyn TaskService>) -> Self {
        Self {
            service,
            state: Mutex::new(StoreState {
                tasks: Vec::new(),
                online: true,
                operations: HashMap::new(),
            }),
            filter: Mutex::new(ViewFilter::default()),
            notifier: Notifier::new(),
        }
    }

    /// Replace the collection with a full snapshot from the service.
    pub async fn load(&self) -> TaskResult<usize> {
        self.begin(Action::Load);

        let result = self.service.list_all().await;

        let mut state = self.state.lock();
        match result {
            Ok(tasks) => {
                state.tasks = dedupe_by_id(tasks);
                let count = state.tasks.len();
                state.online = true;
                finish(&mut state, Action::Load, None);
                drop(state);
                tracing::debug!(count, "loaded tasks");
                Ok(count)
            }
            Err(err) => {
                state.online = false;
                finish(&mut state, Action::Load, Some(&err));
                drop(state);
                tracing::warn!(error = %err, "failed to load tasks");
                self.notifier.error(MSG_LOAD_FAILED);
                Err(err)
            }
        }
    }

    /// Create a task and prepend the stored record once the service confirms.
    ///
    /// Callers trim input first; a blank title is rejected without a request.
    pub async fn add_task(&self, input: NewTask) -> TaskResult<Task> {
        input.validate()?;
        self.begin(Action::Add);

        match self.service.create(&input).await {
            Ok(task) => {
                let mut state = self.state.lock();
                state.tasks.retain(|existing| existing.id != task.id);
                state.tasks.insert(0, task.clone());
                finish(&mut state, Action::Add, None);
                drop(state);
                tracing::debug!(task_id = task.id.as_str(), "task added");
                self.notifier.success(MSG_ADDED);
                Ok(task)
            }
            Err(err) => Err(self.fail(Action::Add, MSG_ADD_FAILED, err)),
        }
    }

    /// Apply a partial update and swap in the returned record, keeping its
    /// position in the collection.
    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> TaskResult<Task> {
        patch.validate()?;
        self.begin(Action::Update);

        match self.service.update(id, &patch).await {
            Ok(task) => {
                let mut state = self.state.lock();
                if let Some(slot) = state.tasks.iter_mut().find(|existing| existing.id == id) {
                    *slot = task.clone();
                }
                finish(&mut state, Action::Update, None);
                drop(state);
                tracing::debug!(task_id = id, "task updated");
                self.notifier.success(MSG_UPDATED);
                Ok(task)
            }
            Err(err) => Err(self.fail(Action::Update, MSG_UPDATE_FAILED, err)),
        }
    }

    /// Flip the completion flag of a task in the collection.
    pub async fn toggle_task(&self, id: &str) -> TaskResult<Task> {
        let completed = self
            .task(id)
            .map(|task| task.completed)
            .ok_or_else(|| TaskError::not_found(id))?;
        self.update_task(id, TaskPatch::completed(!completed)).await
    }

    pub async fn remove_task(&self, id: &str) -> TaskResult<()> {
        self.begin(Action::Delete);

        match self.service.remove(id).await {
            Ok(()) => {
                let mut state = self.state.lock();
                state.tasks.retain(|existing| existing.id != id);
                finish(&mut state, Action::Delete, None);
                drop(state);
                tracing::debug!(task_id = id, "task deleted");
                self.notifier.success(MSG_DELETED);
                Ok(())
            }
            Err(err) => Err(self.fail(Action::Delete, MSG_DELETE_FAILED, err)),
        }
    }

    /// Refresh one record from the service; absent records are not inserted.
    pub async fn fetch_task(&self, id: &str) -> TaskResult<Task> {
        match self.service.get(id).await {
            Ok(task) => {
                let mut state = self.state.lock();
                if let Some(slot) = state.tasks.iter_mut().find(|existing| existing.id == id) {
                    *slot = task.clone();
                }
                Ok(task)
            }
            Err(err) => {
                tracing::warn!(task_id = id, error = %err, "failed to fetch task");
                self.notifier.error(MSG_FETCH_FAILED);
                Err(err)
            }
        }
    }

    /// Probe the service and record connectivity. Warns once per
    /// online-to-offline transition.
    pub async fn check_health(&self) -> bool {
        let online = self.service.probe().await;
        let was_online = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.online, online)
        };
        if was_online && !online {
            self.notifier.warning(MSG_OFFLINE);
        } else if !was_online && online {
            tracing::info!("task service reachable again");
        }
        online
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        self.state
            .lock()
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
    }

    /// True while any load is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading()
    }

    pub fn is_online(&self) -> bool {
        self.state.lock().online
    }

    pub fn operation(&self, action: Action) -> OperationState {
        self.state
            .lock()
            .operations
            .get(&action)
            .map(OperationTracker::state)
            .unwrap_or_default()
    }

    pub fn filter(&self) -> ViewFilter {
        self.filter.lock().clone()
    }

    pub fn set_status_filter(&self, status: StatusFilter) {
        self.filter.lock().status = status;
    }

    pub fn set_search_term(&self, term: impl Into<String>) {
        self.filter.lock().search = term.into();
    }

    /// Projection of the current collection under the current filter.
    pub fn view(&self) -> ViewSnapshot {
        let filter = self.filter();
        let state = self.state.lock();
        ViewSnapshot::build(&state.tasks, &filter, state.is_loading(), state.online)
    }

    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.notifier.drain()
    }

    fn begin(&self, action: Action) {
        let mut state = self.state.lock();
        state.operations.entry(action).or_default().in_flight += 1;
    }

    fn fail(&self, action: Action, message: &str, err: TaskError) -> TaskError {
        {
            let mut state = self.state.lock();
            finish(&mut state, action, Some(&err));
        }
        tracing::warn!(
            action = action.as_str(),
            kind = err.kind(),
            error = %err,
            "task operation failed"
        );
        self.notifier.error(message);
        err
    }
}

impl StoreState {
    fn is_loading(&self) -> bool {
        self.operations
            .get(&Action::Load)
            .is_some_and(|tracker| tracker.in_flight > 0)
    }
}

fn finish(state: &mut StoreState, action: Action, error: Option<&TaskError>) {
    let tracker = state.operations.entry(action).or_default();
    tracker.in_flight = tracker.in_flight.saturating_sub(1);
    tracker.last = match error {
        None => OperationState::Committed,
        Some(err) => OperationState::Failed(err.to_string()),
    };
}

/// Keeps the first occurrence of each id.
fn dedupe_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = std::collections::HashSet::new();
    tasks
        .into_iter()
        .filter(|task| seen.insert(task.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskCounts;
    use crate::notify::Level;
    use crate::testing::{InMemoryTaskService, Op};
    use pretty_assertions::assert_eq;

    fn store_with_service() -> (Arc<TaskStore>, Arc<InMemoryTaskService>) {
        let service = Arc::new(InMemoryTaskService::new());
        let store = Arc::new(TaskStore::new(service.clone()));
        (store, service)
    }

    fn levels(store: &TaskStore) -> Vec<Level> {
        store
            .drain_notifications()
            .into_iter()
            .map(|n| n.level)
            .collect()
    }

    #[tokio::test]
    async fn end_to_end_add_complete_remove() {
        let (store, _service) = store_with_service();
        store.load().await.unwrap();
        assert!(store.tasks().is_empty());

        let created = store
            .add_task(NewTask::new("Write report", ""))
            .await
            .unwrap();
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(
            store.view().counts,
            TaskCounts {
                total: 1,
                active: 1,
                completed: 0
            }
        );

        store
            .update_task(&created.id, TaskPatch::completed(true))
            .await
            .unwrap();
        let counts = store.view().counts;
        assert_eq!((counts.active, counts.completed), (0, 1));

        store.remove_task(&created.id).await.unwrap();
        assert_eq!(store.view().counts.total, 0);
        assert_eq!(levels(&store), vec![Level::Success; 3]);
    }

    #[tokio::test]
    async fn added_record_survives_reload_with_server_fields() {
        let (store, _service) = store_with_service();
        let created = store
            .add_task(NewTask::new("Buy milk", "two litres"))
            .await
            .unwrap();

        store.load().await.unwrap();
        let reloaded = store.task(&created.id).expect("record present after load");
        assert_eq!(reloaded, created);
        assert_eq!(reloaded.title, "Buy milk");
        assert_eq!(reloaded.description, "two litres");
    }

    #[tokio::test]
    async fn inserts_newest_first_and_updates_keep_position() {
        let (store, _service) = store_with_service();
        let first = store.add_task(NewTask::new("First", "")).await.unwrap();
        let second = store.add_task(NewTask::new("Second", "")).await.unwrap();
        let third = store.add_task(NewTask::new("Third", "")).await.unwrap();

        store
            .update_task(
                &second.id,
                TaskPatch {
                    title: Some("Second (edited)".into()),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap();

        let titles: Vec<_> = store.tasks().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Third", "Second (edited)", "First"]);
        assert_eq!(store.tasks()[0].id, third.id);
        assert_eq!(store.tasks()[2].id, first.id);
    }

    #[tokio::test]
    async fn completed_task_moves_between_status_projections() {
        let (store, _service) = store_with_service();
        let task = store.add_task(NewTask::new("Ship", "")).await.unwrap();
        store.toggle_task(&task.id).await.unwrap();

        store.set_status_filter(StatusFilter::Active);
        assert!(store.view().tasks.iter().all(|t| t.id != task.id));

        store.set_status_filter(StatusFilter::Completed);
        assert!(store.view().tasks.iter().any(|t| t.id == task.id));
    }

    #[tokio::test]
    async fn removed_task_never_projects_again() {
        let (store, _service) = store_with_service();
        let task = store.add_task(NewTask::new("Temp", "")).await.unwrap();
        store.remove_task(&task.id).await.unwrap();

        for status in StatusFilter::ALL {
            store.set_status_filter(status);
            store.set_search_term("");
            assert!(store.view().tasks.iter().all(|t| t.id != task.id));
            store.set_search_term("temp");
            assert!(store.view().tasks.iter().all(|t| t.id != task.id));
        }
    }

    #[tokio::test]
    async fn failed_add_leaves_collection_and_reraises_transport_error() {
        let (store, service) = store_with_service();
        store.add_task(NewTask::new("Existing", "")).await.unwrap();
        store.drain_notifications();

        service.fail_next(Op::Create, TaskError::transport("timed out"));
        let err = store
            .add_task(NewTask::new("Lost", ""))
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert_eq!(store.tasks().len(), 1);
        assert!(store.is_online(), "mutations do not flip connectivity");
        assert_eq!(levels(&store), vec![Level::Error]);
        assert!(matches!(
            store.operation(Action::Add),
            OperationState::Failed(_)
        ));
    }

    #[tokio::test]
    async fn blank_title_is_rejected_without_a_request() {
        let (store, service) = store_with_service();
        let err = store.add_task(NewTask::new("   ", "")).await.unwrap_err();

        assert!(matches!(err, TaskError::Validation { .. }));
        assert_eq!(service.call_count(), 0);
        assert_eq!(store.operation(Action::Add), OperationState::Idle);
    }

    #[tokio::test]
    async fn failed_update_and_delete_leave_collection_untouched() {
        let (store, service) = store_with_service();
        let task = store.add_task(NewTask::new("Keep", "")).await.unwrap();
        let before = store.tasks();

        service.fail_next(Op::Update, TaskError::service(500, "boom"));
        assert!(store
            .update_task(&task.id, TaskPatch::completed(true))
            .await
            .is_err());
        assert_eq!(store.tasks(), before);

        service.fail_next(Op::Remove, TaskError::transport("reset"));
        assert!(store.remove_task(&task.id).await.is_err());
        assert_eq!(store.tasks(), before);
    }

    #[tokio::test]
    async fn unknown_id_surfaces_not_found() {
        let (store, _service) = store_with_service();
        let err = store
            .update_task("ghost", TaskPatch::completed(true))
            .await
            .unwrap_err();
        assert_eq!(err, TaskError::not_found("ghost"));

        let err = store.toggle_task("ghost").await.unwrap_err();
        assert_eq!(err, TaskError::not_found("ghost"));
    }

    #[tokio::test]
    async fn failed_load_goes_offline_and_keeps_previous_collection() {
        let (store, service) = store_with_service();
        service.seed("Seeded", "", false);
        store.load().await.unwrap();
        assert_eq!(store.tasks().len(), 1);

        service.set_offline(true);
        assert!(store.load().await.is_err());
        assert!(!store.is_online());
        assert!(!store.is_loading());
        assert_eq!(store.tasks().len(), 1);

        service.set_offline(false);
        store.load().await.unwrap();
        assert!(store.is_online());
    }

    #[tokio::test]
    async fn health_warning_fires_once_per_transition() {
        let (store, service) = store_with_service();
        service.set_offline(true);

        assert!(!store.check_health().await);
        assert!(!store.check_health().await);
        assert!(!store.check_health().await);
        assert_eq!(levels(&store), vec![Level::Warning]);

        service.set_offline(false);
        assert!(store.check_health().await);
        service.set_offline(true);
        assert!(!store.check_health().await);
        assert_eq!(levels(&store), vec![Level::Warning]);
    }

    #[tokio::test]
    async fn fetch_task_refreshes_in_place_only() {
        let (store, service) = store_with_service();
        let task = store.add_task(NewTask::new("Local", "")).await.unwrap();
        let foreign = service.seed("Foreign", "", false);

        store.fetch_task(&foreign.id).await.unwrap();
        assert!(store.task(&foreign.id).is_none());

        let fetched = store.fetch_task(&task.id).await.unwrap();
        assert_eq!(store.task(&task.id), Some(fetched));
    }

    #[tokio::test]
    async fn concurrent_operations_on_different_records_are_independent() {
        let (store, _service) = store_with_service();
        let a = store.add_task(NewTask::new("A", "")).await.unwrap();
        let b = store.add_task(NewTask::new("B", "")).await.unwrap();

        let (left, right) = tokio::join!(
            store.update_task(&a.id, TaskPatch::completed(true)),
            store.remove_task(&b.id),
        );
        left.unwrap();
        right.unwrap();

        assert_eq!(store.tasks().len(), 1);
        assert!(store.task(&a.id).unwrap().completed);
        assert_eq!(store.operation(Action::Update), OperationState::Committed);
        assert_eq!(store.operation(Action::Delete), OperationState::Committed);
    }

    #[tokio::test]
    async fn loading_stays_set_until_the_last_overlapping_load_resolves() {
        let (store, service) = store_with_service();
        service.seed("One", "", false);
        service.delay_next(Op::List, std::time::Duration::from_millis(300));

        let slow = tokio::spawn({
            let store = store.clone();
            async move { store.load().await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        assert!(store.is_loading());

        store.load().await.unwrap();
        assert!(store.is_loading(), "the slower load is still in flight");
        assert!(store.view().loading);

        slow.await.unwrap().unwrap();
        assert!(!store.is_loading());
        assert!(!store.view().loading);
    }

    #[tokio::test]
    async fn load_reports_the_number_of_records_kept() {
        let (store, service) = store_with_service();
        let task = service.seed("One", "", false);
        service.insert_raw(task.clone());
        assert_eq!(service.stored().len(), 2);

        let count = store.load().await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.tasks(), vec![task]);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let service = InMemoryTaskService::new();
        let task = service.seed("One", "", false);
        let mut dup = task.clone();
        dup.title = "Dup".into();
        let deduped = dedupe_by_id(vec![task.clone(), dup]);
        assert_eq!(deduped, vec![task]);
    }
}
