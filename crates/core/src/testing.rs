//! In-memory [`TaskService`] used by tests across the workspace.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;

use crate::client::TaskService;
use crate::error::{TaskError, TaskResult};
use crate::model::{NewTask, Task, TaskPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    Get,
    Update,
    Remove,
}

#[derive(Default)]
struct Inner {
    tasks: Vec<Task>,
    next_id: u64,
    offline: bool,
    failures: HashMap<Op, TaskError>,
    delays: HashMap<Op, std::time::Duration>,
}

/// Behaves like the remote service: assigns ids and timestamps, keeps records
/// newest first, and can be told to fail.
#[derive(Default)]
pub struct InMemoryTaskService {
    inner: Mutex<Inner>,
    probes: AtomicUsize,
    calls: AtomicUsize,
}

impl InMemoryTaskService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request fails with a transport error and probes report offline.
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    /// The next call of `op` fails with `error`.
    pub fn fail_next(&self, op: Op, error: TaskError) {
        self.inner.lock().failures.insert(op, error);
    }

    /// The next call of `op` waits `delay` before answering.
    pub fn delay_next(&self, op: Op, delay: std::time::Duration) {
        self.inner.lock().delays.insert(op, delay);
    }

    /// Insert a record verbatim, duplicate ids included.
    pub fn insert_raw(&self, task: Task) {
        self.inner.lock().tasks.insert(0, task);
    }

    /// Insert a record as if another client had created it.
    pub fn seed(&self, title: &str, description: &str, completed: bool) -> Task {
        let mut inner = self.inner.lock();
        let task = build_task(&mut inner, title, description, completed);
        inner.tasks.insert(0, task.clone());
        task
    }

    pub fn stored(&self) -> Vec<Task> {
        self.inner.lock().tasks.clone()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Requests issued, probes excluded.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn check(&self, op: Op) -> TaskResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.inner.lock().delays.remove(&op);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut inner = self.inner.lock();
        if inner.offline {
            return Err(TaskError::transport("connection refused"));
        }
        match inner.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn build_task(inner: &mut Inner, title: &str, description: &str, completed: bool) -> Task {
    inner.next_id += 1;
    let base = Utc
        .timestamp_opt(1_704_067_200, 0)
        .single()
        .unwrap_or_default();
    let created_at = base + Duration::seconds(inner.next_id as i64);
    Task {
        id: format!("task-{}", inner.next_id),
        title: title.trim().to_string(),
        description: description.trim().to_string(),
        completed,
        created_at,
        updated_at: Some(created_at),
    }
}

#[async_trait]
impl TaskService for InMemoryTaskService {
    async fn list_all(&self) -> TaskResult<Vec<Task>> {
        self.check(Op::List).await?;
        Ok(self.stored())
    }

    async fn create(&self, input: &NewTask) -> TaskResult<Task> {
        self.check(Op::Create).await?;
        if input.title.trim().is_empty() {
            return Err(TaskError::validation("Title cannot be empty"));
        }
        let mut inner = self.inner.lock();
        let task = build_task(&mut inner, &input.title, &input.description, input.completed);
        inner.tasks.insert(0, task.clone());
        Ok(task)
    }

    async fn get(&self, id: &str) -> TaskResult<Task> {
        self.check(Op::Get).await?;
        self.inner
            .lock()
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or_else(|| TaskError::not_found(id))
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> TaskResult<Task> {
        self.check(Op::Update).await?;
        let mut inner = self.inner.lock();
        let task = inner
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| TaskError::not_found(id))?;
        if let Some(title) = &patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            task.description = description.trim().to_string();
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = task.updated_at.map(|at| at + Duration::seconds(1));
        Ok(task.clone())
    }

    async fn remove(&self, id: &str) -> TaskResult<()> {
        self.check(Op::Remove).await?;
        let mut inner = self.inner.lock();
        let before = inner.tasks.len();
        inner.tasks.retain(|task| task.id != id);
        if inner.tasks.len() == before {
            return Err(TaskError::not_found(id));
        }
        Ok(())
    }

    async fn probe(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        !self.inner.lock().offline
    }
}
