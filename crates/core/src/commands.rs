use crate::error::TaskError;
use crate::model::DeleteResult;
use crate::services::TaskStore;

/// Delete the tasks with the provided ids and return per-id results.
///
/// Unknown ids are reported as not deleted. Any other failure is recorded on
/// its id and the batch carries on, so earlier deletions are always reported.
pub async fn delete_tasks(store: &TaskStore, ids: &[String]) -> Vec<DeleteResult> {
    let mut results = Vec::with_capacity(ids.len());
    for id in ids {
        let result = match store.remove_task(id).await {
            Ok(()) => DeleteResult::deleted(id.as_str()),
            Err(TaskError::NotFound { .. }) => DeleteResult::missing(id.as_str()),
            Err(err) => DeleteResult::failed(id.as_str(), &err),
        };
        results.push(result);
    }
    results
}
