//! Derived, read-only views over the canonical task collection.

use crate::model::{StatusFilter, Task, TaskCounts, ViewFilter};

/// Filtered and searched subset of `tasks`, preserving collection order.
pub fn project(tasks: &[Task], filter: &ViewFilter) -> Vec<Task> {
    let term = filter.search_term().map(str::to_lowercase);
    tasks
        .iter()
        .filter(|task| filter.status.matches(task) && matches_term(task, term.as_deref()))
        .cloned()
        .collect()
}

pub fn matches(task: &Task, filter: &ViewFilter) -> bool {
    let term = filter.search_term().map(str::to_lowercase);
    filter.status.matches(task) && matches_term(task, term.as_deref())
}

/// `term` must already be lowercased.
fn matches_term(task: &Task, term: Option<&str>) -> bool {
    match term {
        None => true,
        Some(term) => {
            task.title.to_lowercase().contains(term)
                || task.description.to_lowercase().contains(term)
        }
    }
}

impl TaskCounts {
    /// Counters over the unfiltered collection.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total: tasks.len(),
            active: tasks.len() - completed,
            completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// A search term is active and nothing matched.
    NoMatches,
    /// The collection itself is empty.
    NoTasks,
    NoneInFilter(StatusFilter),
}

impl EmptyState {
    pub fn headline(&self) -> String {
        match self {
            EmptyState::NoMatches => "No tasks found".to_string(),
            EmptyState::NoTasks => "No tasks yet".to_string(),
            EmptyState::NoneInFilter(status) => format!("No {status} tasks"),
        }
    }

    pub fn hint(&self) -> String {
        match self {
            EmptyState::NoMatches => "Try adjusting your search or filter criteria".to_string(),
            EmptyState::NoTasks => "Create your first task to get started!".to_string(),
            EmptyState::NoneInFilter(status) => {
                format!("All your {status} tasks will appear here")
            }
        }
    }
}

/// Everything presentation needs to render one frame.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub filter: ViewFilter,
    pub tasks: Vec<Task>,
    pub counts: TaskCounts,
    pub loading: bool,
    pub online: bool,
}

impl ViewSnapshot {
    pub fn build(collection: &[Task], filter: &ViewFilter, loading: bool, online: bool) -> Self {
        Self {
            filter: filter.clone(),
            tasks: project(collection, filter),
            counts: TaskCounts::from_tasks(collection),
            loading,
            online,
        }
    }

    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.tasks.is_empty() {
            return None;
        }
        if self.filter.search_term().is_some() {
            Some(EmptyState::NoMatches)
        } else if self.counts.total == 0 {
            Some(EmptyState::NoTasks)
        } else {
            Some(EmptyState::NoneInFilter(self.filter.status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn task(id: &str, title: &str, description: &str, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            completed,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task("1", "Buy Milk", "", false),
            task("2", "Groceries", "need milk", true),
            task("3", "Bread", "", false),
        ]
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let filter = ViewFilter::new(StatusFilter::All, "milk");
        assert_eq!(ids(&project(&sample(), &filter)), vec!["1", "2"]);
    }

    #[rstest]
    #[case(StatusFilter::All, vec!["1", "2", "3"])]
    #[case(StatusFilter::Active, vec!["1", "3"])]
    #[case(StatusFilter::Completed, vec!["2"])]
    fn status_filter_selects_expected_records(
        #[case] status: StatusFilter,
        #[case] expected: Vec<&str>,
    ) {
        let filter = ViewFilter::new(status, "");
        assert_eq!(ids(&project(&sample(), &filter)), expected);
    }

    #[test]
    fn counts_ignore_the_filter() {
        let tasks = sample();
        let snapshot = ViewSnapshot::build(
            &tasks,
            &ViewFilter::new(StatusFilter::Completed, "zzz"),
            false,
            true,
        );
        assert!(snapshot.tasks.is_empty());
        assert_eq!(
            snapshot.counts,
            TaskCounts {
                total: 3,
                active: 2,
                completed: 1
            }
        );
    }

    #[test]
    fn empty_state_prefers_search_then_empty_collection() {
        let none = ViewSnapshot::build(&[], &ViewFilter::default(), false, true);
        assert_eq!(none.empty_state(), Some(EmptyState::NoTasks));

        let searching = ViewSnapshot::build(&[], &ViewFilter::new(StatusFilter::All, "x"), false, true);
        assert_eq!(searching.empty_state(), Some(EmptyState::NoMatches));

        let tasks = vec![task("1", "Open", "", false)];
        let filtered = ViewSnapshot::build(
            &tasks,
            &ViewFilter::new(StatusFilter::Completed, ""),
            false,
            true,
        );
        assert_eq!(
            filtered.empty_state(),
            Some(EmptyState::NoneInFilter(StatusFilter::Completed))
        );
        assert_eq!(
            filtered.empty_state().unwrap().headline(),
            "No completed tasks"
        );

        let full = ViewSnapshot::build(&tasks, &ViewFilter::default(), false, true);
        assert_eq!(full.empty_state(), None);
    }

    fn arb_task() -> impl Strategy<Value = Task> {
        ("[a-z0-9]{1,8}", "[A-Za-z ]{1,12}", "[A-Za-z ]{0,12}", any::<bool>())
            .prop_map(|(id, title, description, completed)| task(&id, &title, &description, completed))
    }

    fn arb_filter() -> impl Strategy<Value = ViewFilter> {
        (
            prop_oneof![
                Just(StatusFilter::All),
                Just(StatusFilter::Active),
                Just(StatusFilter::Completed)
            ],
            "[A-Za-z ]{0,3}",
        )
            .prop_map(|(status, search)| ViewFilter::new(status, search))
    }

    proptest! {
        #[test]
        fn projection_is_exactly_the_matching_subsequence(
            tasks in prop::collection::vec(arb_task(), 0..24),
            filter in arb_filter(),
        ) {
            let projected = project(&tasks, &filter);
            let expected: Vec<Task> = tasks
                .iter()
                .filter(|task| {
                    let status_ok = match filter.status {
                        StatusFilter::All => true,
                        StatusFilter::Active => !task.completed,
                        StatusFilter::Completed => task.completed,
                    };
                    let term = filter.search.trim().to_lowercase();
                    let search_ok = term.is_empty()
                        || task.title.to_lowercase().contains(&term)
                        || task.description.to_lowercase().contains(&term);
                    status_ok && search_ok
                })
                .cloned()
                .collect();
            prop_assert_eq!(&projected, &expected);
            for task in &projected {
                prop_assert!(matches(task, &filter));
            }

            let counts = TaskCounts::from_tasks(&tasks);
            prop_assert_eq!(counts.active + counts.completed, counts.total);
        }
    }
}
