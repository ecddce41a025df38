use crate::model::{StatusFilter, TaskCounts};

/// One status tab in the header strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StatusTab {
    pub(crate) status: StatusFilter,
    pub(crate) label: &'static str,
}

pub(crate) const STATUS_TABS: [StatusTab; 3] = [
    StatusTab {
        status: StatusFilter::All,
        label: "All",
    },
    StatusTab {
        status: StatusFilter::Active,
        label: "Active",
    },
    StatusTab {
        status: StatusFilter::Completed,
        label: "Completed",
    },
];

impl StatusTab {
    pub(crate) fn count(&self, counts: &TaskCounts) -> usize {
        match self.status {
            StatusFilter::All => counts.total,
            StatusFilter::Active => counts.active,
            StatusFilter::Completed => counts.completed,
        }
    }

    pub(crate) fn title(&self, counts: &TaskCounts) -> String {
        format!("{} ({})", self.label, self.count(counts))
    }
}

pub(crate) fn tab_index(status: StatusFilter) -> usize {
    STATUS_TABS
        .iter()
        .position(|tab| tab.status == status)
        .unwrap_or(0)
}

pub(crate) fn next_status(status: StatusFilter) -> StatusFilter {
    let idx = (tab_index(status) + 1) % STATUS_TABS.len();
    STATUS_TABS[idx].status
}

pub(crate) fn prev_status(status: StatusFilter) -> StatusFilter {
    let idx = tab_index(status);
    let prev = if idx == 0 {
        STATUS_TABS.len() - 1
    } else {
        idx - 1
    };
    STATUS_TABS[prev].status
}
