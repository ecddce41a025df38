use std::time::Duration;

pub(crate) const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const TICK_RATE: Duration = Duration::from_millis(200);
pub(crate) const STATUS_TTL: Duration = Duration::from_secs(5);

pub(crate) const STATUS_ENTER_ADD: &str =
    "New task • Tab switches field • Enter saves • Esc cancels";
pub(crate) const STATUS_ENTER_EDIT: &str =
    "Edit task • Tab switches field • Enter saves • Esc cancels";
pub(crate) const STATUS_SEARCH: &str = "Search title and description • Enter/Esc to close";
pub(crate) const STATUS_HELP: &str = "Keyboard reference • Enter/Esc to close";
pub(crate) const STATUS_CONFIRM_DELETE: &str =
    "Confirm deletion • arrows choose, Enter confirms, Esc cancels";
pub(crate) const STATUS_REFRESHING: &str = "Refreshing tasks…";
pub(crate) const STATUS_NOTHING_SELECTED: &str = "No task selected";
