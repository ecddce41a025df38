pub mod health;
pub mod projection;
pub mod store;

pub use health::HealthMonitor;
pub use projection::{EmptyState, ViewSnapshot};
pub use store::{Action, OperationState, TaskStore};
