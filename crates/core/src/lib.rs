pub mod capture;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod preferences;
pub mod services;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use capture::CaptureInput;
pub use client::{HttpTaskClient, TaskService};
pub use commands::delete_tasks;
pub use config::{ClientConfig, ConfigOverrides};
pub use error::{TaskError, TaskResult};
pub use model::*;
pub use notify::{Level, Notification, Notifier};
pub use preferences::{Preferences, Theme};
pub use services::{Action, EmptyState, HealthMonitor, OperationState, TaskStore, ViewSnapshot};
