use thiserror::Error;

/// Failures surfaced by the task service client and re-raised by the store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Network unreachable, timed out, or the response body could not be read.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Non-2xx response that is not a not-found or validation rejection.
    #[error("service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("task '{id}' not found")]
    NotFound { id: String },

    /// Input rejected, either locally before any request or by the service.
    #[error("invalid task: {message}")]
    Validation { message: String },
}

impl TaskError {
    pub fn transport(message: impl Into<String>) -> Self {
        TaskError::Transport {
            message: message.into(),
        }
    }

    pub fn service(status: u16, message: impl Into<String>) -> Self {
        TaskError::Service {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        TaskError::NotFound { id: id.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        TaskError::Validation {
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, TaskError::Transport { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::Transport { .. } => "transport",
            TaskError::Service { .. } => "service",
            TaskError::NotFound { .. } => "not_found",
            TaskError::Validation { .. } => "validation",
        }
    }
}

pub type TaskResult<T> = Result<T, TaskError>;
