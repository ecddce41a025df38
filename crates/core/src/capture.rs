use crate::error::TaskError;
use crate::model::NewTask;

/// Raw task input from any front-end (CLI words, TUI form fields).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureInput {
    pub text: Vec<String>,
    pub description: Option<String>,
}

impl CaptureInput {
    pub fn from_title(title: impl Into<String>) -> Self {
        Self {
            text: vec![title.into()],
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Title words joined by single spaces.
    pub fn title(&self) -> String {
        self.text
            .iter()
            .flat_map(|piece| piece.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Trimmed, validated create payload.
    pub fn into_new_task(self) -> Result<NewTask, TaskError> {
        let title = self.title();
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        let task = NewTask::new(title, description);
        task.validate()?;
        Ok(task)
    }
}
