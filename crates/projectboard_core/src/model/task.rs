//! Task and comment entities.
//!
//! # Invariants
//! - `status` and `column_id` are maintained independently; moving a task
//!   between columns never rewrites its status and vice versa.
//! - `updated_at` is refreshed on every mutation.
//! - Comments are immutable once created, except for deletion.

use super::{new_id, require_id, require_text, EntityId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "review" => Some(TaskStatus::Review),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// Unit of work belonging to a project, optionally placed in a board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub project_id: EntityId,
    /// `None` when the task sits outside every board column.
    pub column_id: Option<EntityId>,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    /// Order within the task's column.
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(project_id: EntityId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            project_id,
            column_id: None,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            due_date: None,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(self.id)?;
        require_id(self.project_id)?;
        if let Some(column_id) = self.column_id {
            require_id(column_id)?;
        }
        require_text(&self.title, "task title")
    }
}

/// Free-text remark attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: EntityId,
    pub task_id: EntityId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(task_id: EntityId, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            task_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(self.id)?;
        require_id(self.task_id)?;
        require_text(&self.content, "comment content")
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskStatus};
    use crate::model::ValidationError;
    use uuid::Uuid;

    #[test]
    fn status_round_trips_through_str() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::parse("blocked"), None);
    }

    #[test]
    fn blank_title_is_rejected() {
        let task = Task::new(Uuid::new_v4(), "   ");
        assert_eq!(
            task.validate(),
            Err(ValidationError::EmptyField("task title"))
        );
    }

    #[test]
    fn touch_moves_updated_at_forward() {
        let mut task = Task::new(Uuid::new_v4(), "write copy");
        let before = task.updated_at;
        task.touch();
        assert!(task.updated_at >= before);
        assert_eq!(task.created_at, before);
    }
}
