//! Calendar event entity.
//!
//! # Invariants
//! - `end` is expected to be >= `start`; this is the caller's responsibility
//!   and is not enforced by `validate()`.

use super::{new_id, require_id, require_text, EntityId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scheduled block of time on a project's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EntityId,
    pub project_id: EntityId,
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl CalendarEvent {
    pub fn new(
        project_id: EntityId,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            project_id,
            title: title.into(),
            description: String::new(),
            start,
            end,
            created_at: Utc::now(),
        }
    }

    /// Returns whether `end` precedes `start`.
    pub fn is_reversed(&self) -> bool {
        self.end < self.start
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(self.id)?;
        require_id(self.project_id)?;
        require_text(&self.title, "event title")
    }
}
