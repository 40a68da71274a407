//! Project entity.

use super::{new_id, require_id, require_text, EntityId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level container for tasks, notes, events and board columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    /// May be empty.
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Set on every update; `None` until the first one.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Creates a project with a generated id and `created_at = now`.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(self.id)?;
        require_text(&self.name, "project name")
    }
}
