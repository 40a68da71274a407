//! Note and check item entities.

use super::{new_id, require_id, require_text, EntityId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form project note that can own a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    pub project_id: EntityId,
    pub title: String,
    /// May be empty.
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    pub fn new(
        project_id: EntityId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            project_id,
            title: title.into(),
            content: content.into(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(self.id)?;
        require_id(self.project_id)?;
        require_text(&self.title, "note title")
    }
}

/// One checklist line inside a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckItem {
    pub id: EntityId,
    pub note_id: EntityId,
    pub content: String,
    #[serde(default)]
    pub checked: bool,
    pub created_at: DateTime<Utc>,
}

impl CheckItem {
    /// Creates an unchecked item.
    pub fn new(note_id: EntityId, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            note_id,
            content: content.into(),
            checked: false,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(self.id)?;
        require_id(self.note_id)?;
        require_text(&self.content, "check item content")
    }
}
