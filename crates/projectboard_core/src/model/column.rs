//! Board column entity.
//!
//! # Invariants
//! - `position` orders columns left to right within one project.
//! - Positions need not be contiguous; ties keep insertion order.

use super::{new_id, require_id, require_text, EntityId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Names of the columns provisioned for every new project, in position order.
pub const DEFAULT_COLUMN_NAMES: [&str; 4] = ["To Do", "In Progress", "Review", "Done"];

/// Named, ordered lane on a project's kanban board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardColumn {
    pub id: EntityId,
    pub project_id: EntityId,
    pub name: String,
    pub position: u32,
    pub created_at: DateTime<Utc>,
}

impl BoardColumn {
    pub fn new(project_id: EntityId, name: impl Into<String>, position: u32) -> Self {
        Self {
            id: new_id(),
            project_id,
            name: name.into(),
            position,
            created_at: Utc::now(),
        }
    }

    /// Builds the default "To Do / In Progress / Review / Done" lanes.
    pub fn defaults_for(project_id: EntityId) -> Vec<Self> {
        DEFAULT_COLUMN_NAMES
            .iter()
            .zip(0u32..)
            .map(|(name, position)| Self::new(project_id, *name, position))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(self.id)?;
        require_id(self.project_id)?;
        require_text(&self.name, "column name")
    }
}

/// Sorts columns by position; the sort is stable so ties keep insertion order.
pub fn sort_by_position(columns: &mut [BoardColumn]) {
    columns.sort_by_key(|column| column.position);
}
