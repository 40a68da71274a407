//! Entity schemas for the project board.
//!
//! # Responsibility
//! - Define the plain data shapes shared by the store, backends and views.
//! - Own field-level validation for every entity.
//!
//! # Invariants
//! - Every entity is identified by a stable, non-nil `EntityId`.
//! - Ids are assigned at creation and never reused or mutated.
//! - Required text fields are non-empty after trimming.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod column;
pub mod event;
pub mod note;
pub mod project;
pub mod task;

/// Opaque identifier shared by all entity types.
pub type EntityId = Uuid;

/// Field-level validation failure for an entity value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The entity id is the nil UUID.
    NilId,
    /// A required text field is empty after trimming.
    EmptyField(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "entity id must not be nil"),
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
        }
    }
}

impl Error for ValidationError {}

/// Generates a fresh entity id.
pub fn new_id() -> EntityId {
    Uuid::new_v4()
}

pub(crate) fn require_id(id: EntityId) -> Result<(), ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::NilId);
    }
    Ok(())
}

pub(crate) fn require_text(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}
