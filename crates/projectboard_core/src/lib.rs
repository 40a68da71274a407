//! Core domain logic for ProjectBoard.
//! This crate is the single source of truth for board invariants; the CLI and
//! any future UI only read its views and call its mutators.

pub mod backend;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod seed;
pub mod store;
pub mod views;

pub use backend::memory::MemoryBackend;
pub use backend::sqlite::SqliteBackend;
pub use backend::{Backend, BackendError, BackendResult, Change, EntityKind, Record, Snapshot};
pub use config::{AppConfig, BackendKind, ConfigError, DEFAULT_CONFIG_PATH};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::column::BoardColumn;
pub use model::event::CalendarEvent;
pub use model::note::{CheckItem, Note};
pub use model::project::Project;
pub use model::task::{Comment, Task, TaskStatus};
pub use model::{EntityId, ValidationError};
pub use seed::seed_snapshot;
pub use store::{NewEvent, NewTask, ProjectStore, StoreError, StoreOptions, StoreResult, StoreState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
