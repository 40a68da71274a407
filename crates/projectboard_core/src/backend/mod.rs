//! Persistence boundary for the project store.
//!
//! # Responsibility
//! - Define the row/change vocabulary shared by every backend and by the
//!   push channel (`Change`).
//! - Define the `Backend` contract the store talks to.
//! - Provide the in-memory (seedable) and SQLite implementations.
//!
//! # Invariants
//! - `Backend::commit` is atomic: every change of the batch is persisted or
//!   none is.
//! - `Snapshot::apply` is idempotent by id: re-applying an insert/update is
//!   safe, update/delete of an absent id is a no-op.

use crate::db::DbError;
use crate::model::column::BoardColumn;
use crate::model::event::CalendarEvent;
use crate::model::note::{CheckItem, Note};
use crate::model::project::Project;
use crate::model::task::{Comment, Task};
use crate::model::{EntityId, ValidationError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Receiver;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

pub type BackendResult<T> = Result<T, BackendError>;

/// Failure reported by a persistence backend.
#[derive(Debug)]
pub enum BackendError {
    Db(DbError),
    /// Persisted or submitted row violates entity invariants.
    InvalidData(String),
    /// An update targeted a row the backend does not hold.
    NotFound { kind: EntityKind, id: EntityId },
    /// Backend could not be reached.
    Unavailable(String),
    /// Backend did not answer within its configured timeout.
    Timeout,
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid board data: {message}"),
            Self::NotFound { kind, id } => write!(f, "{} row not found: {id}", kind.table()),
            Self::Unavailable(message) => write!(f, "backend unavailable: {message}"),
            Self::Timeout => write!(f, "backend request timed out"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for BackendError {
    fn from(value: DbError) -> Self {
        if value.is_busy() {
            Self::Timeout
        } else {
            Self::Db(value)
        }
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(value: rusqlite::Error) -> Self {
        DbError::Sqlite(value).into()
    }
}

impl From<ValidationError> for BackendError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Entity type, one per backend table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    BoardColumn,
    Task,
    Comment,
    Note,
    CheckItem,
    Event,
}

impl EntityKind {
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Project => "projects",
            EntityKind::BoardColumn => "board_columns",
            EntityKind::Task => "tasks",
            EntityKind::Comment => "comments",
            EntityKind::Note => "notes",
            EntityKind::CheckItem => "check_items",
            EntityKind::Event => "events",
        }
    }
}

/// One row of any entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "table", content = "row", rename_all = "snake_case")]
pub enum Record {
    Project(Project),
    BoardColumn(BoardColumn),
    Task(Task),
    Comment(Comment),
    Note(Note),
    CheckItem(CheckItem),
    Event(CalendarEvent),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Project(_) => EntityKind::Project,
            Record::BoardColumn(_) => EntityKind::BoardColumn,
            Record::Task(_) => EntityKind::Task,
            Record::Comment(_) => EntityKind::Comment,
            Record::Note(_) => EntityKind::Note,
            Record::CheckItem(_) => EntityKind::CheckItem,
            Record::Event(_) => EntityKind::Event,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            Record::Project(row) => row.id,
            Record::BoardColumn(row) => row.id,
            Record::Task(row) => row.id,
            Record::Comment(row) => row.id,
            Record::Note(row) => row.id,
            Record::CheckItem(row) => row.id,
            Record::Event(row) => row.id,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Record::Project(row) => row.validate(),
            Record::BoardColumn(row) => row.validate(),
            Record::Task(row) => row.validate(),
            Record::Comment(row) => row.validate(),
            Record::Note(row) => row.validate(),
            Record::CheckItem(row) => row.validate(),
            Record::Event(row) => row.validate(),
        }
    }
}

/// Row-level mutation; also the message type of the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data", rename_all = "snake_case")]
pub enum Change {
    Insert(Record),
    Update(Record),
    Delete { kind: EntityKind, id: EntityId },
}

impl Change {
    pub fn kind(&self) -> EntityKind {
        match self {
            Change::Insert(record) | Change::Update(record) => record.kind(),
            Change::Delete { kind, .. } => *kind,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            Change::Insert(record) | Change::Update(record) => record.id(),
            Change::Delete { id, .. } => *id,
        }
    }

    pub fn op(&self) -> &'static str {
        match self {
            Change::Insert(_) => "insert",
            Change::Update(_) => "update",
            Change::Delete { .. } => "delete",
        }
    }
}

/// Full contents of every table, each in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub board_columns: Vec<BoardColumn>,
    pub tasks: Vec<Task>,
    pub comments: Vec<Comment>,
    pub notes: Vec<Note>,
    pub check_items: Vec<CheckItem>,
    pub events: Vec<CalendarEvent>,
}

trait Keyed {
    fn key(&self) -> EntityId;
}

macro_rules! keyed {
    ($($ty:ty),* $(,)?) => {
        $(impl Keyed for $ty {
            fn key(&self) -> EntityId {
                self.id
            }
        })*
    };
}

keyed!(Project, BoardColumn, Task, Comment, Note, CheckItem, CalendarEvent);

fn upsert<T: Keyed>(rows: &mut Vec<T>, row: T) {
    match rows.iter_mut().find(|current| current.key() == row.key()) {
        Some(current) => *current = row,
        None => rows.push(row),
    }
}

fn replace<T: Keyed>(rows: &mut [T], row: T) -> bool {
    match rows.iter_mut().find(|current| current.key() == row.key()) {
        Some(current) => {
            *current = row;
            true
        }
        None => false,
    }
}

fn remove<T: Keyed>(rows: &mut Vec<T>, id: EntityId) -> bool {
    let before = rows.len();
    rows.retain(|row| row.key() != id);
    rows.len() != before
}

impl Snapshot {
    /// Applies one change by id. Returns whether any row was touched.
    pub fn apply(&mut self, change: &Change) -> bool {
        match change.clone() {
            Change::Insert(record) => {
                self.upsert(record);
                true
            }
            Change::Update(record) => self.replace(record),
            Change::Delete { kind, id } => self.remove(kind, id),
        }
    }

    /// Returns whether a row of `kind` with `id` exists.
    pub fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        match kind {
            EntityKind::Project => self.projects.iter().any(|row| row.id == id),
            EntityKind::BoardColumn => self.board_columns.iter().any(|row| row.id == id),
            EntityKind::Task => self.tasks.iter().any(|row| row.id == id),
            EntityKind::Comment => self.comments.iter().any(|row| row.id == id),
            EntityKind::Note => self.notes.iter().any(|row| row.id == id),
            EntityKind::CheckItem => self.check_items.iter().any(|row| row.id == id),
            EntityKind::Event => self.events.iter().any(|row| row.id == id),
        }
    }

    /// Total row count across all tables.
    pub fn row_count(&self) -> usize {
        self.projects.len()
            + self.board_columns.len()
            + self.tasks.len()
            + self.comments.len()
            + self.notes.len()
            + self.check_items.len()
            + self.events.len()
    }

    /// Returns every row as an insert change, parents before children.
    pub fn to_inserts(&self) -> Vec<Change> {
        let mut changes = Vec::with_capacity(self.row_count());
        changes.extend(self.projects.iter().cloned().map(Record::Project).map(Change::Insert));
        changes.extend(
            self.board_columns
                .iter()
                .cloned()
                .map(Record::BoardColumn)
                .map(Change::Insert),
        );
        changes.extend(self.tasks.iter().cloned().map(Record::Task).map(Change::Insert));
        changes.extend(self.comments.iter().cloned().map(Record::Comment).map(Change::Insert));
        changes.extend(self.notes.iter().cloned().map(Record::Note).map(Change::Insert));
        changes.extend(
            self.check_items
                .iter()
                .cloned()
                .map(Record::CheckItem)
                .map(Change::Insert),
        );
        changes.extend(self.events.iter().cloned().map(Record::Event).map(Change::Insert));
        changes
    }

    fn upsert(&mut self, record: Record) {
        match record {
            Record::Project(row) => upsert(&mut self.projects, row),
            Record::BoardColumn(row) => upsert(&mut self.board_columns, row),
            Record::Task(row) => upsert(&mut self.tasks, row),
            Record::Comment(row) => upsert(&mut self.comments, row),
            Record::Note(row) => upsert(&mut self.notes, row),
            Record::CheckItem(row) => upsert(&mut self.check_items, row),
            Record::Event(row) => upsert(&mut self.events, row),
        }
    }

    fn replace(&mut self, record: Record) -> bool {
        match record {
            Record::Project(row) => replace(&mut self.projects, row),
            Record::BoardColumn(row) => replace(&mut self.board_columns, row),
            Record::Task(row) => replace(&mut self.tasks, row),
            Record::Comment(row) => replace(&mut self.comments, row),
            Record::Note(row) => replace(&mut self.notes, row),
            Record::CheckItem(row) => replace(&mut self.check_items, row),
            Record::Event(row) => replace(&mut self.events, row),
        }
    }

    fn remove(&mut self, kind: EntityKind, id: EntityId) -> bool {
        match kind {
            EntityKind::Project => remove(&mut self.projects, id),
            EntityKind::BoardColumn => remove(&mut self.board_columns, id),
            EntityKind::Task => remove(&mut self.tasks, id),
            EntityKind::Comment => remove(&mut self.comments, id),
            EntityKind::Note => remove(&mut self.notes, id),
            EntityKind::CheckItem => remove(&mut self.check_items, id),
            EntityKind::Event => remove(&mut self.events, id),
        }
    }
}

/// Contract between the store and a persistence service.
pub trait Backend {
    /// Short backend name used in log events.
    fn name(&self) -> &'static str;
    /// Reads every table.
    fn load_snapshot(&self) -> BackendResult<Snapshot>;
    /// Persists a batch of changes atomically.
    fn commit(&mut self, changes: &[Change]) -> BackendResult<()>;
    /// Opens the push channel, when the backend has one.
    fn subscribe(&mut self) -> Option<Receiver<Change>> {
        None
    }
}
