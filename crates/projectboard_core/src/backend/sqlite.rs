//! SQLite-backed persistence for the project store.
//!
//! # Responsibility
//! - Map every entity type onto its own table.
//! - Apply store change batches inside one immediate transaction.
//!
//! # Invariants
//! - Write paths validate rows before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Reads return rows in insertion order (`ORDER BY rowid`).
//! - Timestamps are stored as RFC 3339 text.

use super::{Backend, BackendError, BackendResult, Change, EntityKind, Record, Snapshot};
use crate::db::{open_db, open_db_in_memory};
use crate::model::column::BoardColumn;
use crate::model::event::CalendarEvent;
use crate::model::note::{CheckItem, Note};
use crate::model::project::Project;
use crate::model::task::{Comment, Task, TaskStatus};
use crate::model::EntityId;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, error};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// SQLite backend owning one migrated connection.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> BackendResult<Self> {
        Ok(Self {
            conn: open_db(path, busy_timeout)?,
        })
    }

    pub fn open_in_memory() -> BackendResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps a connection that has already been opened through `db::open_db*`.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Backend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn load_snapshot(&self) -> BackendResult<Snapshot> {
        Ok(Snapshot {
            projects: select_all(&self.conn, PROJECT_SELECT_SQL, parse_project_row)?,
            board_columns: select_all(&self.conn, COLUMN_SELECT_SQL, parse_column_row)?,
            tasks: select_all(&self.conn, TASK_SELECT_SQL, parse_task_row)?,
            comments: select_all(&self.conn, COMMENT_SELECT_SQL, parse_comment_row)?,
            notes: select_all(&self.conn, NOTE_SELECT_SQL, parse_note_row)?,
            check_items: select_all(&self.conn, CHECK_ITEM_SELECT_SQL, parse_check_item_row)?,
            events: select_all(&self.conn, EVENT_SELECT_SQL, parse_event_row)?,
        })
    }

    fn commit(&mut self, changes: &[Change]) -> BackendResult<()> {
        let started_at = Instant::now();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        for change in changes {
            if let Err(err) = apply_change(&tx, change) {
                error!(
                    "event=backend_commit module=backend status=error backend=sqlite op={} table={} error={err}",
                    change.op(),
                    change.kind().table()
                );
                return Err(err);
            }
        }
        tx.commit()?;

        debug!(
            "event=backend_commit module=backend status=ok backend=sqlite changes={} duration_ms={}",
            changes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

const PROJECT_SELECT_SQL: &str = "SELECT
    id, name, description, created_at, updated_at
FROM projects ORDER BY rowid";

const COLUMN_SELECT_SQL: &str = "SELECT
    id, project_id, name, position, created_at
FROM board_columns ORDER BY rowid";

const TASK_SELECT_SQL: &str = "SELECT
    id, project_id, column_id, title, description, status, due_date, position,
    created_at, updated_at
FROM tasks ORDER BY rowid";

const COMMENT_SELECT_SQL: &str = "SELECT
    id, task_id, content, created_at
FROM comments ORDER BY rowid";

const NOTE_SELECT_SQL: &str = "SELECT
    id, project_id, title, content, created_at, updated_at
FROM notes ORDER BY rowid";

const CHECK_ITEM_SELECT_SQL: &str = "SELECT
    id, note_id, content, checked, created_at
FROM check_items ORDER BY rowid";

const EVENT_SELECT_SQL: &str = "SELECT
    id, project_id, title, description, start_date, end_date, created_at
FROM events ORDER BY rowid";

fn select_all<T>(
    conn: &Connection,
    sql: &str,
    parse: fn(&Row<'_>) -> BackendResult<T>,
) -> BackendResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }
    Ok(items)
}

fn apply_change(tx: &Transaction<'_>, change: &Change) -> BackendResult<()> {
    match change {
        Change::Insert(record) => {
            record.validate()?;
            insert_record(tx, record)
        }
        Change::Update(record) => {
            record.validate()?;
            let changed = update_record(tx, record)?;
            if changed == 0 {
                return Err(BackendError::NotFound {
                    kind: record.kind(),
                    id: record.id(),
                });
            }
            Ok(())
        }
        Change::Delete { kind, id } => {
            // Deleting an absent row is not an error.
            tx.execute(
                &format!("DELETE FROM {} WHERE id = ?1;", kind.table()),
                [id.to_string()],
            )?;
            Ok(())
        }
    }
}

fn insert_record(tx: &Transaction<'_>, record: &Record) -> BackendResult<()> {
    match record {
        Record::Project(row) => tx.execute(
            "INSERT INTO projects (id, name, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                row.id.to_string(),
                row.name.as_str(),
                row.description.as_str(),
                ts_to_db(row.created_at),
                row.updated_at.map(ts_to_db),
            ],
        )?,
        Record::BoardColumn(row) => tx.execute(
            "INSERT INTO board_columns (id, project_id, name, position, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                row.id.to_string(),
                row.project_id.to_string(),
                row.name.as_str(),
                row.position,
                ts_to_db(row.created_at),
            ],
        )?,
        Record::Task(row) => tx.execute(
            "INSERT INTO tasks (
                id, project_id, column_id, title, description, status, due_date, position,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                row.id.to_string(),
                row.project_id.to_string(),
                row.column_id.map(|id| id.to_string()),
                row.title.as_str(),
                row.description.as_str(),
                row.status.as_str(),
                row.due_date.map(ts_to_db),
                row.position,
                ts_to_db(row.created_at),
                ts_to_db(row.updated_at),
            ],
        )?,
        Record::Comment(row) => tx.execute(
            "INSERT INTO comments (id, task_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                row.id.to_string(),
                row.task_id.to_string(),
                row.content.as_str(),
                ts_to_db(row.created_at),
            ],
        )?,
        Record::Note(row) => tx.execute(
            "INSERT INTO notes (id, project_id, title, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                row.id.to_string(),
                row.project_id.to_string(),
                row.title.as_str(),
                row.content.as_str(),
                ts_to_db(row.created_at),
                row.updated_at.map(ts_to_db),
            ],
        )?,
        Record::CheckItem(row) => tx.execute(
            "INSERT INTO check_items (id, note_id, content, checked, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                row.id.to_string(),
                row.note_id.to_string(),
                row.content.as_str(),
                bool_to_int(row.checked),
                ts_to_db(row.created_at),
            ],
        )?,
        Record::Event(row) => tx.execute(
            "INSERT INTO events (
                id, project_id, title, description, start_date, end_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                row.id.to_string(),
                row.project_id.to_string(),
                row.title.as_str(),
                row.description.as_str(),
                ts_to_db(row.start),
                ts_to_db(row.end),
                ts_to_db(row.created_at),
            ],
        )?,
    };
    Ok(())
}

/// Returns the number of rows changed; creation timestamps are never rewritten.
fn update_record(tx: &Transaction<'_>, record: &Record) -> BackendResult<usize> {
    let changed = match record {
        Record::Project(row) => tx.execute(
            "UPDATE projects SET name = ?2, description = ?3, updated_at = ?4 WHERE id = ?1;",
            params![
                row.id.to_string(),
                row.name.as_str(),
                row.description.as_str(),
                row.updated_at.map(ts_to_db),
            ],
        )?,
        Record::BoardColumn(row) => tx.execute(
            "UPDATE board_columns SET name = ?2, position = ?3 WHERE id = ?1;",
            params![row.id.to_string(), row.name.as_str(), row.position],
        )?,
        Record::Task(row) => tx.execute(
            "UPDATE tasks
             SET
                column_id = ?2,
                title = ?3,
                description = ?4,
                status = ?5,
                due_date = ?6,
                position = ?7,
                updated_at = ?8
             WHERE id = ?1;",
            params![
                row.id.to_string(),
                row.column_id.map(|id| id.to_string()),
                row.title.as_str(),
                row.description.as_str(),
                row.status.as_str(),
                row.due_date.map(ts_to_db),
                row.position,
                ts_to_db(row.updated_at),
            ],
        )?,
        Record::Comment(row) => tx.execute(
            "UPDATE comments SET content = ?2 WHERE id = ?1;",
            params![row.id.to_string(), row.content.as_str()],
        )?,
        Record::Note(row) => tx.execute(
            "UPDATE notes SET title = ?2, content = ?3, updated_at = ?4 WHERE id = ?1;",
            params![
                row.id.to_string(),
                row.title.as_str(),
                row.content.as_str(),
                row.updated_at.map(ts_to_db),
            ],
        )?,
        Record::CheckItem(row) => tx.execute(
            "UPDATE check_items SET content = ?2, checked = ?3 WHERE id = ?1;",
            params![
                row.id.to_string(),
                row.content.as_str(),
                bool_to_int(row.checked),
            ],
        )?,
        Record::Event(row) => tx.execute(
            "UPDATE events
             SET title = ?2, description = ?3, start_date = ?4, end_date = ?5
             WHERE id = ?1;",
            params![
                row.id.to_string(),
                row.title.as_str(),
                row.description.as_str(),
                ts_to_db(row.start),
                ts_to_db(row.end),
            ],
        )?,
    };
    Ok(changed)
}

fn parse_project_row(row: &Row<'_>) -> BackendResult<Project> {
    let project = Project {
        id: parse_id(row, "projects", "id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: parse_ts(row, "projects", "created_at")?,
        updated_at: parse_optional_ts(row, "projects", "updated_at")?,
    };
    project.validate()?;
    Ok(project)
}

fn parse_column_row(row: &Row<'_>) -> BackendResult<BoardColumn> {
    let column = BoardColumn {
        id: parse_id(row, "board_columns", "id")?,
        project_id: parse_id(row, "board_columns", "project_id")?,
        name: row.get("name")?,
        position: row.get("position")?,
        created_at: parse_ts(row, "board_columns", "created_at")?,
    };
    column.validate()?;
    Ok(column)
}

fn parse_task_row(row: &Row<'_>) -> BackendResult<Task> {
    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        BackendError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    let task = Task {
        id: parse_id(row, "tasks", "id")?,
        project_id: parse_id(row, "tasks", "project_id")?,
        column_id: parse_optional_id(row, "tasks", "column_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        due_date: parse_optional_ts(row, "tasks", "due_date")?,
        position: row.get("position")?,
        created_at: parse_ts(row, "tasks", "created_at")?,
        updated_at: parse_ts(row, "tasks", "updated_at")?,
    };
    task.validate()?;
    Ok(task)
}

fn parse_comment_row(row: &Row<'_>) -> BackendResult<Comment> {
    let comment = Comment {
        id: parse_id(row, "comments", "id")?,
        task_id: parse_id(row, "comments", "task_id")?,
        content: row.get("content")?,
        created_at: parse_ts(row, "comments", "created_at")?,
    };
    comment.validate()?;
    Ok(comment)
}

fn parse_note_row(row: &Row<'_>) -> BackendResult<Note> {
    let note = Note {
        id: parse_id(row, "notes", "id")?,
        project_id: parse_id(row, "notes", "project_id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: parse_ts(row, "notes", "created_at")?,
        updated_at: parse_optional_ts(row, "notes", "updated_at")?,
    };
    note.validate()?;
    Ok(note)
}

fn parse_check_item_row(row: &Row<'_>) -> BackendResult<CheckItem> {
    let checked = match row.get::<_, i64>("checked")? {
        0 => false,
        1 => true,
        other => {
            return Err(BackendError::InvalidData(format!(
                "invalid checked value `{other}` in check_items.checked"
            )));
        }
    };

    let item = CheckItem {
        id: parse_id(row, "check_items", "id")?,
        note_id: parse_id(row, "check_items", "note_id")?,
        content: row.get("content")?,
        checked,
        created_at: parse_ts(row, "check_items", "created_at")?,
    };
    item.validate()?;
    Ok(item)
}

fn parse_event_row(row: &Row<'_>) -> BackendResult<CalendarEvent> {
    let event = CalendarEvent {
        id: parse_id(row, "events", "id")?,
        project_id: parse_id(row, "events", "project_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        start: parse_ts(row, "events", "start_date")?,
        end: parse_ts(row, "events", "end_date")?,
        created_at: parse_ts(row, "events", "created_at")?,
    };
    event.validate()?;
    Ok(event)
}

fn parse_id(row: &Row<'_>, table: &str, column: &str) -> BackendResult<EntityId> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text).map_err(|_| {
        BackendError::InvalidData(format!("invalid uuid value `{text}` in {table}.{column}"))
    })
}

fn parse_optional_id(row: &Row<'_>, table: &str, column: &str) -> BackendResult<Option<EntityId>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => Uuid::parse_str(&text).map(Some).map_err(|_| {
            BackendError::InvalidData(format!("invalid uuid value `{text}` in {table}.{column}"))
        }),
        None => Ok(None),
    }
}

fn parse_ts(row: &Row<'_>, table: &str, column: &str) -> BackendResult<DateTime<Utc>> {
    let text: String = row.get(column)?;
    ts_from_db(&text, table, column)
}

fn parse_optional_ts(
    row: &Row<'_>,
    table: &str,
    column: &str,
) -> BackendResult<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => ts_from_db(&text, table, column).map(Some),
        None => Ok(None),
    }
}

fn ts_from_db(text: &str, table: &str, column: &str) -> BackendResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| {
            BackendError::InvalidData(format!("invalid timestamp `{text}` in {table}.{column}"))
        })
}

fn ts_to_db(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{ts_from_db, ts_to_db};
    use chrono::{TimeZone, Utc};

    #[test]
    fn timestamps_round_trip_as_rfc3339() {
        let value = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let text = ts_to_db(value);
        assert_eq!(text, "2026-03-01T09:30:00Z");
        assert_eq!(ts_from_db(&text, "tasks", "due_date").unwrap(), value);
    }

    #[test]
    fn malformed_timestamp_reports_table_and_column() {
        let err = ts_from_db("yesterday", "events", "start_date").unwrap_err();
        assert!(err.to_string().contains("events.start_date"));
    }
}
