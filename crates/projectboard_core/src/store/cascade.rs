//! Change planning for deletes that fan out to dependent rows.
//!
//! # Invariants
//! - Plans list children before their parents.
//! - Planning an absent id yields an empty plan.
//! - A deleted column hands its tasks to the project's remaining column with
//!   the lowest position (first inserted on ties), appended after that
//!   column's own tasks; with no column left the tasks lose their column.

use crate::backend::{Change, EntityKind, Record, Snapshot};
use crate::model::task::Task;
use crate::model::EntityId;
use chrono::{DateTime, Utc};

fn delete(kind: EntityKind, id: EntityId) -> Change {
    Change::Delete { kind, id }
}

/// Plans deletion of a task and its comments.
pub fn plan_task_delete(data: &Snapshot, task_id: EntityId) -> Vec<Change> {
    if !data.contains(EntityKind::Task, task_id) {
        return Vec::new();
    }

    let mut plan: Vec<Change> = data
        .comments
        .iter()
        .filter(|comment| comment.task_id == task_id)
        .map(|comment| delete(EntityKind::Comment, comment.id))
        .collect();
    plan.push(delete(EntityKind::Task, task_id));
    plan
}

/// Plans deletion of a note and its check items.
pub fn plan_note_delete(data: &Snapshot, note_id: EntityId) -> Vec<Change> {
    if !data.contains(EntityKind::Note, note_id) {
        return Vec::new();
    }

    let mut plan: Vec<Change> = data
        .check_items
        .iter()
        .filter(|item| item.note_id == note_id)
        .map(|item| delete(EntityKind::CheckItem, item.id))
        .collect();
    plan.push(delete(EntityKind::Note, note_id));
    plan
}

/// Plans deletion of a project with every task, note, event and column it
/// owns, plus the comments and check items owned by those.
pub fn plan_project_delete(data: &Snapshot, project_id: EntityId) -> Vec<Change> {
    if !data.contains(EntityKind::Project, project_id) {
        return Vec::new();
    }

    let mut plan = Vec::new();
    for task in data.tasks.iter().filter(|task| task.project_id == project_id) {
        plan.extend(plan_task_delete(data, task.id));
    }
    for note in data.notes.iter().filter(|note| note.project_id == project_id) {
        plan.extend(plan_note_delete(data, note.id));
    }
    plan.extend(
        data.events
            .iter()
            .filter(|event| event.project_id == project_id)
            .map(|event| delete(EntityKind::Event, event.id)),
    );
    plan.extend(
        data.board_columns
            .iter()
            .filter(|column| column.project_id == project_id)
            .map(|column| delete(EntityKind::BoardColumn, column.id)),
    );
    plan.push(delete(EntityKind::Project, project_id));
    plan
}

/// Plans deletion of a board column, reassigning the tasks it held.
pub fn plan_column_delete(data: &Snapshot, column_id: EntityId, now: DateTime<Utc>) -> Vec<Change> {
    let Some(column) = data.board_columns.iter().find(|column| column.id == column_id) else {
        return Vec::new();
    };

    let successor = data
        .board_columns
        .iter()
        .filter(|other| other.project_id == column.project_id && other.id != column_id)
        .min_by_key(|other| other.position)
        .map(|other| other.id);

    let mut moved: Vec<Task> = data
        .tasks
        .iter()
        .filter(|task| task.column_id == Some(column_id))
        .cloned()
        .collect();
    // Stable: equal positions keep insertion order.
    moved.sort_by_key(|task| task.position);

    let mut plan = Vec::with_capacity(moved.len() + 1);
    match successor {
        Some(target) => {
            let mut lane: Vec<&Task> = data
                .tasks
                .iter()
                .filter(|task| task.column_id == Some(target))
                .collect();
            lane.sort_by_key(|task| task.position);

            let positions = match appended_positions(&lane, moved.len()) {
                Some(positions) => positions,
                None => {
                    // The target lane reaches i32::MAX: renumber it from zero.
                    for (position, task) in (0i32..).zip(&lane) {
                        if task.position != position {
                            let mut task = (*task).clone();
                            task.position = position;
                            task.updated_at = now;
                            plan.push(Change::Update(Record::Task(task)));
                        }
                    }
                    (0i32..).skip(lane.len()).take(moved.len()).collect()
                }
            };
            for (mut task, position) in moved.into_iter().zip(positions) {
                task.column_id = Some(target);
                task.position = position;
                task.updated_at = now;
                plan.push(Change::Update(Record::Task(task)));
            }
        }
        None => {
            for mut task in moved {
                task.column_id = None;
                task.updated_at = now;
                plan.push(Change::Update(Record::Task(task)));
            }
        }
    }
    plan.push(delete(EntityKind::BoardColumn, column_id));
    plan
}

/// Positions continuing after the last task of `lane`, or `None` on overflow.
fn appended_positions(lane: &[&Task], count: usize) -> Option<Vec<i32>> {
    let start = match lane.last() {
        Some(last) => last.position.checked_add(1)?,
        None => 0,
    };
    (0..count)
        .map(|offset| {
            i32::try_from(offset)
                .ok()
                .and_then(|offset| start.checked_add(offset))
        })
        .collect()
}
