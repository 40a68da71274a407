//! Kanban board projection.

use crate::model::column::{sort_by_position, BoardColumn};
use crate::model::task::Task;
use chrono::{DateTime, Utc};

/// Days ahead of `now` within which a due date counts as "soon".
pub const DUE_SOON_DAYS: i64 = 3;

/// One board column with the tasks it holds, in position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLane {
    pub column: BoardColumn,
    pub tasks: Vec<Task>,
}

/// Full board: lanes left to right plus tasks placed in no column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    pub lanes: Vec<BoardLane>,
    pub unplaced: Vec<Task>,
}

/// Builds the board for one project's columns and tasks.
///
/// Tasks referencing a column outside `columns` land in `unplaced`.
pub fn board_lanes(columns: &[BoardColumn], tasks: &[Task]) -> Board {
    let mut ordered = columns.to_vec();
    sort_by_position(&mut ordered);

    let lanes: Vec<BoardLane> = ordered
        .into_iter()
        .map(|column| {
            let mut lane_tasks: Vec<Task> = tasks
                .iter()
                .filter(|task| task.column_id == Some(column.id))
                .cloned()
                .collect();
            lane_tasks.sort_by_key(|task| task.position);
            BoardLane {
                column,
                tasks: lane_tasks,
            }
        })
        .collect();

    let mut unplaced: Vec<Task> = tasks
        .iter()
        .filter(|task| {
            task.column_id
                .map_or(true, |id| !lanes.iter().any(|lane| lane.column.id == id))
        })
        .cloned()
        .collect();
    unplaced.sort_by_key(|task| task.position);

    Board { lanes, unplaced }
}

/// Urgency of a task's due date relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    None,
    Overdue,
    Soon,
    Normal,
}

impl DueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DueStatus::None => "none",
            DueStatus::Overdue => "overdue",
            DueStatus::Soon => "soon",
            DueStatus::Normal => "normal",
        }
    }
}

/// Classifies a due date by the whole days left, rounded up.
pub fn due_status(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DueStatus {
    let Some(due) = due else {
        return DueStatus::None;
    };

    let millis = (due - now).num_milliseconds();
    let days_left = ceil_div(millis, 86_400_000);
    if days_left < 0 {
        DueStatus::Overdue
    } else if days_left <= DUE_SOON_DAYS {
        DueStatus::Soon
    } else {
        DueStatus::Normal
    }
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    let quotient = value / divisor;
    if value % divisor > 0 {
        quotient + 1
    } else {
        quotient
    }
}
