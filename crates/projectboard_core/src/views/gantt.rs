//! Gantt date axis arithmetic.

use crate::model::task::Task;
use chrono::{Duration, NaiveDate};

/// Padding added on each side of the task range, in days.
pub const WINDOW_PADDING_DAYS: i64 = 7;

/// Inclusive range of days shown on the Gantt axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GanttWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl GanttWindow {
    /// Number of days on the axis, both ends included.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every day on the axis, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        (0..self.day_count())
            .map(|offset| self.start + Duration::days(offset))
            .collect()
    }

    /// Scrolls the window by `days` (negative scrolls back).
    ///
    /// `None` when either edge would leave the supported date range.
    pub fn shift_days(&self, days: i64) -> Option<Self> {
        let offset = Duration::try_days(days)?;
        Some(Self {
            start: self.start.checked_add_signed(offset)?,
            end: self.end.checked_add_signed(offset)?,
        })
    }
}

/// Window spanning every dated task.
///
/// Starts a week before the earliest due or creation date of a dated task
/// and ends a week after the latest due date. `None` when no task has a due
/// date.
pub fn gantt_window(tasks: &[Task]) -> Option<GanttWindow> {
    let dated: Vec<&Task> = tasks.iter().filter(|task| task.due_date.is_some()).collect();

    let latest_due = dated
        .iter()
        .filter_map(|task| task.due_date)
        .max()?
        .date_naive();
    let earliest = dated
        .iter()
        .flat_map(|task| task.due_date.into_iter().chain(Some(task.created_at)))
        .min()?
        .date_naive();

    Some(GanttWindow {
        start: earliest - Duration::days(WINDOW_PADDING_DAYS),
        end: latest_due + Duration::days(WINDOW_PADDING_DAYS),
    })
}

/// Horizontal offset of `day` on the axis, as a percentage of its width.
///
/// `None` when the day falls outside the window.
pub fn bar_offset_percent(day: NaiveDate, window: &GanttWindow) -> Option<f64> {
    let offset = (day - window.start).num_days();
    let width = window.day_count();
    if offset < 0 || offset >= width {
        return None;
    }
    Some(offset as f64 / width as f64 * 100.0)
}
