//! Activity timeline: task and event creation grouped by day.

use crate::model::event::CalendarEvent;
use crate::model::task::Task;
use crate::model::EntityId;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineKind {
    Task,
    Event,
}

/// One activity entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub kind: TimelineKind,
    /// Id of the task or event the entry describes.
    pub source_id: EntityId,
    pub title: String,
    pub description: String,
    pub at: DateTime<Utc>,
}

/// Entries of one UTC calendar day, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineDay {
    pub date: NaiveDate,
    pub entries: Vec<TimelineEntry>,
}

/// Groups creation activity by day; days and entries are newest first.
pub fn timeline(tasks: &[Task], events: &[CalendarEvent]) -> Vec<TimelineDay> {
    let task_entries = tasks.iter().map(|task| TimelineEntry {
        kind: TimelineKind::Task,
        source_id: task.id,
        title: task.title.clone(),
        description: task.description.clone(),
        at: task.created_at,
    });
    let event_entries = events.iter().map(|event| TimelineEntry {
        kind: TimelineKind::Event,
        source_id: event.id,
        title: event.title.clone(),
        description: event.description.clone(),
        at: event.created_at,
    });

    let mut by_day: BTreeMap<NaiveDate, Vec<TimelineEntry>> = BTreeMap::new();
    for entry in task_entries.chain(event_entries) {
        by_day.entry(entry.at.date_naive()).or_default().push(entry);
    }

    by_day
        .into_iter()
        .rev()
        .map(|(date, mut entries)| {
            entries.sort_by(|a, b| b.at.cmp(&a.at));
            TimelineDay { date, entries }
        })
        .collect()
}
