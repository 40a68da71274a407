//! Calendar day filtering.

use crate::model::event::CalendarEvent;
use chrono::NaiveDate;

/// Events whose start falls on `date` (UTC), in input order.
pub fn events_on(events: &[CalendarEvent], date: NaiveDate) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|event| event.start.date_naive() == date)
        .cloned()
        .collect()
}
