//! Call calendar: one event per scheduled call slot, ordered by call date.

use chrono::{Datelike, NaiveDate};
use pipeline_core::types::Opportunity;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// `<client id>-<event type>`, unique across the feed.
    pub id: String,
    pub title: String,
    pub client_id: u64,
    pub client_name: String,
    pub date: NaiveDate,
    /// `discovery1` through `closing3`.
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording: Option<String>,
}

fn events_of(opportunity: &Opportunity) -> impl Iterator<Item = CalendarEvent> + '_ {
    opportunity.slots().filter_map(move |(id, slot)| {
        let date = slot.date?;
        Some(CalendarEvent {
            id: format!("{}-{}", opportunity.id, id.event_type()),
            title: format!("{} - {}", opportunity.name, id.label()),
            client_id: opportunity.id,
            client_name: opportunity.name.clone(),
            date,
            event_type: id.event_type().to_string(),
            duration: slot.held_minutes(),
            recording: slot.recording.clone(),
        })
    })
}

/// Every scheduled call across `opportunities`, ordered by date, then
/// client id, then slot order.
pub fn compute_calendar(opportunities: &[Opportunity]) -> Vec<CalendarEvent> {
    let mut events: Vec<(usize, CalendarEvent)> = opportunities
        .iter()
        .flat_map(|o| events_of(o).enumerate())
        .collect();
    events.sort_by(|(a_pos, a), (b_pos, b)| {
        (a.date, a.client_id, a_pos).cmp(&(b.date, b.client_id, b_pos))
    });
    debug!(events = events.len(), "Calendar events collected");
    events.into_iter().map(|(_, event)| event).collect()
}

/// Calendar narrowed to calls dated within one calendar month. Creation
/// month plays no part here.
pub fn compute_calendar_month(
    opportunities: &[Opportunity],
    year: i32,
    month: u32,
) -> Vec<CalendarEvent> {
    let mut events = compute_calendar(opportunities);
    events.retain(|e| e.date.year() == year && e.date.month() == month);
    events
}
