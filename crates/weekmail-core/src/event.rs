//! The calendar event model.

use serde::{Deserialize, Serialize};

use crate::time::EventTime;

/// A single event instance from the calendar provider.
///
/// Recurring events arrive already expanded into individual instances. The
/// provider-assigned id is carried for logging but is not used by the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Provider-assigned event identifier.
    pub id: String,
    /// The event title/summary.
    pub summary: String,
    /// When the event starts.
    pub start: EventTime,
    /// When the event ends.
    pub end: EventTime,
}

impl CalendarEvent {
    /// Creates a new event with the given fields.
    pub fn new(
        id: impl Into<String>,
        summary: impl Into<String>,
        start: EventTime,
        end: EventTime,
    ) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            start,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn basic_creation() {
        let event = CalendarEvent::new(
            "evt-1",
            "Standup",
            EventTime::from_utc(Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()),
            EventTime::from_utc(Utc.with_ymd_and_hms(2024, 3, 4, 9, 15, 0).unwrap()),
        );
        assert_eq!(event.id, "evt-1");
        assert_eq!(event.summary, "Standup");
        assert!(!event.start.is_all_day());
    }

    #[test]
    fn serde_roundtrip() {
        let event = CalendarEvent::new(
            "evt-2",
            "Offsite",
            EventTime::parse("2024-03-05"),
            EventTime::parse("2024-03-06"),
        );
        let json = serde_json::to_string(&event).unwrap();
        let parsed: CalendarEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}
