//! Digest rendering.
//!
//! Turns an ordered list of [`CalendarEvent`]s into the plain-text body of
//! the weekly email. Rendering is pure and never fails: time values that did
//! not parse upstream are printed exactly as the provider sent them.

use crate::event::CalendarEvent;

/// The first line of every digest.
const HEADER: &str = "Next week's schedule:";

/// The body used when the week holds no events.
const NO_EVENTS: &str = "No events found for next week.";

/// Renders the digest body for a list of events.
///
/// Events are printed one per line in input order (the provider returns them
/// sorted by start time), as `<start> - <end>: <summary>`.
pub fn render(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return format!("{HEADER}\n{NO_EVENTS}");
    }

    let mut body = String::from(HEADER);
    body.push('\n');
    for event in events {
        body.push_str(&event.start.render());
        body.push_str(" - ");
        body.push_str(&event.end.render());
        body.push_str(": ");
        body.push_str(&event.summary);
        body.push('\n');
    }
    body
}
