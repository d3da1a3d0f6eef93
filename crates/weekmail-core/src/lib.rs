//! Core types: time windows, events, digest rendering

pub mod digest;
pub mod event;
pub mod time;

pub use digest::render;
pub use event::CalendarEvent;
pub use time::{EventTime, TimeWindow};
