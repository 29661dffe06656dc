//! Calendar data flows through this module in one direction:
//!  - [source] fetches raw events from commands or files,
//!  - [event] resolves them into [event::CalendarEvent]s,
//!  - [agenda] groups them into days,
//!  - [focus] finds the free time left in today's work window.

pub mod agenda;
pub mod event;
pub mod focus;
pub mod source;
