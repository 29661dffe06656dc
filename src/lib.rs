//! Daily agenda and focus time for your terminal. Calendar events are pulled from configurable
//! commands or files, grouped into days, and the free time left in today's work window is
//! reported as focus blocks.
//!

pub mod calendar;
pub mod cli;
pub mod config;
pub mod report;
pub mod utils;
