use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calendar::focus::FocusOptions;

/// Typed view over the parts of the resolved configuration this application reads. Every field
/// has a counterpart in [builtin_defaults](super::defaults::builtin_defaults), so a resolved
/// document always deserializes unless a user override changed a value's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub calendar: CalendarSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSettings {
    pub enabled: bool,
    /// Substituted for `{calendar}` in source commands.
    pub id: String,
    pub lookahead_days: u32,
    pub show_focus_time: bool,
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    pub min_focus_minutes: u32,
    pub max_focus_blocks: usize,
    pub count_in_progress_events: bool,
    pub sources: Vec<SourceSpec>,
    pub timeout_seconds: u64,
}

/// Where calendar events come from. Written as `{"command": ["prog", "arg"]}` or
/// `{"file": "/path/to/events.json"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSpec {
    Command(Vec<String>),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    pub color: bool,
    pub compact: bool,
    pub max_events: usize,
}

impl Settings {
    pub fn from_document(document: &Value) -> Result<Self> {
        Settings::deserialize(document).context("Invalid configuration value")
    }
}

impl CalendarSettings {
    pub fn focus_options(&self) -> Result<FocusOptions> {
        if self.work_start_hour >= self.work_end_hour || self.work_end_hour > 24 {
            bail!(
                "Invalid work window {}:00-{}:00. calendar.workStartHour must be before calendar.workEndHour and both within 0-24",
                self.work_start_hour,
                self.work_end_hour
            );
        }
        Ok(FocusOptions {
            work_start_hour: self.work_start_hour,
            work_end_hour: self.work_end_hour,
            min_block_minutes: self.min_focus_minutes,
            max_blocks: self.max_focus_blocks,
            count_in_progress: self.count_in_progress_events,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Days shown in the agenda, never less than one.
    pub fn horizon_days(&self) -> u32 {
        self.lookahead_days.max(1)
    }
}
