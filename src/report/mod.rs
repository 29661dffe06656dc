//! Presentation of a dashboard run. [Report] is the structured result, [terminal] turns it into
//! text. `--json` prints the report itself.

pub mod terminal;

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use serde::{Serialize, Serializer};

use crate::calendar::{agenda::Agenda, event::CalendarEvent, focus::FocusBlock};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(serialize_with = "rfc3339")]
    pub generated_at: DateTime<FixedOffset>,
    pub days: Vec<DayReport>,
    /// `None` when focus time is hidden.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<Vec<FocusReport>>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub events: Vec<EventReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReport {
    pub id: Arc<str>,
    pub title: Arc<str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Arc<str>>,
    #[serde(serialize_with = "rfc3339")]
    pub start: DateTime<FixedOffset>,
    #[serde(serialize_with = "rfc3339")]
    pub end: DateTime<FixedOffset>,
    pub all_day: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FocusReport {
    #[serde(serialize_with = "rfc3339")]
    pub start: DateTime<FixedOffset>,
    #[serde(serialize_with = "rfc3339")]
    pub end: DateTime<FixedOffset>,
    pub minutes: i64,
}

/// Timestamps are always written with a numeric offset, `+00:00` included.
fn rfc3339<S: Serializer>(
    moment: &DateTime<FixedOffset>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&moment.to_rfc3339())
}

impl EventReport {
    /// Event with its times shown in `tz`.
    fn new<Tz: TimeZone>(event: &CalendarEvent, tz: &Tz) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            location: event.location.clone(),
            start: event.start.with_timezone(tz).fixed_offset(),
            end: event.end.with_timezone(tz).fixed_offset(),
            all_day: event.all_day,
        }
    }
}

impl<Tz: TimeZone> From<&FocusBlock<Tz>> for FocusReport {
    fn from(block: &FocusBlock<Tz>) -> Self {
        Self {
            start: block.start.fixed_offset(),
            end: block.end.fixed_offset(),
            minutes: block.minutes,
        }
    }
}

impl Report {
    pub fn new<Tz: TimeZone>(
        now: &DateTime<Tz>,
        agenda: &Agenda<Tz>,
        focus: Option<&[FocusBlock<Tz>]>,
        warnings: Vec<String>,
    ) -> Self {
        let tz = now.timezone();
        Self {
            generated_at: now.fixed_offset(),
            days: agenda
                .days()
                .iter()
                .map(|day| DayReport {
                    date: day.date,
                    events: day
                        .events
                        .iter()
                        .map(|event| EventReport::new(event, &tz))
                        .collect(),
                })
                .collect(),
            focus: focus.map(|blocks| blocks.iter().map(FocusReport::from).collect()),
            warnings,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
