use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::utils::time::day_start;

pub const UNTITLED: &str = "(no title)";

/// Event as printed by calendar fetchers. The shape follows calendar APIs: timed events carry
/// `dateTime`, all-day events only carry `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub start: RawEventTime,
    #[serde(default)]
    pub end: Option<RawEventTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEventTime {
    #[serde(rename = "dateTime", default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Fetchers may print either a bare array or a page object with `items`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventDocument {
    List(Vec<RawEvent>),
    Page { items: Vec<RawEvent> },
}

pub fn parse_events(json: &str) -> Result<Vec<RawEvent>> {
    let document: EventDocument =
        serde_json::from_str(json).context("Expected a JSON array of events")?;
    Ok(match document {
        EventDocument::List(events) => events,
        EventDocument::Page { items } => items,
    })
}

/// A calendar event resolved to concrete instants. When `all_day` is set the times are local
/// midnights and carry no time-of-day meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub id: Arc<str>,
    pub title: Arc<str>,
    pub location: Option<Arc<str>>,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub all_day: bool,
}

impl CalendarEvent {
    /// Date the event starts on in `tz`.
    pub fn start_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.start.with_timezone(tz).date_naive()
    }
}

enum ResolvedTime {
    Instant(DateTime<FixedOffset>),
    Day(NaiveDate),
}

impl RawEventTime {
    fn resolve(&self) -> Result<ResolvedTime> {
        match (&self.date_time, self.date) {
            (Some(date_time), _) => DateTime::parse_from_rfc3339(date_time)
                .map(ResolvedTime::Instant)
                .with_context(|| format!("Invalid dateTime {date_time:?}")),
            (None, Some(date)) => Ok(ResolvedTime::Day(date)),
            (None, None) => Err(anyhow!("Neither dateTime nor date is present")),
        }
    }
}

impl RawEvent {
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }

    /// Resolves raw times into instants. All-day dates are anchored at midnight in `tz`. A
    /// missing end makes a timed event instantaneous and an all-day event one day long.
    pub fn resolve<Tz: TimeZone>(self, tz: &Tz) -> Result<CalendarEvent> {
        let id: Arc<str> = self.id.unwrap_or_default().into();
        let start = self
            .start
            .resolve()
            .with_context(|| format!("Event {id:?} has an invalid start"))?;
        let end = self
            .end
            .map(|end| end.resolve())
            .transpose()
            .with_context(|| format!("Event {id:?} has an invalid end"))?;

        let anchor = |date: NaiveDate| day_start(date, tz).fixed_offset();

        let (start, end, all_day) = match (start, end) {
            (ResolvedTime::Instant(start), Some(ResolvedTime::Instant(end))) => (start, end, false),
            (ResolvedTime::Instant(start), None) => (start, start, false),
            (ResolvedTime::Instant(start), Some(ResolvedTime::Day(date))) => {
                (start, anchor(date), false)
            }
            (ResolvedTime::Day(date), end) => {
                let end_date = match end {
                    Some(ResolvedTime::Day(end_date)) => end_date,
                    Some(ResolvedTime::Instant(end)) => end.date_naive(),
                    None => date
                        .checked_add_days(Days::new(1))
                        .ok_or_else(|| anyhow!("Event {id:?} ends after the end of time"))?,
                };
                (anchor(date), anchor(end_date), true)
            }
        };

        if all_day && end < start {
            bail!("Event {id:?} ends before it starts");
        }

        Ok(CalendarEvent {
            id,
            title: self
                .summary
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| UNTITLED.to_string())
                .into(),
            location: self.location.filter(|v| !v.is_empty()).map(Into::into),
            start,
            end,
            all_day,
        })
    }
}
