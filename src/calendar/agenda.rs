use chrono::{Days, NaiveDate, TimeZone};

use crate::utils::time::day_start;

use super::event::CalendarEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaDay {
    pub date: NaiveDate,
    /// All-day events first, then timed events by start.
    pub events: Vec<CalendarEvent>,
}

/// Events of the next few days grouped by the day they start on.
#[derive(Debug, Clone)]
pub struct Agenda<Tz: TimeZone> {
    days: Vec<AgendaDay>,
    events: Vec<CalendarEvent>,
    tz: Tz,
}

impl<Tz: TimeZone> Agenda<Tz> {
    /// Groups `events` into `horizon_days` days starting with `today`. Events starting outside
    /// the horizon are not listed, but still count for [Agenda::timed_events_on].
    pub fn build(events: Vec<CalendarEvent>, today: NaiveDate, horizon_days: u32, tz: Tz) -> Self {
        let mut days = (0..u64::from(horizon_days.max(1)))
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .map(|date| AgendaDay {
                date,
                events: Vec::new(),
            })
            .collect::<Vec<_>>();

        for event in &events {
            let date = event.start_date(&tz);
            if let Some(day) = days.iter_mut().find(|day| day.date == date) {
                day.events.push(event.clone());
            }
        }
        for day in &mut days {
            day.events.sort_by_key(|event| (!event.all_day, event.start));
        }

        Self { days, events, tz }
    }

    pub fn days(&self) -> &[AgendaDay] {
        &self.days
    }

    /// Timed events overlapping `date`, ordered by start. This includes events that started on an
    /// earlier day and are still running.
    pub fn timed_events_on(&self, date: NaiveDate) -> Vec<CalendarEvent> {
        let start = day_start(date, &self.tz).fixed_offset();
        let end = date
            .succ_opt()
            .map(|next| day_start(next, &self.tz).fixed_offset());

        let mut events = self
            .events
            .iter()
            .filter(|event| !event.all_day)
            .filter(|event| end.map_or(true, |end| event.start < end))
            .filter(|event| event.end > start || event.start >= start)
            .cloned()
            .collect::<Vec<_>>();
        events.sort_by_key(|event| event.start);
        events
    }
}
