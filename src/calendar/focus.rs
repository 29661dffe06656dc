use chrono::{DateTime, Duration, TimeZone};
use tracing::{instrument, trace};

use crate::utils::time::at_hour;

use super::event::CalendarEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusOptions {
    pub work_start_hour: u32,
    /// End of the work window, exclusive. May be 24.
    pub work_end_hour: u32,
    pub min_block_minutes: u32,
    pub max_blocks: usize,
    /// Whether an event that started before the window and is still running occupies the start
    /// of the window.
    pub count_in_progress: bool,
}

impl Default for FocusOptions {
    fn default() -> Self {
        Self {
            work_start_hour: 9,
            work_end_hour: 18,
            min_block_minutes: 30,
            max_blocks: 3,
            count_in_progress: true,
        }
    }
}

/// A free interval inside the work window. `minutes` is the length truncated toward zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusBlock<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub minutes: i64,
}

impl<Tz: TimeZone> FocusBlock<Tz> {
    fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        let minutes = (end.clone() - start.clone()).num_minutes();
        Self {
            start,
            end,
            minutes,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end.clone() - self.start.clone()
    }
}

/// Length of `[start, end)` in minutes, not rounded.
fn exact_minutes<Tz: TimeZone>(start: &DateTime<Tz>, end: &DateTime<Tz>) -> f64 {
    (end.clone() - start.clone()).num_milliseconds() as f64 / 60_000.
}

/// Finds free intervals between today's events.
///
/// The work window starts at `max(now, work_start_hour)` and ends at `work_end_hour` on the day of
/// `now`, in `now`'s timezone. Events are walked in start order with a cursor that only ever moves
/// forward, so overlapping events never produce negative gaps. Events with `end < start` are
/// treated as zero length. Gaps shorter than `min_block_minutes` are dropped and at most
/// `max_blocks` earliest gaps are returned.
///
/// All-day events are ignored. Events are expected to belong to the day of `now`.
#[instrument(skip(events), fields(event_count = events.len()))]
pub fn compute_focus_blocks<Tz: TimeZone>(
    events: &[CalendarEvent],
    now: &DateTime<Tz>,
    options: &FocusOptions,
) -> Vec<FocusBlock<Tz>> {
    let tz = now.timezone();
    let window_start = now.clone().max(at_hour(now, options.work_start_hour));
    let window_end = at_hour(now, options.work_end_hour);

    if window_start >= window_end {
        trace!("Work window is over");
        return Vec::new();
    }

    let mut occupied = events
        .iter()
        .filter(|event| !event.all_day)
        .map(|event| {
            let start = event.start.with_timezone(&tz);
            // An event ending before it starts occupies no time.
            let end = event.end.with_timezone(&tz).max(start.clone());
            (start, end)
        })
        .filter(|(start, end)| {
            let starts_inside = *start >= window_start && *start < window_end;
            let in_progress =
                options.count_in_progress && *start < window_start && *end > window_start;
            starts_inside || in_progress
        })
        .collect::<Vec<_>>();
    occupied.sort_by(|a, b| a.0.cmp(&b.0));

    let min_minutes = f64::from(options.min_block_minutes);
    let mut blocks = Vec::new();
    let mut push_gap = |start: DateTime<Tz>, end: DateTime<Tz>| {
        let minutes = exact_minutes(&start, &end);
        if minutes >= min_minutes {
            blocks.push(FocusBlock::new(start, end));
        } else {
            trace!("Skipping gap of {minutes} minutes");
        }
    };

    let mut cursor = window_start;
    for (start, end) in occupied {
        if start > cursor {
            push_gap(cursor.clone(), start);
        }
        cursor = cursor.max(end);
    }
    if cursor < window_end {
        push_gap(cursor, window_end);
    }

    blocks.truncate(options.max_blocks);
    blocks
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

    use crate::calendar::event::CalendarEvent;

    use super::{compute_focus_blocks, FocusBlock, FocusOptions};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 5, hour, minute, 0).unwrap()
    }

    fn event(start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent {
            id: "event".into(),
            title: Arc::from("Meeting"),
            location: None,
            start: start.fixed_offset(),
            end: end.fixed_offset(),
            all_day: false,
        }
    }

    fn spans(blocks: &[FocusBlock<Utc>]) -> Vec<(DateTime<Utc>, DateTime<Utc>, i64)> {
        blocks.iter().map(|b| (b.start, b.end, b.minutes)).collect()
    }

    #[test]
    fn test_empty_day_is_one_block() {
        let blocks = compute_focus_blocks(&[], &at(9, 0), &FocusOptions::default());
        assert_eq!(spans(&blocks), vec![(at(9, 0), at(18, 0), 540)]);
    }

    #[test]
    fn test_gaps_between_events() {
        let events = [event(at(9, 0), at(9, 30)), event(at(11, 0), at(12, 0))];
        let blocks = compute_focus_blocks(&events, &at(8, 0), &FocusOptions::default());
        assert_eq!(
            spans(&blocks),
            vec![(at(9, 30), at(11, 0), 90), (at(12, 0), at(18, 0), 360)]
        );
    }

    #[test]
    fn test_overlapping_events_do_not_rewind() {
        let events = [event(at(10, 0), at(11, 0)), event(at(10, 30), at(12, 0))];
        let blocks = compute_focus_blocks(&events, &at(9, 0), &FocusOptions::default());
        assert_eq!(
            spans(&blocks),
            vec![(at(9, 0), at(10, 0), 60), (at(12, 0), at(18, 0), 360)]
        );
    }

    #[test]
    fn test_contained_event_does_not_rewind() {
        let events = [event(at(10, 0), at(13, 0)), event(at(11, 0), at(11, 30))];
        let blocks = compute_focus_blocks(&events, &at(9, 0), &FocusOptions::default());
        assert_eq!(
            spans(&blocks),
            vec![(at(9, 0), at(10, 0), 60), (at(13, 0), at(18, 0), 300)]
        );
    }

    #[test]
    fn test_full_day_event_leaves_nothing() {
        let events = [event(at(9, 0), at(18, 0))];
        assert!(compute_focus_blocks(&events, &at(9, 0), &FocusOptions::default()).is_empty());
    }

    #[test]
    fn test_after_work_is_empty() {
        let options = FocusOptions::default();
        assert!(compute_focus_blocks(&[], &at(18, 0), &options).is_empty());
        assert!(compute_focus_blocks(&[], &at(21, 15), &options).is_empty());
    }

    #[test]
    fn test_window_starts_at_now() {
        let blocks = compute_focus_blocks(&[], &at(16, 20), &FocusOptions::default());
        assert_eq!(spans(&blocks), vec![(at(16, 20), at(18, 0), 100)]);
    }

    #[test]
    fn test_threshold_uses_exact_minutes() {
        // 30 minutes exactly is enough, 29m59s isn't.
        let events = [event(at(9, 30), at(10, 0))];
        let blocks = compute_focus_blocks(&events, &at(9, 0), &FocusOptions::default());
        assert_eq!(blocks[0].start, at(9, 0));
        assert_eq!(blocks[0].minutes, 30);

        let events = [event(at(9, 30), at(10, 0))];
        let now = at(9, 0) + Duration::seconds(1);
        let blocks = compute_focus_blocks(&events, &now, &FocusOptions::default());
        assert_eq!(blocks[0].start, at(10, 0));
    }

    #[test]
    fn test_reported_minutes_are_truncated() {
        let now = at(17, 0) - Duration::seconds(30);
        let blocks = compute_focus_blocks(&[], &now, &FocusOptions::default());
        assert_eq!(blocks[0].minutes, 60);
        assert_eq!(blocks[0].duration(), Duration::seconds(3630));
    }

    #[test]
    fn test_max_blocks_keeps_earliest() {
        let events = [
            event(at(10, 0), at(10, 30)),
            event(at(11, 30), at(12, 0)),
            event(at(13, 0), at(13, 30)),
            event(at(14, 30), at(15, 0)),
        ];
        let blocks = compute_focus_blocks(&events, &at(9, 0), &FocusOptions::default());
        assert_eq!(
            spans(&blocks),
            vec![
                (at(9, 0), at(10, 0), 60),
                (at(10, 30), at(11, 30), 60),
                (at(12, 0), at(13, 0), 60)
            ]
        );
    }

    #[test]
    fn test_all_day_and_outside_events_are_ignored() {
        let mut holiday = event(at(0, 0), at(0, 0) + Duration::days(1));
        holiday.all_day = true;
        let events = [holiday, event(at(18, 0), at(19, 0)), event(at(7, 0), at(8, 0))];
        let blocks = compute_focus_blocks(&events, &at(9, 0), &FocusOptions::default());
        assert_eq!(spans(&blocks), vec![(at(9, 0), at(18, 0), 540)]);
    }

    #[test]
    fn test_in_progress_policy() {
        let events = [event(at(8, 30), at(10, 0))];

        let blocks = compute_focus_blocks(&events, &at(9, 0), &FocusOptions::default());
        assert_eq!(spans(&blocks), vec![(at(10, 0), at(18, 0), 480)]);

        let options = FocusOptions {
            count_in_progress: false,
            ..FocusOptions::default()
        };
        let blocks = compute_focus_blocks(&events, &at(9, 0), &options);
        assert_eq!(spans(&blocks), vec![(at(9, 0), at(18, 0), 540)]);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let events = [event(at(11, 0), at(12, 0)), event(at(9, 0), at(9, 30))];
        let blocks = compute_focus_blocks(&events, &at(8, 0), &FocusOptions::default());
        assert_eq!(
            spans(&blocks),
            vec![(at(9, 30), at(11, 0), 90), (at(12, 0), at(18, 0), 360)]
        );
    }

    #[test]
    fn test_inverted_event_does_not_produce_negative_blocks() {
        let events = [event(at(12, 0), at(10, 0)), event(at(13, 0), at(14, 0))];
        let blocks = compute_focus_blocks(&events, &at(9, 0), &FocusOptions::default());
        assert_eq!(
            spans(&blocks),
            vec![
                (at(9, 0), at(12, 0), 180),
                (at(12, 0), at(13, 0), 60),
                (at(14, 0), at(18, 0), 240)
            ]
        );
        assert!(blocks.iter().all(|b| b.minutes > 0));
    }

    #[test]
    fn test_uses_timezone_of_now() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 4, 5, 8, 0, 0).unwrap();
        // 10:00-11:00 local, given in UTC.
        let events = [event(at(7, 0), at(8, 0))];
        let blocks = compute_focus_blocks(&events, &now, &FocusOptions::default());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].start, tz.with_ymd_and_hms(2024, 4, 5, 9, 0, 0).unwrap());
        assert_eq!(blocks[0].end, tz.with_ymd_and_hms(2024, 4, 5, 10, 0, 0).unwrap());
        assert_eq!(blocks[1].end, tz.with_ymd_and_hms(2024, 4, 5, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_invariants_over_many_days() {
        let options = FocusOptions {
            min_block_minutes: 20,
            max_blocks: 4,
            ..FocusOptions::default()
        };
        for seed in 0..200u32 {
            let now = at(7, 0) + Duration::minutes(i64::from(seed * 17 % 720));
            let events = (0..(seed % 7))
                .map(|i| {
                    let start = at(8, 0) + Duration::minutes(i64::from((seed * 31 + i * 53) % 600));
                    let length = Duration::minutes(i64::from((seed + i * 13) % 120));
                    event(start, start + length)
                })
                .collect::<Vec<_>>();

            let blocks = compute_focus_blocks(&events, &now, &options);
            assert!(blocks.len() <= options.max_blocks);
            for block in &blocks {
                assert!(block.minutes >= i64::from(options.min_block_minutes));
                assert!(block.start >= now && block.end <= at(18, 0));
            }
            for pair in blocks.windows(2) {
                assert!(pair[0].end <= pair[1].start);
            }
            if now >= at(18, 0) {
                assert!(blocks.is_empty());
            }
        }
    }
}
