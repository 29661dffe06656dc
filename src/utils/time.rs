use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};

/// This is the standard way of printing a day heading in daybrief.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%A %d %B").to_string()
}

/// Returns the first instant of `date` in `tz`. Falls back to treating the date as UTC midnight
/// when local midnight doesn't exist (zones that switch DST at midnight).
pub fn day_start<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Returns the instant at `hour` o'clock on the day containing `moment`. `hour` may be 24, which
/// means the end of that day. When that local time is skipped, `hour` hours after the start of the
/// day is used instead.
pub fn at_hour<Tz: TimeZone>(moment: &DateTime<Tz>, hour: u32) -> DateTime<Tz> {
    let local = moment.date_naive().and_time(NaiveTime::MIN) + Duration::hours(hour.into());
    moment
        .timezone()
        .from_local_datetime(&local)
        .earliest()
        .unwrap_or_else(|| {
            day_start(moment.date_naive(), &moment.timezone()) + Duration::hours(hour.into())
        })
}

/// Formats a duration the way it's shown next to focus blocks, e.g. `1h 30m` or `45m`.
pub fn format_duration(v: Duration) -> String {
    if v.num_hours() > 0 {
        if v.num_minutes() % 60 == 0 {
            format!("{}h", v.num_hours())
        } else {
            format!("{}h {}m", v.num_hours(), v.num_minutes() % 60)
        }
    } else {
        format!("{}m", v.num_minutes())
    }
}
