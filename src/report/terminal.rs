use std::fmt::Write;

use ansi_term::{Colour, Style as AnsiStyle};
use chrono::{DateTime, FixedOffset};

use crate::utils::time::{day_label, format_duration};

use super::{EventReport, FocusReport, Report};

/// Roles of text in the report. Colour is decided per call, there's no global toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Heading,
    Time,
    Muted,
    Focus,
    Warning,
}

impl Style {
    fn ansi(self) -> AnsiStyle {
        match self {
            Style::Heading => Colour::Cyan.bold(),
            Style::Time => Colour::Yellow.normal(),
            Style::Muted => AnsiStyle::new().dimmed(),
            Style::Focus => Colour::Green.bold(),
            Style::Warning => Colour::Red.normal(),
        }
    }
}

pub fn paint(style: Style, color: bool, text: &str) -> String {
    if color {
        style.ansi().paint(text).to_string()
    } else {
        text.to_string()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TerminalOptions {
    pub color: bool,
    /// Drops locations and the blank lines between sections.
    pub compact: bool,
    /// Events listed per day, the rest is summarized.
    pub max_events: usize,
}

const TIME_FORMAT: &str = "%H:%M";

fn time_range(start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> String {
    format!("{}–{}", start.format(TIME_FORMAT), end.format(TIME_FORMAT))
}

fn render_event(out: &mut String, event: &EventReport, options: &TerminalOptions) {
    let time = if event.all_day {
        format!("{:<11}", "all day")
    } else {
        time_range(&event.start, &event.end)
    };
    let _ = write!(
        out,
        "  {}  {}",
        paint(Style::Time, options.color, &time),
        event.title
    );
    if let Some(location) = event.location.as_ref().filter(|_| !options.compact) {
        let _ = write!(
            out,
            "  {}",
            paint(Style::Muted, options.color, &format!("({location})"))
        );
    }
    out.push('\n');
}

/// Renders the agenda followed by focus time.
pub fn render(report: &Report, options: &TerminalOptions) -> String {
    let mut out = String::new();
    for day in &report.days {
        let _ = writeln!(
            out,
            "{}",
            paint(Style::Heading, options.color, &day_label(day.date))
        );
        if day.events.is_empty() {
            let _ = writeln!(
                out,
                "  {}",
                paint(Style::Muted, options.color, "Nothing scheduled")
            );
        }
        for event in day.events.iter().take(options.max_events) {
            render_event(&mut out, event, options);
        }
        let hidden = day.events.len().saturating_sub(options.max_events);
        if hidden > 0 {
            let _ = writeln!(
                out,
                "  {}",
                paint(Style::Muted, options.color, &format!("...and {hidden} more"))
            );
        }
        if !options.compact {
            out.push('\n');
        }
    }
    if let Some(focus) = &report.focus {
        out.push_str(&render_focus(focus, options));
    }
    out
}

/// Renders only the focus section.
pub fn render_focus(blocks: &[FocusReport], options: &TerminalOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", paint(Style::Heading, options.color, "Focus time"));
    if blocks.is_empty() {
        let _ = writeln!(
            out,
            "  {}",
            paint(Style::Muted, options.color, "No focus blocks left today")
        );
    }
    for block in blocks {
        let _ = writeln!(
            out,
            "  {}  {}",
            paint(Style::Time, options.color, &time_range(&block.start, &block.end)),
            paint(
                Style::Focus,
                options.color,
                &format_duration(chrono::Duration::minutes(block.minutes))
            )
        );
    }
    out
}
