use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use tracing::{info, warn};

use crate::{
    calendar::{
        agenda::Agenda,
        focus::compute_focus_blocks,
        source::{fetch_all, sources_from_settings, CalendarSource, FetchOutcome, FileSource},
    },
    config::{resolver::ResolvedConfig, settings::Settings},
    report::{
        terminal::{render, render_focus, TerminalOptions},
        Report,
    },
    utils::clock::Clock,
};

#[derive(Debug, Default, Clone, clap::Args)]
pub struct DashboardCommand {
    #[arg(
        long = "events",
        help = "JSON file with events, used in addition to the configured calendar sources. Can be repeated"
    )]
    event_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardMode {
    Full,
    FocusOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub color: bool,
}

/// Command to process `show` and `focus`. Prints the report and returns warnings collected on the
/// way, so the caller can show them after the report.
pub async fn process_dashboard_command(
    DashboardCommand { event_files }: DashboardCommand,
    mode: DashboardMode,
    resolved: &ResolvedConfig,
    clock: &dyn Clock,
    output: OutputOptions,
) -> Result<Vec<String>> {
    let settings = resolved.settings()?;

    let mut sources = sources_from_settings(&settings.calendar)?;
    sources.extend(
        event_files
            .into_iter()
            .map(|path| Box::new(FileSource::new(path)) as Box<dyn CalendarSource>),
    );

    let now = clock.time().with_timezone(&Local);
    let report = build_report(&settings, &sources, &now, mode).await?;

    if output.json {
        println!("{}", report.to_json()?);
    } else {
        let options = TerminalOptions {
            color: output.color,
            compact: settings.display.compact,
            max_events: settings.display.max_events,
        };
        let text = match mode {
            DashboardMode::Full => render(&report, &options),
            DashboardMode::FocusOnly => {
                render_focus(report.focus.as_deref().unwrap_or_default(), &options)
            }
        };
        print!("{text}");
    }

    Ok(report.warnings)
}

/// Fetches events and computes everything shown on the dashboard for the moment `now`.
pub async fn build_report<Tz: TimeZone>(
    settings: &Settings,
    sources: &[Box<dyn CalendarSource>],
    now: &DateTime<Tz>,
    mode: DashboardMode,
) -> Result<Report> {
    let focus_options = settings.calendar.focus_options()?;

    let mut warnings = Vec::new();
    if !settings.calendar.enabled {
        info!("Calendar is disabled");
    } else if sources.is_empty() {
        warnings.push(
            "No calendar sources configured. Add calendar.sources to the configuration or pass --events"
                .to_string(),
        );
    }

    let FetchOutcome {
        events: raw_events,
        warnings: fetch_warnings,
    } = fetch_all(sources, settings.calendar.timeout()).await;
    warnings.extend(fetch_warnings);

    let tz = now.timezone();
    let mut events = Vec::with_capacity(raw_events.len());
    for raw in raw_events {
        match raw.resolve(&tz) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!("Skipping event {e:?}");
                warnings.push(format!("Skipping event: {e:#}"));
            }
        }
    }

    let today = now.date_naive();
    let agenda = Agenda::build(events, today, settings.calendar.horizon_days(), tz);

    let show_focus = mode == DashboardMode::FocusOnly || settings.calendar.show_focus_time;
    let focus = show_focus
        .then(|| compute_focus_blocks(&agenda.timed_events_on(today), now, &focus_options));

    Ok(Report::new(now, &agenda, focus.as_deref(), warnings))
}
