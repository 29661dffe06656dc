use std::{path::PathBuf, process::Stdio, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use crate::config::settings::{CalendarSettings, SourceSpec};

use super::event::{parse_events, RawEvent};

const CALENDAR_PLACEHOLDER: &str = "{calendar}";

/// Anything able to produce calendar events. Fetching is the only part of the dashboard that
/// touches the outside world.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarSource: Send + Sync {
    fn name(&self) -> String;

    async fn fetch(&self) -> Result<Vec<RawEvent>>;
}

/// Runs a program that prints events as JSON to stdout.
#[derive(Debug)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    /// `command` is the program followed by its arguments. Every `{calendar}` in the arguments is
    /// replaced with `calendar_id`.
    pub fn new(command: &[String], calendar_id: &str) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| anyhow!("Calendar command can't be empty"))?;
        Ok(Self {
            program: program.clone(),
            args: args
                .iter()
                .map(|arg| arg.replace(CALENDAR_PLACEHOLDER, calendar_id))
                .collect(),
        })
    }
}

#[async_trait]
impl CalendarSource for CommandSource {
    fn name(&self) -> String {
        self.program.clone()
    }

    #[instrument(skip(self), fields(program = %self.program))]
    async fn fetch(&self) -> Result<Vec<RawEvent>> {
        debug!("Running {} {:?}", self.program, self.args);
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = std::str::from_utf8(&output.stdout)
            .with_context(|| format!("{} printed invalid UTF-8", self.program))?;
        parse_events(stdout)
    }
}

/// Reads events from a JSON file.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CalendarSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<RawEvent>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        parse_events(&text)
    }
}

/// Builds the configured sources. Returns nothing when the calendar is disabled.
pub fn sources_from_settings(settings: &CalendarSettings) -> Result<Vec<Box<dyn CalendarSource>>> {
    if !settings.enabled {
        return Ok(Vec::new());
    }
    settings
        .sources
        .iter()
        .map(|spec| -> Result<Box<dyn CalendarSource>> {
            let source: Box<dyn CalendarSource> = match spec {
                SourceSpec::Command(command) => {
                    Box::new(CommandSource::new(command, &settings.id)?)
                }
                SourceSpec::File(path) => Box::new(FileSource::new(path.clone())),
            };
            Ok(source)
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub events: Vec<RawEvent>,
    pub warnings: Vec<String>,
}

/// Fetches all sources concurrently, each limited by `limit`. A failing source doesn't stop the
/// others, it's turned into a warning. Cancelled events are dropped.
pub async fn fetch_all(sources: &[Box<dyn CalendarSource>], limit: Duration) -> FetchOutcome {
    let fetches = sources.iter().map(|source| async move {
        let result = match tokio::time::timeout(limit, source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(anyhow!("timed out after {}s", limit.as_secs_f32())),
        };
        (source.name(), result)
    });

    let mut outcome = FetchOutcome::default();
    for (name, result) in join_all(fetches).await {
        match result {
            Ok(events) => {
                info!("Fetched {} events from {name}", events.len());
                outcome
                    .events
                    .extend(events.into_iter().filter(|event| !event.is_cancelled()));
            }
            Err(e) => {
                warn!("Calendar source {name} failed {e:?}");
                outcome
                    .warnings
                    .push(format!("Calendar source {name} failed: {e:#}"));
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use tempfile::tempdir;

    use crate::{
        calendar::event::{RawEvent, RawEventTime},
        config::settings::{CalendarSettings, SourceSpec},
        utils::logging::TEST_LOGGING,
    };

    use super::{
        fetch_all, sources_from_settings, CalendarSource, CommandSource, FileSource,
        MockCalendarSource,
    };

    fn raw(id: &str) -> RawEvent {
        RawEvent {
            id: Some(id.into()),
            summary: Some(id.into()),
            location: None,
            status: None,
            start: RawEventTime {
                date_time: Some("2024-04-05T10:00:00Z".into()),
                date: None,
            },
            end: None,
        }
    }

    fn mock(name: &'static str, result: fn() -> Result<Vec<RawEvent>>) -> Box<dyn CalendarSource> {
        let mut source = MockCalendarSource::new();
        source.expect_name().return_const(name.to_string());
        source.expect_fetch().times(1).returning(result);
        Box::new(source)
    }

    struct SlowSource;

    #[async_trait]
    impl CalendarSource for SlowSource {
        fn name(&self) -> String {
            "slow".into()
        }

        async fn fetch(&self) -> Result<Vec<RawEvent>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![raw("late")])
        }
    }

    #[tokio::test]
    async fn test_failing_source_becomes_warning() {
        *TEST_LOGGING;
        let sources = vec![
            mock("work", || Ok(vec![raw("a"), raw("b")])),
            mock("broken", || Err(anyhow!("no network"))),
            mock("home", || Ok(vec![raw("c")])),
        ];

        let outcome = fetch_all(&sources, Duration::from_secs(5)).await;
        let ids = outcome
            .events
            .iter()
            .map(|e| e.id.clone().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("broken"));
        assert!(outcome.warnings[0].contains("no network"));
    }

    #[tokio::test]
    async fn test_cancelled_events_are_dropped() {
        let sources = vec![mock("work", || {
            let mut cancelled = raw("cancelled");
            cancelled.status = Some("cancelled".into());
            Ok(vec![raw("kept"), cancelled])
        })];
        let outcome = fetch_all(&sources, Duration::from_secs(5)).await;
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].id.as_deref(), Some("kept"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out() {
        let sources: Vec<Box<dyn CalendarSource>> =
            vec![Box::new(SlowSource), mock("fast", || Ok(vec![raw("a")]))];
        let outcome = fetch_all(&sources, Duration::from_secs(10)).await;
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("timed out"));
    }

    #[tokio::test]
    async fn test_file_source() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("events.json");
        std::fs::write(&path, serde_json::to_string(&vec![raw("a")])?)?;

        let events = FileSource::new(path).fetch().await?;
        assert_eq!(events, vec![raw("a")]);

        let missing = FileSource::new(dir.path().join("missing.json")).fetch().await;
        assert!(missing.is_err());
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_source() -> Result<()> {
        let command = vec![
            "sh".to_string(),
            "-c".to_string(),
            r#"echo '[{"id": "{calendar}", "start": {"date": "2024-04-05"}}]'"#.to_string(),
        ];
        let events = CommandSource::new(&command, "work").unwrap().fetch().await?;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id.as_deref(), Some("work"));

        let failing = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo oops >&2; exit 3".to_string(),
        ];
        let error = CommandSource::new(&failing, "work")
            .unwrap()
            .fetch()
            .await
            .unwrap_err();
        assert!(error.to_string().contains("oops"));
        Ok(())
    }

    #[test]
    fn test_sources_from_settings() {
        let mut settings = CalendarSettings {
            enabled: true,
            id: "primary".into(),
            lookahead_days: 1,
            show_focus_time: true,
            work_start_hour: 9,
            work_end_hour: 18,
            min_focus_minutes: 30,
            max_focus_blocks: 3,
            count_in_progress_events: true,
            sources: vec![
                SourceSpec::Command(vec!["gcal-json".into(), "{calendar}".into()]),
                SourceSpec::File("/tmp/events.json".into()),
            ],
            timeout_seconds: 10,
        };

        let sources = sources_from_settings(&settings).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].name(), "gcal-json");
        assert_eq!(sources[1].name(), "/tmp/events.json");

        settings.sources.push(SourceSpec::Command(vec![]));
        assert!(sources_from_settings(&settings).is_err());

        settings.enabled = false;
        assert!(sources_from_settings(&settings).unwrap().is_empty());
    }
}
