pub mod config_command;
pub mod dashboard;

use std::{fmt::Display, path::PathBuf};

use anyhow::Result;
use chrono::{Local, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use config_command::{process_config_command, ConfigCommand};
use dashboard::{process_dashboard_command, DashboardCommand, DashboardMode, OutputOptions};
use tracing::level_filters::LevelFilter;

use crate::{
    config::resolver::{ConfigLocations, ResolvedConfig},
    report::terminal::{paint, Style},
    utils::{
        clock::{Clock, DefaultClock, FixedClock},
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "daybrief", version, long_about = None)]
#[command(about = "Daily agenda and focus time in your terminal", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Configuration file. Takes priority over $XDG_CONFIG_HOME/daybrief/config.json and ~/.daybrief.json"
    )]
    config: Option<PathBuf>,
    #[arg(long = "no-color", global = true, help = "Disable colored output")]
    no_color: bool,
    #[arg(long, global = true, help = "Print JSON instead of text")]
    json: bool,
    #[arg(
        long,
        global = true,
        help = "Pretend the current moment is different. Examples are \"tomorrow 8am\", \"12:00 16/03/2025\""
    )]
    at: Option<String>,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Show the agenda and focus time. This is the default command")]
    Show {
        #[command(flatten)]
        command: DashboardCommand,
    },
    #[command(about = "Show only the focus time left today")]
    Focus {
        #[command(flatten)]
        command: DashboardCommand,
    },
    #[command(about = "Inspect or write the configuration")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(
        CLI_PREFIX,
        &create_application_default_path()?.join("logs"),
        logging_level,
        args.log,
    )?;

    let clock = select_clock(args.at, args.date_style)?;
    let locations = ConfigLocations::user();
    let resolved = locations.load(args.config.as_deref());
    let output = OutputOptions {
        json: args.json,
        color: color_enabled(
            &resolved,
            args.no_color,
            std::env::var_os("NO_COLOR").is_some(),
        ),
    };
    print_warnings(&resolved.warnings, output.color);

    let (command, mode) = match args.commands {
        Some(Commands::Config { command }) => {
            return process_config_command(
                command,
                &resolved,
                &locations,
                args.config.as_deref(),
                output,
            );
        }
        Some(Commands::Focus { command }) => (command, DashboardMode::FocusOnly),
        Some(Commands::Show { command }) => (command, DashboardMode::Full),
        None => (DashboardCommand::default(), DashboardMode::Full),
    };

    let warnings =
        process_dashboard_command(command, mode, &resolved, clock.as_ref(), output).await?;
    print_warnings(&warnings, output.color);
    Ok(())
}

/// `--at` freezes the clock at the parsed moment.
fn select_clock(at: Option<String>, date_style: DateStyle) -> Result<Box<dyn Clock>> {
    let Some(at) = at else {
        return Ok(Box::new(DefaultClock));
    };
    match parse_date_string(&at, Local::now(), date_style.into()) {
        Ok(moment) => Ok(Box::new(FixedClock::new(moment.with_timezone(&Utc)))),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate --at {e}"),
            )
            .into()),
    }
}

/// Colour is on unless the configuration, `--no-color` or `NO_COLOR` turns it off.
fn color_enabled(resolved: &ResolvedConfig, no_color: bool, no_color_env: bool) -> bool {
    !no_color && !no_color_env && resolved.flag("/display/color").unwrap_or(true)
}

fn print_warnings(warnings: &[String], color: bool) {
    for warning in warnings {
        eprintln!("{}", paint(Style::Warning, color, &format!("warning: {warning}")));
    }
}
