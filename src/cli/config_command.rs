use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Subcommand;
use serde_json::json;

use crate::{
    config::resolver::{write_config, ConfigLocations, ResolvedConfig},
    report::terminal::{paint, Style},
};

use super::dashboard::OutputOptions;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    #[command(about = "Print the effective configuration and the files it was built from")]
    Show,
    #[command(about = "List configuration files in the order they are merged")]
    Path,
    #[command(about = "Write the effective configuration to a file")]
    Init {
        #[arg(long, help = "Overwrite the file if it exists")]
        force: bool,
        #[arg(
            long,
            help = "Destination. Defaults to --config or $XDG_CONFIG_HOME/daybrief/config.json"
        )]
        path: Option<PathBuf>,
    },
}

pub fn process_config_command(
    command: ConfigCommand,
    resolved: &ResolvedConfig,
    locations: &ConfigLocations,
    explicit: Option<&Path>,
    output: OutputOptions,
) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            if output.json {
                let document = json!({
                    "layers": resolved.applied,
                    "config": resolved.config,
                });
                println!("{}", serde_json::to_string_pretty(&document)?);
            } else {
                println!("{}", paint(Style::Heading, output.color, "Layers"));
                for layer in &resolved.applied {
                    match &layer.path {
                        Some(path) => println!("  {:<10} {}", layer.origin, path.display()),
                        None => println!("  {}", layer.origin),
                    }
                }
                println!();
                println!("{}", serde_json::to_string_pretty(&resolved.config)?);
            }
            Ok(())
        }
        ConfigCommand::Path => {
            for (origin, path) in locations.candidates(explicit) {
                let state = if path.exists() { "found" } else { "missing" };
                println!(
                    "{:<10} {}  {}",
                    origin,
                    path.display(),
                    paint(Style::Muted, output.color, state)
                );
            }
            Ok(())
        }
        ConfigCommand::Init { force, path } => {
            let target = path
                .or_else(|| explicit.map(Path::to_path_buf))
                .or_else(|| locations.primary.clone())
                .ok_or_else(|| anyhow!("No configuration directory found, pass --path"))?;
            write_config(&resolved.config, &target, force)?;
            println!("Wrote configuration to {}", target.display());
            Ok(())
        }
    }
}
