use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::utils::dir::{alternate_config_path, primary_config_path};

use super::{defaults::builtin_defaults, merge::deep_merge, settings::Settings};

/// Where a configuration layer comes from. Ordered from lowest to highest priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerOrigin {
    Builtin,
    Alternate,
    Primary,
    Explicit,
}

impl Display for LayerOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            LayerOrigin::Builtin => "builtin",
            LayerOrigin::Alternate => "alternate",
            LayerOrigin::Primary => "primary",
            LayerOrigin::Explicit => "explicit",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerContents {
    Missing,
    Unreadable(String),
    Text(String),
}

/// An override document as found on disk, before parsing.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub origin: LayerOrigin,
    pub path: PathBuf,
    pub contents: LayerContents,
}

impl ConfigLayer {
    /// Reads the layer at `path`. A missing file isn't an error, it's an empty layer.
    pub fn read(origin: LayerOrigin, path: PathBuf) -> Self {
        let contents = match std::fs::read_to_string(&path) {
            Ok(text) => LayerContents::Text(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => LayerContents::Missing,
            Err(e) => LayerContents::Unreadable(e.to_string()),
        };
        Self {
            origin,
            path,
            contents,
        }
    }
}

/// A layer that contributed to the resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedLayer {
    pub origin: LayerOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: Value,
    /// Layers in the order they were merged.
    pub applied: Vec<AppliedLayer>,
    pub warnings: Vec<String>,
}

impl ResolvedConfig {
    pub fn settings(&self) -> Result<Settings> {
        Settings::from_document(&self.config)
    }

    /// Reads a boolean by JSON pointer without requiring the whole document to be valid.
    pub fn flag(&self, pointer: &str) -> Option<bool> {
        self.config.pointer(pointer).and_then(Value::as_bool)
    }
}

/// Where the user's override files live. The explicit `--config` path is passed separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLocations {
    pub alternate: Option<PathBuf>,
    pub primary: Option<PathBuf>,
}

impl ConfigLocations {
    /// Locations derived from the environment: `$HOME/.daybrief.json` and the XDG config dir.
    pub fn user() -> Self {
        Self {
            alternate: alternate_config_path(),
            primary: primary_config_path(),
        }
    }

    /// Candidate override files, lowest priority first.
    pub fn candidates(&self, explicit: Option<&Path>) -> Vec<(LayerOrigin, PathBuf)> {
        [
            (LayerOrigin::Alternate, self.alternate.clone()),
            (LayerOrigin::Primary, self.primary.clone()),
            (LayerOrigin::Explicit, explicit.map(Path::to_path_buf)),
        ]
        .into_iter()
        .filter_map(|(origin, path)| path.map(|path| (origin, path)))
        .collect()
    }

    /// Loads every candidate layer from disk and resolves them onto the built-in defaults.
    pub fn load(&self, explicit: Option<&Path>) -> ResolvedConfig {
        let layers = self
            .candidates(explicit)
            .into_iter()
            .map(|(origin, path)| ConfigLayer::read(origin, path))
            .collect::<Vec<_>>();

        let mut resolved = resolve(builtin_defaults(), layers);
        if let Some(path) = explicit {
            if !path.exists() {
                warn!("Explicit configuration {} doesn't exist", path.display());
                resolved.warnings.push(format!(
                    "Configuration file {} doesn't exist, using remaining layers",
                    path.display()
                ));
            }
        }
        resolved
    }
}

/// Merges `layers` (lowest priority first) on top of `defaults`. Layers that can't be read or
/// parsed are skipped with a warning.
#[instrument(skip_all)]
pub fn resolve(defaults: Value, layers: Vec<ConfigLayer>) -> ResolvedConfig {
    let mut config = defaults;
    let mut applied = vec![AppliedLayer {
        origin: LayerOrigin::Builtin,
        path: None,
    }];
    let mut warnings = Vec::new();

    for layer in layers {
        match parse_layer(&layer) {
            Ok(Some(document)) => {
                info!("Applying {} configuration {}", layer.origin, layer.path.display());
                config = deep_merge(config, document);
                applied.push(AppliedLayer {
                    origin: layer.origin,
                    path: Some(layer.path),
                });
            }
            Ok(None) => {
                debug!("No {} configuration at {}", layer.origin, layer.path.display());
            }
            Err(e) => {
                warn!("Skipping configuration {}: {e:?}", layer.path.display());
                warnings.push(format!(
                    "Ignoring configuration {}: {e:#}",
                    layer.path.display()
                ));
            }
        }
    }

    ResolvedConfig {
        config,
        applied,
        warnings,
    }
}

fn parse_layer(layer: &ConfigLayer) -> Result<Option<Value>> {
    match &layer.contents {
        LayerContents::Missing => Ok(None),
        LayerContents::Unreadable(e) => bail!("couldn't read file: {e}"),
        LayerContents::Text(text) if text.trim().is_empty() => Ok(None),
        LayerContents::Text(text) => parse_document(text).map(Some),
    }
}

fn parse_document(text: &str) -> Result<Value> {
    let document: Value = serde_json::from_str(text).context("invalid JSON")?;
    if !document.is_object() {
        bail!("top-level value must be an object");
    }
    Ok(document)
}

/// Writes `config` as pretty JSON. Parent directories are created. An existing file is only
/// replaced when `force` is set.
pub fn write_config(config: &Value, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite it",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut text = serde_json::to_string_pretty(config)?;
    text.push('\n');
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote configuration to {}", path.display());
    Ok(())
}
