use std::{env, io, path::PathBuf};

use anyhow::{anyhow, Result};

pub const APPLICATION_DIR: &str = "daybrief";
pub const CONFIG_FILE: &str = "config.json";
pub const ALTERNATE_CONFIG_FILE: &str = ".daybrief.json";

/// Resolves a per-user base directory. On Linux and macOS this is `$<xdg_var>` when it's an
/// absolute path, otherwise `$HOME/<home_fallback>`. On Windows it's always `%APPDATA%`.
fn user_base_dir(xdg_var: &str, home_fallback: &str) -> Option<PathBuf> {
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            let _ = (xdg_var, home_fallback);
            env::var_os("APPDATA").map(PathBuf::from)
        } else {
            env::var_os(xdg_var)
                .map(PathBuf::from)
                .filter(|path| path.is_absolute())
                .or_else(|| home_dir().map(|home| home.join(home_fallback)))
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

/// Directory holding logs. Created if it doesn't exist yet.
pub fn create_application_default_path() -> Result<PathBuf> {
    let mut path = user_base_dir("XDG_STATE_HOME", ".local/state")
        .ok_or_else(|| anyhow!("Couldn't find neither XDG_STATE_HOME nor HOME"))?;
    path.push(APPLICATION_DIR);

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

/// Primary configuration file location. Nothing is created here.
pub fn primary_config_path() -> Option<PathBuf> {
    user_base_dir("XDG_CONFIG_HOME", ".config")
        .map(|base| base.join(APPLICATION_DIR).join(CONFIG_FILE))
}

/// Alternate configuration file, `$HOME/.daybrief.json`.
pub fn alternate_config_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(ALTERNATE_CONFIG_FILE))
}
