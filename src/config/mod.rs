//! Configuration is a JSON document resolved from layers, lowest priority first:
//!  - built-in defaults,
//!  - the alternate file `$HOME/.daybrief.json`,
//!  - the primary file `$XDG_CONFIG_HOME/daybrief/config.json`,
//!  - the file passed with `--config`.
//!
//! Layers are deep merged, see [merge::deep_merge]. A broken layer is reported and skipped.

pub mod defaults;
pub mod merge;
pub mod resolver;
pub mod settings;
