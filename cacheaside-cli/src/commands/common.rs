//! Common utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use cacheaside::config::ConfigFile;

use crate::error::CliError;

/// Resolve the config file path: `--config` wins over the default location.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, CliError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(ConfigFile::default_path()?),
    }
}

/// Load the configuration.
///
/// An explicit `--config` file must exist; the default file is optional and
/// falls back to built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<ConfigFile, CliError> {
    match explicit {
        Some(path) => Ok(ConfigFile::load_from(path)?),
        None => Ok(ConfigFile::load()?),
    }
}
