//! Configuration CLI commands.
//!
//! Provides `config show`, `config init`, and `config path`.

use std::path::Path;

use cacheaside::config::ConfigFile;
use clap::Subcommand;

use super::common::{config_path, load_config};
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, explicit: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => run_show(explicit),
        ConfigCommands::Init { force } => run_init(explicit, force),
        ConfigCommands::Path => {
            println!("{}", config_path(explicit)?.display());
            Ok(())
        }
    }
}

fn run_show(explicit: Option<&Path>) -> Result<(), CliError> {
    let path = config_path(explicit)?;
    let config = load_config(explicit)?;

    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not found, using defaults)", path.display());
    }
    println!("{}", config);
    Ok(())
}

fn run_init(explicit: Option<&Path>, force: bool) -> Result<(), CliError> {
    let path = config_path(explicit)?;
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }

    ConfigFile::default().save_to(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        run(ConfigCommands::Init { force: false }, Some(&path)).unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[cache]\nprefix = keep\n").unwrap();

        let result = run(ConfigCommands::Init { force: false }, Some(&path));
        assert!(matches!(result, Err(CliError::Config(_))));

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.cache.prefix, "keep");
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[cache]\nprefix = old\n").unwrap();

        run(ConfigCommands::Init { force: true }, Some(&path)).unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.cache.prefix, ConfigFile::default().cache.prefix);
    }
}
