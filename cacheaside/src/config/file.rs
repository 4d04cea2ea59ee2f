//! INI configuration file.
//!
//! Default location: `~/.cacheaside/config.ini`. Missing keys fall back to
//! defaults; unknown keys are ignored so older binaries can read newer files.
//!
//! ```ini
//! [cache]
//! backend = memory
//! prefix = user
//! expiration = 10m
//! write_back = fail_closed
//!
//! [memory]
//! max_size = 256MB
//!
//! [redis]
//! url = redis://127.0.0.1:6379
//!
//! [logging]
//! level = info
//! directory =
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::cached::{WriteBackPolicy, DEFAULT_EXPIRATION};

use super::units::{format_duration, format_size, parse_duration, parse_size};

/// Directory under the home directory holding the config file.
pub const CONFIG_DIR_NAME: &str = ".cacheaside";

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default memory backend capacity: 256 MB.
pub const DEFAULT_MEMORY_SIZE: u64 = 256 * 1024 * 1024;

/// Default Redis URL.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Errors from loading or saving the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The home directory could not be determined.
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Reading or writing the file failed.
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid INI.
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A key holds a value that cannot be used.
    #[error("Invalid value '{value}' for [{section}] {key}: expected {expected}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Which key-value backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// In-process moka cache.
    #[default]
    Memory,
    /// Redis server.
    Redis,
}

impl BackendKind {
    /// Parse a backend name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(BackendKind::Memory),
            "redis" => Some(BackendKind::Redis),
            _ => None,
        }
    }

    /// Config-file name of the backend.
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Redis => "redis",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `[cache]`, `[memory]` and `[redis]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Backend to connect.
    pub backend: BackendKind,

    /// Key prefix of the cached entity type.
    pub prefix: String,

    /// TTL of cached entries; zero means no expiration.
    pub expiration: Duration,

    /// Write-back failure policy.
    pub write_back: WriteBackPolicy,

    /// Capacity of the memory backend in bytes.
    pub memory_size: u64,

    /// Redis connection URL.
    pub redis_url: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            prefix: "entity".to_string(),
            expiration: DEFAULT_EXPIRATION,
            write_back: WriteBackPolicy::default(),
            memory_size: DEFAULT_MEMORY_SIZE,
            redis_url: DEFAULT_REDIS_URL.to_string(),
        }
    }
}

/// `[logging]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,

    /// Directory for daily-rolling log files; `None` logs to stderr only.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Default config file path, `~/.cacheaside/config.ini`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default path, using defaults if the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(err) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        })?;
        Self::from_ini(&ini)
    }

    /// Build from parsed INI data.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let cache = &mut config.cache;

        if let Some(section) = ini.section(Some("cache")) {
            if let Some(value) = section.get("backend") {
                cache.backend = BackendKind::parse(value).ok_or_else(|| invalid(
                    "cache",
                    "backend",
                    value,
                    "memory or redis",
                ))?;
            }
            if let Some(value) = section.get("prefix") {
                let value = value.trim();
                if value.is_empty() {
                    return Err(invalid("cache", "prefix", value, "a non-empty prefix"));
                }
                cache.prefix = value.to_string();
            }
            if let Some(value) = section.get("expiration") {
                cache.expiration = parse_duration(value).ok_or_else(|| invalid(
                    "cache",
                    "expiration",
                    value,
                    "a duration like 90s, 10m or 0",
                ))?;
            }
            if let Some(value) = section.get("write_back") {
                cache.write_back = WriteBackPolicy::parse(value).ok_or_else(|| invalid(
                    "cache",
                    "write_back",
                    value,
                    "fail_closed or fail_open",
                ))?;
            }
        }

        if let Some(section) = ini.section(Some("memory")) {
            if let Some(value) = section.get("max_size") {
                cache.memory_size = parse_size(value)
                    .filter(|size| *size > 0)
                    .ok_or_else(|| invalid("memory", "max_size", value, "a size like 256MB"))?;
            }
        }

        if let Some(section) = ini.section(Some("redis")) {
            if let Some(value) = section.get("url") {
                cache.redis_url = value.trim().to_string();
            }
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(value) = section.get("level") {
                config.logging.level = value.trim().to_string();
            }
            if let Some(value) = section.get("directory") {
                let value = value.trim();
                config.logging.directory = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
        }

        Ok(config)
    }

    /// Render as INI data, every key included.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some("cache"))
            .set("backend", self.cache.backend.name())
            .set("prefix", self.cache.prefix.as_str())
            .set("expiration", format_duration(self.cache.expiration))
            .set("write_back", self.cache.write_back.name());
        ini.with_section(Some("memory"))
            .set("max_size", format_size_key(self.cache.memory_size));
        ini.with_section(Some("redis"))
            .set("url", self.cache.redis_url.as_str());
        ini.with_section(Some("logging"))
            .set("level", self.logging.level.as_str())
            .set(
                "directory",
                self.logging
                    .directory
                    .as_ref()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_default(),
            );
        ini
    }

    /// Write to a path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        self.to_ini().write_to_file(path).map_err(io_err)
    }
}

/// Sizes are written without the decimal `format_size` produces for display,
/// so the file parses back to the same byte count.
fn format_size_key(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    if bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else {
        bytes.to_string()
    }
}

fn invalid(
    section: &'static str,
    key: &'static str,
    value: &str,
    expected: &'static str,
) -> ConfigError {
    ConfigError::InvalidValue {
        section,
        key,
        value: value.to_string(),
        expected,
    }
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[cache]")?;
        writeln!(f, "  backend     = {}", self.cache.backend)?;
        writeln!(f, "  prefix      = {}", self.cache.prefix)?;
        writeln!(f, "  expiration  = {}", format_duration(self.cache.expiration))?;
        writeln!(f, "  write_back  = {}", self.cache.write_back)?;
        writeln!(f, "[memory]")?;
        writeln!(f, "  max_size    = {}", format_size(self.cache.memory_size))?;
        writeln!(f, "[redis]")?;
        writeln!(f, "  url         = {}", self.cache.redis_url)?;
        writeln!(f, "[logging]")?;
        writeln!(f, "  level       = {}", self.logging.level)?;
        match &self.logging.directory {
            Some(dir) => write!(f, "  directory   = {}", dir.display()),
            None => write!(f, "  directory   = (stderr only)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(text: &str) -> Result<ConfigFile, ConfigError> {
        let ini = Ini::load_from_str(text).unwrap();
        ConfigFile::from_ini(&ini)
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.cache.expiration, Duration::from_secs(600));
        assert_eq!(config.cache.backend, BackendKind::Memory);
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            "[cache]\n\
             backend = redis\n\
             prefix = user\n\
             expiration = 0\n\
             write_back = fail_open\n\
             [memory]\n\
             max_size = 64MB\n\
             [redis]\n\
             url = redis://cache.internal:6380\n\
             [logging]\n\
             level = cacheaside=debug\n\
             directory = /var/log/cacheaside\n",
        )
        .unwrap();

        assert_eq!(config.cache.backend, BackendKind::Redis);
        assert_eq!(config.cache.prefix, "user");
        assert_eq!(config.cache.expiration, Duration::ZERO);
        assert_eq!(config.cache.write_back, WriteBackPolicy::FailOpen);
        assert_eq!(config.cache.memory_size, 64 * 1024 * 1024);
        assert_eq!(config.cache.redis_url, "redis://cache.internal:6380");
        assert_eq!(config.logging.level, "cacheaside=debug");
        assert_eq!(
            config.logging.directory,
            Some(PathBuf::from("/var/log/cacheaside"))
        );
    }

    #[test]
    fn test_invalid_backend() {
        let err = parse("[cache]\nbackend = memcached\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "backend",
                ..
            }
        ));
        assert!(err.to_string().contains("memcached"));
    }

    #[test]
    fn test_invalid_expiration() {
        let err = parse("[cache]\nexpiration = soon\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "expiration",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let err = parse("[cache]\nprefix =\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "prefix", .. }));
    }

    #[test]
    fn test_zero_memory_size_rejected() {
        let err = parse("[memory]\nmax_size = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "max_size",
                ..
            }
        ));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = ConfigFile::default();
        config.cache.backend = BackendKind::Redis;
        config.cache.prefix = "order".to_string();
        config.cache.expiration = Duration::from_secs(90);
        config.cache.write_back = WriteBackPolicy::FailOpen;
        config.logging.directory = Some(dir.path().join("logs"));

        config.save_to(&path).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_display_mentions_backend() {
        let text = ConfigFile::default().to_string();
        assert!(text.contains("backend     = memory"));
        assert!(text.contains("256.0 MB"));
    }
}
