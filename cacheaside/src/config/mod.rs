//! Configuration file support.
//!
//! Settings live in an INI file, by default `~/.cacheaside/config.ini`.
//! See [`ConfigFile`] for the layout.

mod file;
mod units;

pub use file::{
    BackendKind, CacheSettings, ConfigError, ConfigFile, LoggingSettings, CONFIG_DIR_NAME,
    CONFIG_FILE_NAME, DEFAULT_MEMORY_SIZE, DEFAULT_REDIS_URL,
};
pub use units::{format_duration, format_size, parse_duration, parse_size};
