//! `peek`: read raw entries from the configured backend.
//!
//! Only meaningful against a shared backend such as Redis: a memory backend
//! lives inside one process, so a fresh one is always empty.

use cacheaside::app::connect_store;
use cacheaside::config::{BackendKind, CacheSettings, ConfigFile};

use crate::error::CliError;

/// Run `peek` for the given keys, printing each value or `(absent)`.
pub async fn run(keys: Vec<String>, config: ConfigFile) -> Result<(), CliError> {
    ensure_shared_backend(&config.cache)?;
    let store = connect_store(&config.cache).await?;
    let values = store.get_many(&keys).await?;

    for (key, value) in keys.iter().zip(values.iter()) {
        println!("{} = {}", key, render(value.as_deref()));
    }
    Ok(())
}

fn ensure_shared_backend(settings: &CacheSettings) -> Result<(), CliError> {
    match settings.backend {
        BackendKind::Memory => Err(CliError::Config(
            "peek needs a shared backend; the memory backend is empty in every new process. \
             Set backend = redis in [cache]."
                .to_string(),
        )),
        BackendKind::Redis => Ok(()),
    }
}

fn render(value: Option<&[u8]>) -> String {
    match value {
        Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        None => "(absent)".to_string(),
    }
}
