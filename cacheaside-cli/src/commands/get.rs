//! `get`: resolve ids through the cache-aside layer.
//!
//! The authoritative source is a JSON file holding an array of objects, each
//! with an integer `id`. Found entities are printed one JSON document per
//! line; a per-round summary goes to stderr.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cacheaside::app::CacheAsideApp;
use cacheaside::config::ConfigFile;
use cacheaside::Repository;
use clap::Args;
use serde_json::Value;
use tracing::debug;

use crate::error::CliError;

/// Arguments for `get`.
#[derive(Debug, Args)]
pub struct GetArgs {
    /// JSON file with an array of entities, each carrying an integer "id"
    #[arg(long, short)]
    pub source: PathBuf,

    /// Repeat the lookup this many times in one process
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub rounds: u32,

    /// Entity ids to resolve
    #[arg(required = true, allow_negative_numbers = true)]
    pub ids: Vec<i64>,
}

/// Entities loaded from a JSON file, counting how many were fetched.
#[derive(Debug)]
pub struct JsonFileRepository {
    entities: HashMap<i64, Value>,
    fetched: AtomicUsize,
}

impl JsonFileRepository {
    /// Load and index a JSON array by `id`.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let source_err = |message: String| CliError::Source {
            path: path.to_path_buf(),
            message,
        };

        let text = fs::read_to_string(path).map_err(|e| source_err(e.to_string()))?;
        let values: Vec<Value> =
            serde_json::from_str(&text).map_err(|e| source_err(e.to_string()))?;

        let mut entities = HashMap::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            let id = value
                .get("id")
                .and_then(Value::as_i64)
                .ok_or_else(|| source_err(format!("entry {} has no integer 'id'", index)))?;
            if entities.insert(id, value).is_some() {
                return Err(source_err(format!("duplicate id {}", id)));
            }
        }

        Ok(Self {
            entities,
            fetched: AtomicUsize::new(0),
        })
    }

    /// Number of entities in the file.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entities fetched since the last call.
    pub fn take_fetched(&self) -> usize {
        self.fetched.swap(0, Ordering::Relaxed)
    }

    fn lookup(&self, id: i64) -> Option<Value> {
        let found = self.entities.get(&id).cloned();
        if found.is_some() {
            self.fetched.fetch_add(1, Ordering::Relaxed);
        }
        found
    }
}

impl Repository<Value> for JsonFileRepository {
    type Error = std::convert::Infallible;

    async fn find_one(&self, id: i64) -> Result<Option<Value>, Self::Error> {
        Ok(self.lookup(id))
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<Value>, Self::Error> {
        Ok(ids.iter().filter_map(|id| self.lookup(*id)).collect())
    }
}

/// Ids are validated on load, so every entity has one.
fn entity_id(entity: &Value) -> i64 {
    entity.get("id").and_then(Value::as_i64).unwrap_or_default()
}

/// Run `get`.
pub async fn run(args: GetArgs, config: ConfigFile) -> Result<(), CliError> {
    let source = Arc::new(JsonFileRepository::load(&args.source)?);
    debug!(
        path = %args.source.display(),
        entities = source.entity_count(),
        "Loaded source file"
    );
    let app = CacheAsideApp::start(config).await?;
    let entities = app.cached(Arc::clone(&source), entity_id)?;

    for round in 1..=args.rounds {
        let found: Vec<Value> = match args.ids.as_slice() {
            [id] => entities.find_one(*id).await?.into_iter().collect(),
            ids => entities.find_many(ids).await?,
        };

        eprintln!(
            "round {}: {} of {} found, {} fetched from {}",
            round,
            found.len(),
            args.ids.len(),
            source.take_fetched(),
            args.source.display()
        );

        if round == args.rounds {
            for entity in &found {
                println!("{}", entity);
            }
        }
    }

    Ok(())
}
