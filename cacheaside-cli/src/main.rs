//! cacheaside CLI - exercise and inspect a cache-aside layer
//!
//! ```text
//! cacheaside get --source users.json 1 2 3 --rounds 2
//! cacheaside peek user:1 user:2
//! cacheaside config show
//! ```

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::get::GetArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "cacheaside", version, about = "Read-through cache-aside layer")]
struct Cli {
    /// Config file (default: ~/.cacheaside/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve entity ids through the cache
    Get(GetArgs),

    /// Print raw cache entries from a shared backend (Redis)
    ///
    /// The memory backend is private to each process, so peeking it is
    /// refused.
    Peek {
        /// Cache keys, e.g. user:1
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let explicit = cli.config.as_deref();

    match cli.command {
        Commands::Config { command } => commands::config::run(command, explicit),
        Commands::Get(args) => {
            let config = commands::common::load_config(explicit)?;
            let _guard = cacheaside::log::init(&config.logging, cli.verbose)?;
            commands::get::run(args, config).await
        }
        Commands::Peek { keys } => {
            let config = commands::common::load_config(explicit)?;
            let _guard = cacheaside::log::init(&config.logging, cli.verbose)?;
            commands::peek::run(keys, config).await
        }
    }
}
