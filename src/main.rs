mod app;
mod cache;
mod commands;
mod config;
mod content;
mod logging;
mod remote;
mod session;
mod sync;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

use cache::{MemoryStore, SqliteStore};
use config::CacheBackend;

#[derive(Parser, Debug)]
#[command(name = "studiosync")]
#[command(about = "Offline-first content client for the studio site")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/studiosync/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: app::Action,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init()?;

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let namespace = config.cache.namespace.clone();

  // Initialize and run the app
  match config.cache.backend {
    CacheBackend::Sqlite => {
      let store = SqliteStore::open(config.cache.path.as_deref(), &namespace)?;
      app::App::new(config, store)?.run(args.command).await
    }
    CacheBackend::Memory => {
      let store = MemoryStore::new(&namespace);
      app::App::new(config, store)?.run(args.command).await
    }
  }
}
