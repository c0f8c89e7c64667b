//! housechores server binary.
//!
//! Reads `housechores.toml` (or the path given with `--config`) layered under
//! `HOUSECHORES_*` environment variables, opens the SQLite store, and serves
//! the ledger over HTTP. An empty store is set up on the first visit to
//! `/login`.

use std::{
  fs::OpenOptions,
  path::{Path, PathBuf},
  sync::Mutex,
};

use anyhow::Context as _;
use chores_store_sqlite::SqliteStore;
use chores_web::{AppState, ServerConfig};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Housechores ledger server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "housechores.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("HOUSECHORES"))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  init_tracing(server_cfg.log_file.as_deref())?;

  server_cfg.store_path = expand_tilde(&server_cfg.store_path);
  server_cfg.export_dir = expand_tilde(&server_cfg.export_dir);
  if server_cfg.session_secret.is_none() {
    tracing::warn!("no session_secret configured, sessions end on restart");
  }

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = chores_web::router(AppState::new(store, server_cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Log to stderr, or to `log_file` without colours when one is configured.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();

  match log_file {
    Some(path) => {
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {path:?}"))?;
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    }
    None => tracing_subscriber::fmt().with_env_filter(filter).init(),
  }
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
