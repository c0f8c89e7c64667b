//! HTTP layer for Housechores.
//!
//! Exposes an axum [`Router`] serving the household ledger backed by any
//! [`ChoreStore`]. Every route except `/login` and `/static/` sits behind the
//! session gate in [`gate`].

pub mod auth;
pub mod error;
pub mod export;
pub mod forms;
pub mod gate;
pub mod handlers;
pub mod policy;
pub mod session;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  middleware::from_fn_with_state,
  routing::{get, post},
};
use chores_core::store::ChoreStore;
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, trace::TraceLayer};

use handlers::{actions, admin, chores, login, persons, views};
use session::SessionStore;

/// Recorded in meta as `appversion` when a store is created.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `housechores.toml` and
/// `HOUSECHORES_*` environment variables. Every key has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// Keys session token digests. A random key is used when unset.
  pub session_secret:   Option<String>,
  pub export_dir:       PathBuf,
  pub static_dir:       PathBuf,
  pub log_file:         Option<PathBuf>,
  /// Idle expiry for sessions; sessions live until logout when unset.
  pub session_ttl_secs: Option<u64>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_string(),
      port:             5000,
      store_path:       PathBuf::from("housechores.db"),
      session_secret:   None,
      export_dir:       PathBuf::from("exports"),
      static_dir:       PathBuf::from("static"),
      log_file:         None,
      session_ttl_secs: None,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: ChoreStore> {
  pub store:     Arc<S>,
  pub config:    Arc<ServerConfig>,
  pub sessions:  Arc<SessionStore>,
  /// Held while first-use setup checks and initialises the store.
  pub bootstrap: Arc<Mutex<()>>,
}

impl<S: ChoreStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    let sessions = SessionStore::new(
      config.session_secret.as_deref(),
      config.session_ttl_secs.map(Duration::from_secs),
    );
    Self {
      store:     Arc::new(store),
      config:    Arc::new(config),
      sessions:  Arc::new(sessions),
      bootstrap: Arc::new(Mutex::new(())),
    }
  }
}

impl<S: ChoreStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      config:    Arc::clone(&self.config),
      sessions:  Arc::clone(&self.sessions),
      bootstrap: Arc::clone(&self.bootstrap),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the Housechores server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ChoreStore + 'static,
{
  let assets = ServeDir::new(&state.config.static_dir);

  Router::new()
    .route("/",                     get(views::landing::<S>))
    .route("/login",                get(login::screen::<S>).post(login::submit::<S>))
    .route("/logout",               get(login::logout::<S>))
    .route("/overview",             get(views::overview::<S>))
    .route("/overview/{page}",      get(views::overview_page::<S>))
    .route("/chores_lastaction",    get(views::chores_last_action::<S>))
    .route("/statistics",           get(views::statistics::<S>))
    .route("/new_action",           post(actions::create::<S>))
    .route("/edit_action",          post(actions::edit::<S>))
    .route("/delete_action/{id}",   get(actions::delete::<S>))
    .route("/copy_to_today/{id}",   get(actions::copy_to_today::<S>))
    .route("/new_from_chore/{id}",  get(actions::new_from_chore::<S>))
    .route("/chores",               get(views::chores::<S>))
    .route("/new_chore",            post(chores::create::<S>))
    .route("/edit_chore",           post(chores::edit::<S>))
    .route("/delete_chore/{id}",    get(chores::delete::<S>))
    .route("/persons",              get(views::persons::<S>))
    .route("/new_person",           post(persons::create::<S>))
    .route("/edit_person",          post(persons::edit::<S>))
    .route("/delete_person/{id}",   get(persons::delete::<S>))
    .route("/initdb",               get(admin::initdb::<S>))
    .route("/filldbsampledata",     get(admin::sample_data::<S>))
    .route("/settings",             post(admin::settings::<S>))
    .route("/export",               get(admin::export::<S>))
    .route("/download_export",      get(admin::download_export::<S>))
    .nest_service("/static", assets)
    .layer(from_fn_with_state(state.clone(), gate::gate::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
