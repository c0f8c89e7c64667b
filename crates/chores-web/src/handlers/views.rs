//! Read-only views. Open to every logged-in person.

use axum::{
  extract::{Path, State},
  response::Response,
};
use chores_core::{
  model::{Chore, Person, Role},
  store::ChoreStore,
  view::{ChoreLastAction, OverviewRow, Page, Statistics},
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::debug;

use super::render;
use crate::{AppState, error::Error, gate::RequestContext};

pub const GREETING: &str = "Hello there!";

#[derive(Debug, Serialize)]
pub struct Landing {
  pub greeting: &'static str,
}

/// The overview page plus what the "new action" form needs.
#[derive(Debug, Serialize)]
pub struct Overview {
  pub page:    Page<OverviewRow>,
  pub chores:  Vec<Chore>,
  pub persons: Vec<Person>,
  pub today:   NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct Persons {
  pub persons: Vec<Person>,
  pub roles:   Vec<Role>,
}

pub async fn landing<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
) -> Response {
  render(&state.sessions, &ctx, Landing { greeting: GREETING })
}

pub async fn overview<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
) -> Result<Response, Error> {
  show_overview(&state, &ctx, 1).await
}

/// Unparseable page numbers fall back to the first page.
pub async fn overview_page<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Path(page): Path<String>,
) -> Result<Response, Error> {
  let page = page.parse().unwrap_or(1);
  show_overview(&state, &ctx, page).await
}

async fn show_overview<S: ChoreStore>(
  state: &AppState<S>,
  ctx: &RequestContext,
  page: usize,
) -> Result<Response, Error> {
  debug!(person_id = ctx.person_id, page, "overview");
  let store = &state.store;
  let data = Overview {
    page:    store.overview_page(page).await.map_err(Error::from_store)?,
    chores:  store.list_chores().await.map_err(Error::from_store)?,
    persons: store.list_persons().await.map_err(Error::from_store)?,
    today:   Local::now().date_naive(),
  };
  Ok(render(&state.sessions, ctx, data))
}

pub async fn chores_last_action<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
) -> Result<Response, Error> {
  debug!(person_id = ctx.person_id, "chores last action");
  let rows: Vec<ChoreLastAction> = state
    .store
    .chores_last_action()
    .await
    .map_err(Error::from_store)?;
  Ok(render(&state.sessions, &ctx, rows))
}

pub async fn statistics<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
) -> Result<Response, Error> {
  debug!(person_id = ctx.person_id, "statistics");
  let stats: Statistics =
    state.store.statistics().await.map_err(Error::from_store)?;
  Ok(render(&state.sessions, &ctx, stats))
}

pub async fn chores<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
) -> Result<Response, Error> {
  let chores = state.store.list_chores().await.map_err(Error::from_store)?;
  Ok(render(&state.sessions, &ctx, chores))
}

pub async fn persons<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
) -> Result<Response, Error> {
  let data = Persons {
    persons: state.store.list_persons().await.map_err(Error::from_store)?,
    roles:   state.store.list_roles().await.map_err(Error::from_store)?,
  };
  Ok(render(&state.sessions, &ctx, data))
}
