//! Ledger mutations. Any logged-in person may record, edit, delete and copy
//! actions, including other people's.

use axum::{
  Form,
  extract::{Path, State},
  response::Response,
};
use chores_core::{model::NewAction, policy::Operation, store::ChoreStore};
use chrono::Local;
use tracing::info;

use super::finish;
use crate::{
  AppState,
  error::Error,
  forms::{EditActionForm, NewActionForm, path_id},
  gate::RequestContext,
  policy::authorize,
  session::Notice,
};

const BACK: &str = "/overview";

pub async fn create<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Form(form): Form<NewActionForm>,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::RecordAction).await?;
    let input = form.validate()?;
    let action = state
      .store
      .record_action(input)
      .await
      .map_err(Error::from_store)?;
    info!(person_id = ctx.person_id, action_id = action.action_id, "action recorded");
    Ok::<_, Error>(Notice::success("New action added"))
  }
  .await;
  finish(&state.sessions, &ctx, BACK, outcome)
}

pub async fn edit<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Form(form): Form<EditActionForm>,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::EditAction).await?;
    let edit = form.validate()?;
    let action = state
      .store
      .edit_action(edit)
      .await
      .map_err(Error::from_store)?;
    info!(person_id = ctx.person_id, action_id = action.action_id, "action updated");
    Ok::<_, Error>(Notice::success("Updated action"))
  }
  .await;
  finish(&state.sessions, &ctx, BACK, outcome)
}

/// Deleting an id that is already gone reads as success.
pub async fn delete<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Path(id): Path<String>,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::DeleteAction).await?;
    let id = path_id(id)?;
    let removed = state
      .store
      .delete_action(id)
      .await
      .map_err(Error::from_store)?;
    info!(person_id = ctx.person_id, action_id = id, removed, "action removed");
    Ok::<_, Error>(Notice::success("Action removed"))
  }
  .await;
  finish(&state.sessions, &ctx, BACK, outcome)
}

/// Record the source action's chore again, for the requester, today.
pub async fn copy_to_today<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Path(id): Path<String>,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::CopyToToday).await?;
    let source = path_id(id)?;
    let today = Local::now().date_naive();
    let copy = state
      .store
      .copy_action(source, ctx.person_id, today)
      .await
      .map_err(Error::from_store)?;
    info!(
      person_id = ctx.person_id,
      source,
      action_id = copy.action_id,
      "action copied to today"
    );
    Ok::<_, Error>(Notice::success("Action copied to today"))
  }
  .await;
  finish(&state.sessions, &ctx, BACK, outcome)
}

/// The "done it" button of the last-action view.
pub async fn new_from_chore<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Path(id): Path<String>,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::NewFromChore).await?;
    let input = NewAction {
      action_date: Local::now().date_naive(),
      person_id:   ctx.person_id,
      chore_id:    path_id(id)?,
    };
    let action = state
      .store
      .record_action(input)
      .await
      .map_err(Error::from_store)?;
    info!(
      person_id = ctx.person_id,
      chore_id = action.chore_id,
      "chore added to today"
    );
    Ok::<_, Error>(Notice::success("Chore added to today"))
  }
  .await;
  finish(&state.sessions, &ctx, "/chores_lastaction", outcome)
}
