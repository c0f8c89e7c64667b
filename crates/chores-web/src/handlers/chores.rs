//! Chore taxonomy mutations (admin only).

use axum::{
  Form,
  extract::{Path, State},
  response::Response,
};
use chores_core::{policy::Operation, store::ChoreStore};
use tracing::info;

use super::finish;
use crate::{
  AppState,
  error::Error,
  forms::{EditChoreForm, NewChoreForm, path_id},
  gate::RequestContext,
  policy::authorize,
  session::Notice,
};

const BACK: &str = "/chores_lastaction";

pub async fn create<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Form(form): Form<NewChoreForm>,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::CreateChore).await?;
    let name = form.validate()?;
    let chore = state
      .store
      .create_chore(name)
      .await
      .map_err(Error::from_store)?;
    info!(chore_id = chore.chore_id, name = %chore.name, "chore created");
    Ok::<_, Error>(Notice::success("New chore added"))
  }
  .await;
  finish(&state.sessions, &ctx, BACK, outcome)
}

pub async fn edit<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Form(form): Form<EditChoreForm>,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::EditChore).await?;
    let chore = form.validate()?;
    let id = chore.chore_id;
    state
      .store
      .edit_chore(chore)
      .await
      .map_err(Error::from_store)?;
    info!(chore_id = id, "chore updated");
    Ok::<_, Error>(Notice::success("Chore updated"))
  }
  .await;
  finish(&state.sessions, &ctx, BACK, outcome)
}

/// Removes the chore's actions along with it.
pub async fn delete<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Path(id): Path<String>,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::DeleteChore).await?;
    let id = path_id(id)?;
    let actions = state
      .store
      .delete_chore(id)
      .await
      .map_err(Error::from_store)?;
    info!(chore_id = id, actions, "chore removed");
    Ok::<_, Error>(Notice::success("Chore removed"))
  }
  .await;
  finish(&state.sessions, &ctx, BACK, outcome)
}
