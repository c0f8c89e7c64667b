//! Person management (admin only).
//!
//! New persons get [`DEFAULT_PASSWORD`] and must change it. An edit with a
//! password sets a new one and clears that flag.

use axum::{
  Form,
  extract::{Path, State},
  response::Response,
};
use chores_core::{
  model::{NewPerson, PersonEdit, RoleId},
  policy::Operation,
  store::ChoreStore,
};
use tracing::info;

use super::finish;
use crate::{
  AppState,
  auth::{DEFAULT_PASSWORD, hash_password},
  error::Error,
  forms::{EditPersonForm, NewPersonForm, path_id},
  gate::RequestContext,
  policy::authorize,
  session::Notice,
};

const BACK: &str = "/persons";

async fn ensure_role<S: ChoreStore>(
  state: &AppState<S>,
  role_id: RoleId,
) -> Result<(), Error> {
  let roles = state.store.list_roles().await.map_err(Error::from_store)?;
  if roles.iter().any(|r| r.role_id == role_id) {
    Ok(())
  } else {
    Err(chores_core::Error::Validation("role_id".into()).into())
  }
}

pub async fn create<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Form(form): Form<NewPersonForm>,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::CreatePerson).await?;
    let (name, role_id) = form.validate()?;
    ensure_role(&state, role_id).await?;
    let person = state
      .store
      .create_person(NewPerson {
        name,
        role_id,
        password_hash: hash_password(DEFAULT_PASSWORD)?,
      })
      .await
      .map_err(Error::from_store)?;
    info!(person_id = person.person_id, name = %person.name, "person created");
    Ok::<_, Error>(Notice::success("New person added"))
  }
  .await;
  finish(&state.sessions, &ctx, BACK, outcome)
}

pub async fn edit<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Form(form): Form<EditPersonForm>,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::EditPerson).await?;
    let change = form.validate()?;
    ensure_role(&state, change.role_id).await?;
    let password_hash = change
      .password
      .as_deref()
      .map(hash_password)
      .transpose()?;
    let person_id = change.person_id;
    state
      .store
      .edit_person(PersonEdit {
        person_id,
        name: change.name,
        role_id: change.role_id,
        password_hash,
      })
      .await
      .map_err(Error::from_store)?;
    info!(person_id, "person updated");
    Ok::<_, Error>(Notice::success("Person updated"))
  }
  .await;
  finish(&state.sessions, &ctx, BACK, outcome)
}

/// The person's actions stay in the ledger.
pub async fn delete<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Path(id): Path<String>,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::DeletePerson).await?;
    let id = path_id(id)?;
    state
      .store
      .delete_person(id)
      .await
      .map_err(Error::from_store)?;
    info!(person_id = id, "person removed");
    Ok::<_, Error>(Notice::success("Person removed"))
  }
  .await;
  finish(&state.sessions, &ctx, BACK, outcome)
}
