//! Login, logout, and first-use bootstrap.

use axum::{
  Form, Json,
  extract::State,
  http::HeaderMap,
  response::{IntoResponse, Redirect, Response},
};
use chores_core::store::ChoreStore;
use serde::Serialize;
use tracing::{info, warn};

use super::{View, admin::reinitialize, redirect_with_session};
use crate::{
  AppState,
  auth::authenticate,
  error::Error,
  forms::LoginForm,
  gate::RequestContext,
  session::{Notice, token_from_headers},
};

pub const BOOTSTRAP_NOTICE: &str =
  "Created new database. You are logged in as admin with password admin, change it.";

#[derive(Debug, Serialize)]
pub struct LoginScreen {
  pub fields: [&'static str; 2],
}

/// Show the login screen, or on a store that was never set up, create it and
/// log in as the default administrator.
pub async fn screen<S: ChoreStore>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Response, Error> {
  // Concurrent first visits must not both initialise.
  let setup = state.bootstrap.lock().await;
  let initialized = state
    .store
    .is_initialized()
    .await
    .map_err(Error::from_store)?;

  if !initialized {
    let admin_id = reinitialize(state.store.as_ref()).await?;
    drop(setup);
    warn!(person_id = admin_id, "empty store initialised on first use");
    let token = state.sessions.create(admin_id);
    state.sessions.notify(&token, Notice::warning(BOOTSTRAP_NOTICE));
    return Ok(redirect_with_session("/", Some(token)));
  }
  drop(setup);

  let notices = token_from_headers(&headers)
    .map(|t| state.sessions.take_notices(&t))
    .unwrap_or_default();

  Ok(
    Json(View {
      notices,
      person_id: None,
      versions: None,
      data: LoginScreen { fields: ["user", "password"] },
    })
    .into_response(),
  )
}

pub async fn submit<S: ChoreStore>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Form(form): Form<LoginForm>,
) -> Result<Response, Error> {
  let initialized = state
    .store
    .is_initialized()
    .await
    .map_err(Error::from_store)?;
  if !initialized {
    // The login screen sets the store up.
    return Ok(Redirect::to("/login").into_response());
  }

  let token = token_from_headers(&headers);

  let outcome = async {
    let (user, password) = form.validate()?;
    authenticate(state.store.as_ref(), &user, &password).await
  }
  .await;

  match outcome {
    Ok(person) => {
      if let Some(old) = &token {
        state.sessions.destroy(old);
      }
      let fresh = state.sessions.create(person.person_id);
      state.sessions.notify(&fresh, Notice::success("You were logged in"));
      if person.must_change_password {
        state.sessions.notify(
          &fresh,
          Notice::warning("You are still using the default password"),
        );
      }
      info!(person_id = person.person_id, "logged in");
      Ok(redirect_with_session("/", Some(fresh)))
    }
    Err(e) => {
      let Some(notice) = e.notice() else {
        return Err(e);
      };
      info!("login failed");
      let fresh = state.sessions.notify_or_create(token.as_deref(), notice);
      Ok(redirect_with_session("/login", fresh))
    }
  }
}

pub async fn logout<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
) -> Response {
  state.sessions.destroy(&ctx.token);
  let fresh = state
    .sessions
    .notify_or_create(None, Notice::success("You were logged out"));
  info!(person_id = ctx.person_id, "logged out");
  redirect_with_session("/login", fresh)
}
