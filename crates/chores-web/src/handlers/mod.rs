pub mod actions;
pub mod admin;
pub mod chores;
pub mod login;
pub mod persons;
pub mod views;

use axum::{
  Json,
  http::header,
  response::{IntoResponse, Redirect, Response},
};
use chores_core::model::{PersonId, Versions};
use serde::Serialize;
use tracing::info;

use crate::{
  error::Error,
  gate::RequestContext,
  session::{Notice, SessionStore, session_cookie},
};

/// Envelope of every JSON view: the notices queued since the last view plus
/// the view's own data.
#[derive(Debug, Serialize)]
pub struct View<T> {
  pub notices:   Vec<Notice>,
  pub person_id: Option<PersonId>,
  pub versions:  Option<Versions>,
  pub data:      T,
}

/// Render `data` for an authenticated request, draining its notices.
pub(crate) fn render<T: Serialize>(
  sessions: &SessionStore,
  ctx: &RequestContext,
  data: T,
) -> Response {
  Json(View {
    notices:   sessions.take_notices(&ctx.token),
    person_id: Some(ctx.person_id),
    versions:  Some(ctx.versions.clone()),
    data,
  })
  .into_response()
}

/// Turn the outcome of a mutation into a redirect back to `back`.
///
/// Success queues its notice. Recoverable errors queue a danger notice.
/// Denials redirect without a notice. Anything else becomes a 500.
pub(crate) fn finish(
  sessions: &SessionStore,
  ctx: &RequestContext,
  back: &str,
  outcome: Result<Notice, Error>,
) -> Response {
  match outcome {
    Ok(notice) => {
      sessions.notify(&ctx.token, notice);
      Redirect::to(back).into_response()
    }
    Err(Error::Domain(chores_core::Error::AuthorizationDenied)) => {
      Redirect::to(back).into_response()
    }
    Err(e) => match e.notice() {
      Some(notice) => {
        info!(person_id = ctx.person_id, error = %e, "operation rejected");
        sessions.notify(&ctx.token, notice);
        Redirect::to(back).into_response()
      }
      None => e.into_response(),
    },
  }
}

/// Redirect, setting the session cookie when a new session was started.
pub(crate) fn redirect_with_session(to: &str, token: Option<String>) -> Response {
  match token {
    Some(token) => (
      [(header::SET_COOKIE, session_cookie(&token))],
      Redirect::to(to),
    )
      .into_response(),
    None => Redirect::to(to).into_response(),
  }
}
