//! The session gate: every request outside the allow-list must carry a live,
//! authenticated session.
//!
//! The gate runs as middleware ahead of routing. On success it attaches a
//! [`RequestContext`] to the request, which handlers extract.

use axum::{
  extract::{FromRequestParts, Request, State},
  http::request::Parts,
  middleware::Next,
  response::{IntoResponse, Response},
};
use chores_core::{
  model::{PersonId, Versions},
  store::ChoreStore,
};
use tracing::{debug, error};

use crate::{
  AppState,
  error::Error,
  handlers::redirect_with_session,
  session::{Notice, token_from_headers},
};

pub const LOGIN_FIRST: &str = "Login first!";

/// Identity and store versions for an authenticated request.
#[derive(Debug, Clone)]
pub struct RequestContext {
  pub token:     String,
  pub person_id: PersonId,
  pub versions:  Versions,
}

/// Paths reachable without a session.
pub fn is_public(path: &str) -> bool {
  path == "/login" || path.starts_with("/static/")
}

pub async fn gate<S>(
  State(state): State<AppState<S>>,
  mut req: Request,
  next: Next,
) -> Response
where
  S: ChoreStore + 'static,
{
  if is_public(req.uri().path()) {
    return next.run(req).await;
  }

  let token = token_from_headers(req.headers());
  let person_id = token.as_deref().and_then(|t| state.sessions.resolve(t));

  let (Some(token), Some(person_id)) = (token.clone(), person_id) else {
    debug!(path = req.uri().path(), "anonymous request sent to login");
    let fresh = state
      .sessions
      .notify_or_create(token.as_deref(), Notice::warning(LOGIN_FIRST));
    return redirect_with_session("/login", fresh);
  };

  let versions = match state.store.versions().await {
    Ok(v) => v,
    Err(e) => {
      // Anything short of the versions is fatal here, never a notice.
      let e = match Error::from_store(e) {
        Error::Domain(d) => Error::Unavailable(d.to_string()),
        other => other,
      };
      error!(error = %e, "cannot read store versions");
      return e.into_response();
    }
  };

  req
    .extensions_mut()
    .insert(RequestContext { token, person_id, versions });
  next.run(req).await
}

impl<S> FromRequestParts<AppState<S>> for RequestContext
where
  S: ChoreStore + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<RequestContext>()
      .cloned()
      .ok_or(Error::Unauthenticated)
  }
}
