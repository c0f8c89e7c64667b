//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
};
use chores_core::store::StoreError;
use thiserror::Error;

use crate::session::Notice;

#[derive(Debug, Error)]
pub enum Error {
  /// Recoverable failure reported back to the person as a notice.
  #[error(transparent)]
  Domain(#[from] chores_core::Error),

  /// The store is reachable but unusable, e.g. its meta rows are missing.
  #[error("store unavailable: {0}")]
  Unavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("xml error: {0}")]
  Xml(String),

  #[error("password hashing failed: {0}")]
  Hash(String),

  #[error("No export found, run an export first")]
  ExportMissing,

  #[error("not logged in")]
  Unauthenticated,
}

impl Error {
  /// Split a backend error into its domain part, if it has one.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.into_domain() {
      Ok(chores_core::Error::MissingMeta(key)) => {
        Self::Unavailable(format!("meta key {key:?} is missing"))
      }
      Ok(domain) => Self::Domain(domain),
      Err(other) => Self::Store(Box::new(other)),
    }
  }

  /// The notice a person sees for this error, or `None` when the error is
  /// either silent or fatal.
  pub fn notice(&self) -> Option<Notice> {
    match self {
      Self::Domain(chores_core::Error::AuthorizationDenied) => None,
      Self::Domain(e) => Some(Notice::danger(e.to_string())),
      Self::ExportMissing => Some(Notice::danger(self.to_string())),
      _ => None,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthenticated => Redirect::to("/login").into_response(),
      Error::Domain(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
      Error::ExportMissing => {
        (StatusCode::NOT_FOUND, self.to_string()).into_response()
      }
      e => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  enum FakeStoreError {
    #[error(transparent)]
    Core(chores_core::Error),
    #[error("disk on fire")]
    Backend,
  }

  impl StoreError for FakeStoreError {
    fn into_domain(self) -> Result<chores_core::Error, Self> {
      match self {
        Self::Core(e) => Ok(e),
        other => Err(other),
      }
    }
  }

  #[test]
  fn domain_errors_become_notices() {
    let e = Error::from_store(FakeStoreError::Core(
      chores_core::Error::ChoreNotFound("mop".into()),
    ));
    assert_eq!(e.notice(), Some(Notice::danger("chore not found: mop")));
  }

  #[test]
  fn missing_meta_is_fatal() {
    let e = Error::from_store(FakeStoreError::Core(
      chores_core::Error::MissingMeta("dbversion".into()),
    ));
    assert!(matches!(e, Error::Unavailable(_)));
    assert_eq!(e.notice(), None);
    assert_eq!(e.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn backend_errors_are_fatal() {
    let e = Error::from_store(FakeStoreError::Backend);
    assert!(matches!(e, Error::Store(_)));
    assert_eq!(e.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn denial_is_silent() {
    let e = Error::Domain(chores_core::Error::AuthorizationDenied);
    assert_eq!(e.notice(), None);
  }

  #[test]
  fn authentication_failure_reads_generically() {
    let e = Error::Domain(chores_core::Error::AuthenticationFailure);
    assert_eq!(
      e.notice().map(|n| n.message),
      Some("Wrong username / password combination".to_string())
    );
  }
}
