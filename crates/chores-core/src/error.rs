//! Error types for `chores-core`.
//!
//! These are the failures a caller can recover from: every variant maps to a
//! user-visible notice at the HTTP boundary. Backend failures live in the
//! store crates and are never represented here.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A required field was absent, blank, or could not be coerced.
  #[error("missing or malformed field: {0}")]
  Validation(String),

  #[error("action not found: {0}")]
  ActionNotFound(i64),

  #[error("chore not found: {0}")]
  ChoreNotFound(String),

  #[error("person not found: {0}")]
  PersonNotFound(String),

  /// Person names are unique, compared case-insensitively.
  #[error("a person named {0:?} already exists")]
  NameConflict(String),

  /// Never says which half of the credentials was wrong.
  #[error("Wrong username / password combination")]
  AuthenticationFailure,

  #[error("operation requires the admin role")]
  AuthorizationDenied,

  /// A required meta key is absent: the store was never initialised.
  #[error("meta key {0:?} is missing")]
  MissingMeta(String),
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::ActionNotFound(_) | Self::ChoreNotFound(_) | Self::PersonNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
