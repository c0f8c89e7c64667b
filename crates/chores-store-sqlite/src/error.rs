//! Error type for `chores-store-sqlite`.

use chores_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] chores_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("meta value {key} is not a number: {value:?}")]
  BadMetaValue { key: String, value: String },
}

impl StoreError for Error {
  fn into_domain(self) -> std::result::Result<chores_core::Error, Self> {
    match self {
      Self::Core(e) => Ok(e),
      other => Err(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
