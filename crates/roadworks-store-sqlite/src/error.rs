//! Error type for `roadworks-store-sqlite`.
//!
//! Internal plumbing failures (bad rows, connection faults) live here;
//! they surface across the store-trait boundary as
//! [`roadworks_core::Error::Store`]. Typed domain signals (not-found,
//! duplicate email, a failed assignee guard) are constructed directly as
//! core errors by the trait impl and never pass through this enum.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored string failed to decode into its domain type.
  #[error("corrupt column value: {0}")]
  Decode(String),
}

impl From<Error> for roadworks_core::Error {
  fn from(e: Error) -> Self { roadworks_core::Error::Store(Box::new(e)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
