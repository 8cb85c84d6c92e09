//! Error types for `roadworks-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(String),

  /// Login failed. Deliberately identical for an unknown email and a wrong
  /// password so the endpoint cannot be used to probe for accounts.
  #[error("invalid email or password")]
  InvalidCredentials,

  /// The caller presented no usable identity where one is required.
  #[error("authentication required")]
  Unauthenticated,

  /// The caller's identity is valid but lacks permission for the action.
  #[error("not authorized")]
  Unauthorized,

  #[error("issue not found: {0}")]
  IssueNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  /// An assignment target that does not resolve to a known user.
  #[error("unknown assignee: {0}")]
  UnknownAssignee(Uuid),

  /// An admin may not delete their own account.
  #[error("an account cannot delete itself")]
  SelfDeletion,

  #[error("email already registered: {0}")]
  DuplicateEmail(String),

  /// Failure inside the password hashing machinery. Distinct from
  /// [`Error::InvalidCredentials`], which is a normal login rejection.
  #[error("credential error: {0}")]
  Credential(String),

  /// Underlying persistence failure. The caller may retry; the engine
  /// never does.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
