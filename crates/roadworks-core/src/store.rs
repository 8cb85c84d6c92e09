//! The `IdentityStore` and `IssueStore` traits.
//!
//! Implemented by storage backends (e.g. `roadworks-store-sqlite`). Higher
//! layers depend on these abstractions, not on any concrete backend. Both
//! traits speak [`crate::Error`] directly so a typed not-found or duplicate
//! signal crosses the boundary intact instead of degrading into a backend
//! error string.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  Result,
  issue::{Issue, IssueStatus, NewIssue},
  user::{NewUser, Role, User},
};

// ─── IdentityStore ───────────────────────────────────────────────────────────

/// Durable records of staff accounts.
pub trait IdentityStore: Send + Sync {
  /// Create and persist a new account. The store assigns `user_id` and
  /// `created_at`, and stores the email lowercased.
  ///
  /// Returns [`crate::Error::DuplicateEmail`] if the email (compared
  /// case-insensitively) is already registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User>> + Send + '_;

  /// Look up an account by id. Returns `None` if not found.
  fn find_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>>> + Send + '_;

  /// Look up an account by email, case-insensitively.
  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>>> + Send + 'a;

  /// Delete an account. Returns [`crate::Error::UserNotFound`] if `id` is
  /// unknown. Issues assigned to the deleted user keep their dangling
  /// `assigned_to` reference (readers treat the miss as "unknown
  /// assignee").
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  /// List accounts, optionally restricted to one role, in registration
  /// order.
  fn list_users(
    &self,
    role: Option<Role>,
  ) -> impl Future<Output = Result<Vec<User>>> + Send + '_;
}

// ─── IssueStore ──────────────────────────────────────────────────────────────

/// Durable records of reported issues.
///
/// `assign` and `update_status` are single atomic read-modify-writes: the
/// backend must not let a concurrent mutation of the same row slip between
/// the guard check and the write.
pub trait IssueStore: Send + Sync {
  /// Persist a validated report. The store assigns `issue_id` and
  /// `reported_at` and sets the initial [`IssueStatus::Reported`] status.
  fn create_issue(
    &self,
    input: NewIssue,
  ) -> impl Future<Output = Result<Issue>> + Send + '_;

  /// Retrieve an issue by id. Returns `None` if not found.
  fn get_issue(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Issue>>> + Send + '_;

  /// All issues, newest `reported_at` first.
  fn list_issues(&self) -> impl Future<Output = Result<Vec<Issue>>> + Send + '_;

  /// Issues with `assigned_to == worker_id`, newest `reported_at` first.
  fn list_by_assignee(
    &self,
    worker_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Issue>>> + Send + '_;

  /// Set `assigned_to` and return the updated record.
  ///
  /// Returns [`crate::Error::IssueNotFound`] if `issue_id` is unknown. The
  /// caller is responsible for checking that `worker_id` resolves to a
  /// real user first.
  fn assign(
    &self,
    issue_id: Uuid,
    worker_id: Uuid,
  ) -> impl Future<Output = Result<Issue>> + Send + '_;

  /// Set `status` and return the updated record.
  ///
  /// When `required_assignee` is `Some`, the write applies only while the
  /// issue is still assigned to that user — the check and the write happen
  /// in one atomic unit, so an authorization decision made against the
  /// stored assignment cannot go stale against a concurrent reassignment.
  /// A failed guard returns [`crate::Error::Unauthorized`];
  /// an unknown `issue_id` returns [`crate::Error::IssueNotFound`].
  fn update_status(
    &self,
    issue_id: Uuid,
    status: IssueStatus,
    required_assignee: Option<Uuid>,
  ) -> impl Future<Output = Result<Issue>> + Send + '_;
}
