//! The authorization policy — a pure decision function.
//!
//! Every mutation and privileged read in the system funnels through
//! [`can_perform`]. The function holds no state and touches no store: the
//! caller resolves the target issue first, so the assignee check always
//! runs against the *stored* assignment, never a caller-supplied one.

use uuid::Uuid;

use crate::{
  issue::Issue,
  user::{Identity, Role},
};

/// An action an actor is attempting, carrying whatever target data the
/// decision needs.
#[derive(Debug)]
pub enum Action<'a> {
  /// File a new issue. Anyone may report; a supplied assignee is only
  /// honoured when the reporter assigns the issue to themselves.
  ReportIssue { self_assign: Option<Uuid> },
  /// See every issue in the system.
  ViewAllIssues,
  /// See the issues assigned to one worker.
  ViewAssignedIssues { worker_id: Uuid },
  /// See a single issue.
  ViewIssue { issue: &'a Issue },
  /// Hand an issue to a worker.
  AssignIssue,
  /// Move an issue through its lifecycle.
  UpdateStatus { issue: &'a Issue },
  /// Register a new staff account.
  CreateUser,
  /// Remove a staff account.
  DeleteUser { target: Uuid },
  /// Enumerate staff accounts.
  ListUsers,
}

/// Decide whether `actor` may perform `action`.
///
/// When both "is admin" and "is assignee" would grant access, either
/// suffices; no further restriction stacks on top. An absent actor is
/// denied everything except plain issue reporting.
pub fn can_perform(actor: Option<&Identity>, action: &Action<'_>) -> bool {
  match action {
    Action::ReportIssue { self_assign: None } => true,
    Action::ReportIssue { self_assign: Some(worker) } => {
      actor.is_some_and(|a| a.user_id == *worker)
    }
    Action::ViewAllIssues => is_admin(actor),
    Action::ViewAssignedIssues { worker_id } => {
      actor.is_some_and(|a| a.is_admin() || a.user_id == *worker_id)
    }
    Action::ViewIssue { issue } => admin_or_assignee(actor, issue),
    Action::AssignIssue => is_admin(actor),
    Action::UpdateStatus { issue } => admin_or_assignee(actor, issue),
    Action::CreateUser => is_admin(actor),
    Action::DeleteUser { target } => {
      actor.is_some_and(|a| a.is_admin() && a.user_id != *target)
    }
    Action::ListUsers => is_admin(actor),
  }
}

fn is_admin(actor: Option<&Identity>) -> bool {
  actor.is_some_and(Identity::is_admin)
}

fn admin_or_assignee(actor: Option<&Identity>, issue: &Issue) -> bool {
  actor.is_some_and(|a| a.is_admin() || issue.assigned_to == Some(a.user_id))
}
