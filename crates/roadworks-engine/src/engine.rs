//! [`Engine`] — validated, authorized orchestration of every operation.
//!
//! Each method is one request-scoped unit of work: validate the input,
//! ask [`roadworks_core::policy`] whether the actor may act, apply the
//! mutation through the store, return the updated record or a typed
//! failure. The engine holds no per-request state and never retries.

use roadworks_core::{
  Error, Result,
  issue::{
    DashboardStats, GeoPoint, Issue, IssueDraft, IssueStatus, NewIssue,
  },
  policy::{Action, can_perform},
  store::{IdentityStore, IssueStore},
  user::{Identity, NewUser, Role, User},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{credential, session::SessionCodec};

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Raw account-creation input. The plaintext password is hashed before it
/// reaches any store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
  pub name:     String,
  pub email:    String,
  pub password: String,
  pub role:     Role,
}

/// Which slice of the issue set a dashboard aggregates over.
#[derive(Debug, Clone, Copy)]
pub enum StatsScope {
  All,
  Assignee(Uuid),
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The lifecycle engine, generic over a storage backend implementing both
/// store traits.
pub struct Engine<S> {
  store:    S,
  sessions: SessionCodec,
}

impl<S> Engine<S>
where
  S: IdentityStore + IssueStore,
{
  pub fn new(store: S, sessions: SessionCodec) -> Self {
    Self { store, sessions }
  }

  /// Direct access to the backing store — for bootstrap tooling (e.g.
  /// seeding the first admin account, which no actor yet exists to
  /// authorize) and tests.
  pub fn store(&self) -> &S { &self.store }

  /// Decode a bearer token into the identity it carries, if genuine.
  pub fn decode_session(&self, token: &str) -> Option<Identity> {
    self.sessions.decode(token)
  }

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Authenticate by email and password, returning a signed session token
  /// and the identity it encodes.
  ///
  /// Unknown email and wrong password are indistinguishable to the
  /// caller.
  pub async fn login(
    &self,
    email: &str,
    password: &str,
  ) -> Result<(String, Identity)> {
    let Some(user) = self.store.find_by_email(email).await? else {
      return Err(Error::InvalidCredentials);
    };
    if !credential::verify_password(password, &user.credential_hash) {
      tracing::debug!(user = %user.user_id, "login rejected");
      return Err(Error::InvalidCredentials);
    }

    let identity = user.identity();
    let token = self.sessions.encode(&identity);
    tracing::info!(user = %identity.user_id, "login");
    Ok((token, identity))
  }

  // ── Issues ────────────────────────────────────────────────────────────

  /// File a new issue. Anyone may report — including anonymously — but a
  /// supplied assignee is only honoured when the reporter is assigning
  /// the issue to themselves.
  pub async fn report_issue(
    &self,
    actor: Option<&Identity>,
    draft: IssueDraft,
  ) -> Result<Issue> {
    if !can_perform(actor, &Action::ReportIssue {
      self_assign: draft.assigned_to,
    }) {
      return Err(Error::Unauthorized);
    }

    let input = validate_draft(draft)?;
    let issue = self.store.create_issue(input).await?;
    tracing::info!(
      issue = %issue.issue_id,
      road = %issue.road_name,
      "issue reported"
    );
    Ok(issue)
  }

  /// Fetch a single issue. Admins and the current assignee only.
  pub async fn issue(
    &self,
    actor: Option<&Identity>,
    issue_id: Uuid,
  ) -> Result<Issue> {
    let Some(issue) = self.store.get_issue(issue_id).await? else {
      return Err(Error::IssueNotFound(issue_id));
    };
    if !can_perform(actor, &Action::ViewIssue { issue: &issue }) {
      return Err(Error::Unauthorized);
    }
    Ok(issue)
  }

  /// Every issue in the system, newest first. Admin only.
  pub async fn list_issues(
    &self,
    actor: Option<&Identity>,
  ) -> Result<Vec<Issue>> {
    if !can_perform(actor, &Action::ViewAllIssues) {
      return Err(Error::Unauthorized);
    }
    self.store.list_issues().await
  }

  /// The issues assigned to `worker_id`, newest first. Only the worker
  /// themselves or an admin may ask.
  pub async fn issues_for_assignee(
    &self,
    actor: Option<&Identity>,
    worker_id: Uuid,
  ) -> Result<Vec<Issue>> {
    if !can_perform(actor, &Action::ViewAssignedIssues { worker_id }) {
      return Err(Error::Unauthorized);
    }
    self.store.list_by_assignee(worker_id).await
  }

  /// Hand an issue to a worker. Admin only; the target must resolve to an
  /// existing account.
  pub async fn assign_issue(
    &self,
    actor: Option<&Identity>,
    issue_id: Uuid,
    worker_id: Uuid,
  ) -> Result<Issue> {
    if !can_perform(actor, &Action::AssignIssue) {
      return Err(Error::Unauthorized);
    }
    if self.store.find_by_id(worker_id).await?.is_none() {
      return Err(Error::UnknownAssignee(worker_id));
    }

    let issue = self.store.assign(issue_id, worker_id).await?;
    tracing::info!(
      issue = %issue.issue_id,
      assignee = %worker_id,
      "issue assigned"
    );
    Ok(issue)
  }

  /// Move an issue to `new_status`.
  ///
  /// The policy check runs against the *stored* issue, and for
  /// non-admin actors the store re-asserts the assignment in the same
  /// atomic unit as the write, so a concurrent reassignment cannot
  /// invalidate the decision after it was made.
  pub async fn update_status(
    &self,
    actor: Option<&Identity>,
    issue_id: Uuid,
    new_status: IssueStatus,
  ) -> Result<Issue> {
    let Some(issue) = self.store.get_issue(issue_id).await? else {
      return Err(Error::IssueNotFound(issue_id));
    };
    if !can_perform(actor, &Action::UpdateStatus { issue: &issue }) {
      return Err(Error::Unauthorized);
    }
    if !issue.status.allowed_transition(new_status) {
      return Err(Error::Validation(format!(
        "cannot move an issue from {:?} to {new_status:?}",
        issue.status
      )));
    }

    // The policy granted either admin or assignee; only the assignee path
    // needs the store-level guard.
    let guard = actor
      .filter(|a| !a.is_admin())
      .map(|a| a.user_id);

    let updated = self
      .store
      .update_status(issue_id, new_status, guard)
      .await?;
    tracing::info!(
      issue = %updated.issue_id,
      status = ?updated.status,
      "status updated"
    );
    Ok(updated)
  }

  /// Per-status counts over all issues or one worker's slice. A pure
  /// read; whatever filtering the scope applies is the only gate.
  pub async fn dashboard_stats(
    &self,
    scope: StatsScope,
  ) -> Result<DashboardStats> {
    let issues = match scope {
      StatsScope::All => self.store.list_issues().await?,
      StatsScope::Assignee(worker_id) => {
        self.store.list_by_assignee(worker_id).await?
      }
    };
    Ok(DashboardStats::tally(&issues))
  }

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Register a staff account. Admin only.
  pub async fn create_user(
    &self,
    actor: Option<&Identity>,
    account: NewAccount,
  ) -> Result<User> {
    if !can_perform(actor, &Action::CreateUser) {
      return Err(Error::Unauthorized);
    }
    if account.name.trim().is_empty() {
      return Err(Error::Validation("name must not be empty".into()));
    }
    if account.email.trim().is_empty() {
      return Err(Error::Validation("email must not be empty".into()));
    }
    if account.password.is_empty() {
      return Err(Error::Validation("password must not be empty".into()));
    }

    let credential_hash = credential::hash_password(&account.password)?;
    let user = self
      .store
      .create_user(NewUser {
        name: account.name,
        email: account.email,
        credential_hash,
        role: account.role,
      })
      .await?;
    tracing::info!(user = %user.user_id, role = ?user.role, "account created");
    Ok(user)
  }

  /// Remove a staff account. Admin only, and never their own.
  pub async fn delete_user(
    &self,
    actor: Option<&Identity>,
    user_id: Uuid,
  ) -> Result<()> {
    if !can_perform(actor, &Action::DeleteUser { target: user_id }) {
      // An admin aiming at their own account gets the specific
      // rejection; everyone else the generic one.
      return Err(match actor {
        Some(a) if a.is_admin() && a.user_id == user_id => {
          Error::SelfDeletion
        }
        _ => Error::Unauthorized,
      });
    }

    self.store.delete_user(user_id).await?;
    tracing::info!(user = %user_id, "account deleted");
    Ok(())
  }

  /// All accounts, admin only.
  pub async fn list_users(
    &self,
    actor: Option<&Identity>,
  ) -> Result<Vec<User>> {
    if !can_perform(actor, &Action::ListUsers) {
      return Err(Error::Unauthorized);
    }
    self.store.list_users(None).await
  }

  /// The field-worker accounts an issue can be assigned to, admin only.
  pub async fn list_field_workers(
    &self,
    actor: Option<&Identity>,
  ) -> Result<Vec<User>> {
    if !can_perform(actor, &Action::ListUsers) {
      return Err(Error::Unauthorized);
    }
    self.store.list_users(Some(Role::FieldWorker)).await
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Turn a raw report into store input, or say precisely why not.
fn validate_draft(draft: IssueDraft) -> Result<NewIssue> {
  if draft.road_name.trim().is_empty() {
    return Err(Error::Validation("road name must not be empty".into()));
  }
  if draft.location_details.trim().is_empty() {
    return Err(Error::Validation(
      "location details must not be empty".into(),
    ));
  }

  let coordinates = match (draft.latitude, draft.longitude) {
    (Some(latitude), Some(longitude)) => {
      Some(GeoPoint { latitude, longitude })
    }
    (None, None) => None,
    _ => {
      return Err(Error::Validation(
        "latitude and longitude must be supplied together".into(),
      ));
    }
  };

  Ok(NewIssue {
    road_name: draft.road_name,
    location_details: draft.location_details,
    coordinates,
    issue_type: draft.issue_type,
    severity: draft.severity.unwrap_or_default(),
    photo_url: draft.photo_url,
    assigned_to: draft.assigned_to,
  })
}
