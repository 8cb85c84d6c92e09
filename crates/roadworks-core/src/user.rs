//! Users and the identity derived from a decoded session token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a user account is allowed to do. Fixed at creation; there is no
/// role-change operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Admin,
  FieldWorker,
}

/// A staff account. Civilian reporters never have one — they report
/// anonymously.
///
/// The credential hash never leaves the server; it is skipped when the
/// record is serialised for a client.
#[derive(Debug, Clone, Serialize)]
pub struct User {
  pub user_id:         Uuid,
  pub name:            String,
  /// Stored lowercased; uniqueness is case-insensitive.
  pub email:           String,
  pub role:            Role,
  #[serde(skip_serializing)]
  pub credential_hash: String,
  pub created_at:      DateTime<Utc>,
}

impl User {
  /// The identity this account presents once authenticated.
  pub fn identity(&self) -> Identity {
    Identity {
      user_id: self.user_id,
      email:   self.email.clone(),
      name:    self.name.clone(),
      role:    self.role,
    }
  }
}

/// Input to [`crate::store::IdentityStore::create_user`].
/// `user_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name:            String,
  pub email:           String,
  /// Already-hashed credential (an opaque PHC string). Plaintext never
  /// reaches the store.
  pub credential_hash: String,
  pub role:            Role,
}

/// The authenticated actor carried by a session token — exactly the four
/// fields the token encodes. Requests without a token have no identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub user_id: Uuid,
  pub email:   String,
  pub name:    String,
  pub role:    Role,
}

impl Identity {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}
