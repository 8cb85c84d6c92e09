//! [`SqliteStore`] — the SQLite implementation of the identity and issue
//! stores.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use roadworks_core::{
  issue::{Issue, IssueStatus, NewIssue},
  store::{IdentityStore, IssueStore},
  user::{NewUser, Role, User},
};

use crate::{
  Error,
  encode::{
    RawIssue, RawUser, encode_dt, encode_issue_type, encode_role,
    encode_severity, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

type CoreResult<T> = roadworks_core::Result<T>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roadworks store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// statements execute on one serialized connection, so a multi-statement
/// `call` closure is a single atomic unit with respect to every other
/// caller.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Outcome of the guarded status write, decided inside one `call` closure.
enum StatusWrite {
  Updated(RawIssue),
  Missing,
  GuardFailed,
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:         row.get(0)?,
    name:            row.get(1)?,
    email:           row.get(2)?,
    credential_hash: row.get(3)?,
    role:            row.get(4)?,
    created_at:      row.get(5)?,
  })
}

fn issue_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawIssue> {
  Ok(RawIssue {
    issue_id:         row.get(0)?,
    road_name:        row.get(1)?,
    location_details: row.get(2)?,
    latitude:         row.get(3)?,
    longitude:        row.get(4)?,
    issue_type:       row.get(5)?,
    severity:         row.get(6)?,
    status:           row.get(7)?,
    photo_url:        row.get(8)?,
    assigned_to:      row.get(9)?,
    reported_at:      row.get(10)?,
  })
}

const USER_COLUMNS: &str =
  "user_id, name, email, credential_hash, role, created_at";

const ISSUE_COLUMNS: &str = "issue_id, road_name, location_details, \
   latitude, longitude, issue_type, severity, status, photo_url, \
   assigned_to, reported_at";

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(Error::Database)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> CoreResult<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(Error::Database)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> CoreResult<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(Error::Database)?;
    Ok(())
  }
}

// ─── IdentityStore impl ──────────────────────────────────────────────────────

impl IdentityStore for SqliteStore {
  async fn create_user(&self, input: NewUser) -> CoreResult<User> {
    let user = User {
      user_id:         Uuid::new_v4(),
      name:            input.name,
      email:           input.email.to_lowercase(),
      credential_hash: input.credential_hash,
      role:            input.role,
      created_at:      Utc::now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let name     = user.name.clone();
    let email    = user.email.clone();
    let hash     = user.credential_hash.clone();
    let role_str = encode_role(user.role).to_owned();
    let at_str   = encode_dt(user.created_at);

    // Existence check and insert run in one closure, i.e. one serialized
    // unit on the connection, so two concurrent registrations of the same
    // email cannot both pass the check.
    let inserted: bool = self
      .conn
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if taken {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO users (user_id, name, email, credential_hash, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, email, hash, role_str, at_str],
        )?;
        Ok(true)
      })
      .await
      .map_err(Error::Database)?;

    if !inserted {
      return Err(roadworks_core::Error::DuplicateEmail(user.email));
    }
    Ok(user)
  }

  async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::Database)?;

    Ok(raw.map(RawUser::into_user).transpose()?)
  }

  async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
    let needle = email.to_lowercase();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
              rusqlite::params![needle],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::Database)?;

    Ok(raw.map(RawUser::into_user).transpose()?)
  }

  async fn delete_user(&self, id: Uuid) -> CoreResult<()> {
    let id_str = encode_uuid(id);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await
      .map_err(Error::Database)?;

    if deleted == 0 {
      return Err(roadworks_core::Error::UserNotFound(id));
    }
    Ok(())
  }

  async fn list_users(&self, role: Option<Role>) -> CoreResult<Vec<User>> {
    let role_str = role.map(encode_role).map(str::to_owned);

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(r) = role_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = ?1
             ORDER BY created_at"
          ))?;
          stmt
            .query_map(rusqlite::params![r], user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
          ))?;
          stmt
            .query_map([], user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await
      .map_err(Error::Database)?;

    Ok(
      raws
        .into_iter()
        .map(RawUser::into_user)
        .collect::<crate::Result<_>>()?,
    )
  }
}

// ─── IssueStore impl ─────────────────────────────────────────────────────────

impl IssueStore for SqliteStore {
  async fn create_issue(&self, input: NewIssue) -> CoreResult<Issue> {
    let issue = Issue {
      issue_id:         Uuid::new_v4(),
      road_name:        input.road_name,
      location_details: input.location_details,
      coordinates:      input.coordinates,
      issue_type:       input.issue_type,
      severity:         input.severity,
      status:           IssueStatus::Reported,
      photo_url:        input.photo_url,
      assigned_to:      input.assigned_to,
      reported_at:      Utc::now(),
    };

    let id_str       = encode_uuid(issue.issue_id);
    let road_name    = issue.road_name.clone();
    let location     = issue.location_details.clone();
    let latitude     = issue.coordinates.map(|c| c.latitude);
    let longitude    = issue.coordinates.map(|c| c.longitude);
    let type_str     = encode_issue_type(issue.issue_type).to_owned();
    let severity_str = encode_severity(issue.severity).to_owned();
    let status_str   = encode_status(issue.status).to_owned();
    let photo_url    = issue.photo_url.clone();
    let assigned_str = issue.assigned_to.map(encode_uuid);
    let at_str       = encode_dt(issue.reported_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO issues (
             issue_id, road_name, location_details, latitude, longitude,
             issue_type, severity, status, photo_url, assigned_to,
             reported_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            road_name,
            location,
            latitude,
            longitude,
            type_str,
            severity_str,
            status_str,
            photo_url,
            assigned_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::Database)?;

    Ok(issue)
  }

  async fn get_issue(&self, id: Uuid) -> CoreResult<Option<Issue>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawIssue> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE issue_id = ?1"),
              rusqlite::params![id_str],
              issue_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::Database)?;

    Ok(raw.map(RawIssue::into_issue).transpose()?)
  }

  async fn list_issues(&self) -> CoreResult<Vec<Issue>> {
    let raws: Vec<RawIssue> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ISSUE_COLUMNS} FROM issues ORDER BY reported_at DESC"
        ))?;
        let rows = stmt
          .query_map([], issue_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::Database)?;

    Ok(
      raws
        .into_iter()
        .map(RawIssue::into_issue)
        .collect::<crate::Result<_>>()?,
    )
  }

  async fn list_by_assignee(&self, worker_id: Uuid) -> CoreResult<Vec<Issue>> {
    let worker_str = encode_uuid(worker_id);

    let raws: Vec<RawIssue> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ISSUE_COLUMNS} FROM issues WHERE assigned_to = ?1
           ORDER BY reported_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![worker_str], issue_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(Error::Database)?;

    Ok(
      raws
        .into_iter()
        .map(RawIssue::into_issue)
        .collect::<crate::Result<_>>()?,
    )
  }

  async fn assign(&self, issue_id: Uuid, worker_id: Uuid) -> CoreResult<Issue> {
    let id_str     = encode_uuid(issue_id);
    let worker_str = encode_uuid(worker_id);

    // Update and re-read in one closure: the returned record is exactly
    // what was written, with no window for an interleaved mutation.
    let raw: Option<RawIssue> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE issues SET assigned_to = ?1 WHERE issue_id = ?2",
          rusqlite::params![worker_str, id_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        let raw = conn.query_row(
          &format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE issue_id = ?1"),
          rusqlite::params![id_str],
          issue_from_row,
        )?;
        Ok(Some(raw))
      })
      .await
      .map_err(Error::Database)?;

    match raw {
      Some(raw) => Ok(raw.into_issue()?),
      None => Err(roadworks_core::Error::IssueNotFound(issue_id)),
    }
  }

  async fn update_status(
    &self,
    issue_id: Uuid,
    status: IssueStatus,
    required_assignee: Option<Uuid>,
  ) -> CoreResult<Issue> {
    let id_str       = encode_uuid(issue_id);
    let status_str   = encode_status(status).to_owned();
    let required_str = required_assignee.map(encode_uuid);

    // Guard check, write, and re-read are one closure — one serialized
    // unit on the connection. A concurrent reassignment cannot land
    // between the check and the write.
    let outcome: StatusWrite = self
      .conn
      .call(move |conn| {
        let assigned: Option<Option<String>> = conn
          .query_row(
            "SELECT assigned_to FROM issues WHERE issue_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;

        let Some(assigned) = assigned else {
          return Ok(StatusWrite::Missing);
        };

        if let Some(required) = &required_str
          && assigned.as_deref() != Some(required.as_str())
        {
          return Ok(StatusWrite::GuardFailed);
        }

        conn.execute(
          "UPDATE issues SET status = ?1 WHERE issue_id = ?2",
          rusqlite::params![status_str, id_str],
        )?;

        let raw = conn.query_row(
          &format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE issue_id = ?1"),
          rusqlite::params![id_str],
          issue_from_row,
        )?;
        Ok(StatusWrite::Updated(raw))
      })
      .await
      .map_err(Error::Database)?;

    match outcome {
      StatusWrite::Updated(raw) => Ok(raw.into_issue()?),
      StatusWrite::Missing => {
        Err(roadworks_core::Error::IssueNotFound(issue_id))
      }
      StatusWrite::GuardFailed => Err(roadworks_core::Error::Unauthorized),
    }
  }
}
