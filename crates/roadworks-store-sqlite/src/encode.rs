//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enums are stored as
//! their lowercase/snake_case discriminants. UUIDs are stored as
//! hyphenated lowercase strings. Coordinates are stored as two REAL
//! columns that are NULL or populated together.

use chrono::{DateTime, Utc};
use roadworks_core::{
  issue::{GeoPoint, Issue, IssueStatus, IssueType, Severity},
  user::{Role, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Admin => "admin",
    Role::FieldWorker => "field_worker",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "admin" => Ok(Role::Admin),
    "field_worker" => Ok(Role::FieldWorker),
    other => Err(Error::Decode(format!("unknown role: {other:?}"))),
  }
}

// ─── IssueType ───────────────────────────────────────────────────────────────

pub fn encode_issue_type(t: IssueType) -> &'static str {
  match t {
    IssueType::Pothole => "pothole",
    IssueType::Cracks => "cracks",
    IssueType::Drainage => "drainage",
    IssueType::Signage => "signage",
    IssueType::Other => "other",
  }
}

pub fn decode_issue_type(s: &str) -> Result<IssueType> {
  match s {
    "pothole" => Ok(IssueType::Pothole),
    "cracks" => Ok(IssueType::Cracks),
    "drainage" => Ok(IssueType::Drainage),
    "signage" => Ok(IssueType::Signage),
    "other" => Ok(IssueType::Other),
    other => Err(Error::Decode(format!("unknown issue type: {other:?}"))),
  }
}

// ─── Severity ────────────────────────────────────────────────────────────────

pub fn encode_severity(s: Severity) -> &'static str {
  match s {
    Severity::Low => "low",
    Severity::Medium => "medium",
    Severity::High => "high",
  }
}

pub fn decode_severity(s: &str) -> Result<Severity> {
  match s {
    "low" => Ok(Severity::Low),
    "medium" => Ok(Severity::Medium),
    "high" => Ok(Severity::High),
    other => Err(Error::Decode(format!("unknown severity: {other:?}"))),
  }
}

// ─── IssueStatus ─────────────────────────────────────────────────────────────

pub fn encode_status(s: IssueStatus) -> &'static str {
  match s {
    IssueStatus::Reported => "reported",
    IssueStatus::InProgress => "in_progress",
    IssueStatus::Completed => "completed",
  }
}

pub fn decode_status(s: &str) -> Result<IssueStatus> {
  match s {
    "reported" => Ok(IssueStatus::Reported),
    "in_progress" => Ok(IssueStatus::InProgress),
    "completed" => Ok(IssueStatus::Completed),
    other => Err(Error::Decode(format!("unknown status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:         String,
  pub name:            String,
  pub email:           String,
  pub credential_hash: String,
  pub role:            String,
  pub created_at:      String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:         decode_uuid(&self.user_id)?,
      name:            self.name,
      email:           self.email,
      credential_hash: self.credential_hash,
      role:            decode_role(&self.role)?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `issues` row.
pub struct RawIssue {
  pub issue_id:         String,
  pub road_name:        String,
  pub location_details: String,
  pub latitude:         Option<f64>,
  pub longitude:        Option<f64>,
  pub issue_type:       String,
  pub severity:         String,
  pub status:           String,
  pub photo_url:        Option<String>,
  pub assigned_to:      Option<String>,
  pub reported_at:      String,
}

impl RawIssue {
  pub fn into_issue(self) -> Result<Issue> {
    let coordinates = match (self.latitude, self.longitude) {
      (Some(latitude), Some(longitude)) => {
        Some(GeoPoint { latitude, longitude })
      }
      (None, None) => None,
      _ => {
        return Err(Error::Decode(format!(
          "issue {} has half a coordinate pair",
          self.issue_id
        )));
      }
    };

    Ok(Issue {
      issue_id: decode_uuid(&self.issue_id)?,
      road_name: self.road_name,
      location_details: self.location_details,
      coordinates,
      issue_type: decode_issue_type(&self.issue_type)?,
      severity: decode_severity(&self.severity)?,
      status: decode_status(&self.status)?,
      photo_url: self.photo_url,
      assigned_to: self
        .assigned_to
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      reported_at: decode_dt(&self.reported_at)?,
    })
  }
}
