//! Issues — reported road-maintenance problems and their lifecycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Enums ───────────────────────────────────────────────────────────────────

/// The category of road damage being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
  Pothole,
  Cracks,
  Drainage,
  Signage,
  Other,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  #[default]
  Low,
  Medium,
  High,
}

/// Where an issue sits in its lifecycle. Every issue starts as `Reported`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
  #[default]
  Reported,
  InProgress,
  Completed,
}

impl IssueStatus {
  /// Whether a status write from `self` to `to` is legal.
  ///
  /// Currently every transition is legal: the lifecycle restricts *who* may
  /// move an issue, not *which* moves are possible, and an authorized actor
  /// may also re-apply the current status (a no-op write). A forward-only
  /// ordering, if ever wanted, belongs here and nowhere else.
  pub fn allowed_transition(self, _to: IssueStatus) -> bool { true }
}

// ─── Coordinates ─────────────────────────────────────────────────────────────

/// A latitude/longitude pair. An issue carries zero or one — never half of
/// one; mismatched input is rejected before it gets this far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  pub latitude:  f64,
  pub longitude: f64,
}

// ─── Issue ───────────────────────────────────────────────────────────────────

/// A single reported problem. `issue_id` and `reported_at` never change
/// after creation; `status` and `assigned_to` are mutated only through the
/// lifecycle engine. Issues are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
  pub issue_id:         Uuid,
  pub road_name:        String,
  pub location_details: String,
  pub coordinates:      Option<GeoPoint>,
  pub issue_type:       IssueType,
  pub severity:         Severity,
  pub status:           IssueStatus,
  /// Opaque reference to an already-uploaded photo. The tracker places no
  /// constraint on its shape beyond present-or-absent.
  pub photo_url:        Option<String>,
  /// The user currently responsible, if any. A soft reference: deleting a
  /// user may leave this pointing at nothing, and readers must treat the
  /// lookup miss as "unknown assignee".
  pub assigned_to:      Option<Uuid>,
  /// Server-assigned timestamp; never changes after creation.
  pub reported_at:      DateTime<Utc>,
}

/// Raw report input, exactly as a form or API client submits it. Latitude
/// and longitude arrive separately and are only paired up after validation.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueDraft {
  pub road_name:        String,
  pub location_details: String,
  pub latitude:         Option<f64>,
  pub longitude:        Option<f64>,
  pub issue_type:       IssueType,
  pub severity:         Option<Severity>,
  pub photo_url:        Option<String>,
  pub assigned_to:      Option<Uuid>,
}

/// Input to [`crate::store::IssueStore::create_issue`] — a draft that has
/// passed validation. `issue_id`, `status` and `reported_at` are always set
/// by the store.
#[derive(Debug, Clone)]
pub struct NewIssue {
  pub road_name:        String,
  pub location_details: String,
  pub coordinates:      Option<GeoPoint>,
  pub issue_type:       IssueType,
  pub severity:         Severity,
  pub photo_url:        Option<String>,
  pub assigned_to:      Option<Uuid>,
}

// ─── Dashboard stats ─────────────────────────────────────────────────────────

/// Per-status counts over a set of issues. A pure aggregate: whatever
/// filtering produced the input set is the caller's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
  pub total:       usize,
  pub reported:    usize,
  pub in_progress: usize,
  pub completed:   usize,
}

impl DashboardStats {
  pub fn tally(issues: &[Issue]) -> Self {
    let count = |status: IssueStatus| {
      issues.iter().filter(|i| i.status == status).count()
    };
    Self {
      total:       issues.len(),
      reported:    count(IssueStatus::Reported),
      in_progress: count(IssueStatus::InProgress),
      completed:   count(IssueStatus::Completed),
    }
  }
}
