//! Handlers for `/api/issues` and `/api/stats`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/api/issues` | Anonymous allowed |
//! | `GET`    | `/api/issues` | Admin only |
//! | `GET`    | `/api/issues/{id}` | Admin or assignee |
//! | `POST`   | `/api/issues/{id}/assign` | Admin only |
//! | `POST`   | `/api/issues/{id}/status` | Admin or assignee |
//! | `GET`    | `/api/issues/assigned/{worker_id}` | Worker or admin |
//! | `GET`    | `/api/stats` | Admin only |
//! | `GET`    | `/api/stats/assigned/{worker_id}` | Worker or admin |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use roadworks_core::{
  Error,
  issue::{DashboardStats, Issue, IssueDraft, IssueStatus},
  policy::{Action, can_perform},
  store::{IdentityStore, IssueStore},
};
use roadworks_engine::StatsScope;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::CurrentActor, error::ApiError};

/// `POST /api/issues` — body: an [`IssueDraft`].
pub async fn report<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Json(draft): Json<IssueDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  let issue = state.engine.report_issue(actor.as_ref(), draft).await?;
  Ok((StatusCode::CREATED, Json(issue)))
}

/// `GET /api/issues`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<Issue>>, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.engine.list_issues(actor.as_ref()).await?))
}

/// `GET /api/issues/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
) -> Result<Json<Issue>, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.engine.issue(actor.as_ref(), id).await?))
}

/// `GET /api/issues/assigned/{worker_id}`
pub async fn assigned<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(worker_id): Path<Uuid>,
) -> Result<Json<Vec<Issue>>, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  Ok(Json(
    state
      .engine
      .issues_for_assignee(actor.as_ref(), worker_id)
      .await?,
  ))
}

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub worker_id: Uuid,
}

/// `POST /api/issues/{id}/assign` — body: `{"worker_id":"…"}`
pub async fn assign<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
  Json(body): Json<AssignBody>,
) -> Result<Json<Issue>, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  Ok(Json(
    state
      .engine
      .assign_issue(actor.as_ref(), id, body.worker_id)
      .await?,
  ))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: IssueStatus,
}

/// `POST /api/issues/{id}/status` — body: `{"status":"in_progress"}`
pub async fn update_status<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Issue>, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  Ok(Json(
    state
      .engine
      .update_status(actor.as_ref(), id, body.status)
      .await?,
  ))
}

/// `GET /api/stats` — counts over every issue; gated like the full listing.
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Result<Json<DashboardStats>, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  if !can_perform(actor.as_ref(), &Action::ViewAllIssues) {
    return Err(ApiError(Error::Unauthorized));
  }
  Ok(Json(state.engine.dashboard_stats(StatsScope::All).await?))
}

/// `GET /api/stats/assigned/{worker_id}` — counts over one worker's queue;
/// gated like the scoped listing.
pub async fn assignee_stats<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(worker_id): Path<Uuid>,
) -> Result<Json<DashboardStats>, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  if !can_perform(actor.as_ref(), &Action::ViewAssignedIssues { worker_id }) {
    return Err(ApiError(Error::Unauthorized));
  }
  Ok(Json(
    state
      .engine
      .dashboard_stats(StatsScope::Assignee(worker_id))
      .await?,
  ))
}
