//! Handlers for `/api/login` and `/api/users`.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use roadworks_core::{
  store::{IdentityStore, IssueStore},
  user::{Identity, User},
};
use roadworks_engine::NewAccount;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::CurrentActor, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token: String,
  pub user:  Identity,
}

/// `POST /api/login` — body: `{"email":"…","password":"…"}`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  let (token, user) = state.engine.login(&body.email, &body.password).await?;
  Ok(Json(LoginResponse { token, user }))
}

/// `POST /api/users` — body: a [`NewAccount`]. Admin only.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Json(account): Json<NewAccount>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  let user = state.engine.create_user(actor.as_ref(), account).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `DELETE /api/users/{id}` — admin only, never their own account.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  state.engine.delete_user(actor.as_ref(), id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/users` — admin only.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.engine.list_users(actor.as_ref()).await?))
}

/// `GET /api/users/field-workers` — the assignable accounts; admin only.
pub async fn field_workers<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.engine.list_field_workers(actor.as_ref()).await?))
}
