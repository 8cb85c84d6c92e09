//! JSON REST API for Roadworks.
//!
//! Exposes an axum [`Router`] backed by any storage backend implementing
//! the core store traits. Transport-level concerns (TLS, cookies, rate
//! limits) are the caller's responsibility; authentication arrives as a
//! bearer token and leaves this crate as a decoded identity.

pub mod auth;
pub mod error;
pub mod issues;
pub mod users;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use roadworks_core::store::{IdentityStore, IssueStore};
use roadworks_engine::Engine;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` (merged
/// with `ROADWORKS_`-prefixed environment variables).
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:        String,
  pub port:        u16,
  pub store_path:  PathBuf,
  /// HMAC key for session tokens. Rotating it invalidates every
  /// outstanding session at once.
  pub session_key: String,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: IdentityStore + IssueStore> {
  pub engine: Arc<Engine<S>>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Sessions
    .route("/api/login", post(users::login::<S>))
    // Issues
    .route(
      "/api/issues",
      post(issues::report::<S>).get(issues::list::<S>),
    )
    .route("/api/issues/{id}", get(issues::get_one::<S>))
    .route("/api/issues/{id}/assign", post(issues::assign::<S>))
    .route("/api/issues/{id}/status", post(issues::update_status::<S>))
    .route(
      "/api/issues/assigned/{worker_id}",
      get(issues::assigned::<S>),
    )
    // Stats
    .route("/api/stats", get(issues::stats::<S>))
    .route(
      "/api/stats/assigned/{worker_id}",
      get(issues::assignee_stats::<S>),
    )
    // Users
    .route("/api/users", post(users::create::<S>).get(users::list::<S>))
    .route("/api/users/{id}", delete(users::delete::<S>))
    .route("/api/users/field-workers", get(users::field_workers::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use roadworks_core::{
    store::IdentityStore,
    user::{NewUser, Role},
  };
  use roadworks_engine::{Engine, SessionCodec, credential};
  use roadworks_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      engine: Arc::new(Engine::new(
        store,
        SessionCodec::new("api-test-key"),
      )),
    }
  }

  async fn seed_user(
    state: &AppState<SqliteStore>,
    email: &str,
    password: &str,
    role: Role,
  ) -> Uuid {
    state
      .engine
      .store()
      .create_user(NewUser {
        name: email.to_string(),
        email: email.to_string(),
        credential_hash: credential::hash_password(password).unwrap(),
        role,
      })
      .await
      .unwrap()
      .user_id
  }

  async fn request(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn login(
    state: &AppState<SqliteStore>,
    email: &str,
    password: &str,
  ) -> String {
    let resp = request(
      state.clone(),
      "POST",
      "/api/login",
      None,
      Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["token"].as_str().unwrap().to_string()
  }

  fn pothole_body() -> Value {
    json!({
      "road_name": "Main St",
      "location_details": "outside number 12",
      "issue_type": "pothole",
    })
  }

  // ── Reporting ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn anonymous_report_returns_201() {
    let state = make_state().await;
    let resp = request(
      state,
      "POST",
      "/api/issues",
      None,
      Some(pothole_body()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let issue = body_json(resp).await;
    assert_eq!(issue["status"], "reported");
    assert_eq!(issue["severity"], "low");
    assert!(issue["reported_at"].is_string());
  }

  #[tokio::test]
  async fn half_a_coordinate_pair_is_400() {
    let state = make_state().await;
    let mut body = pothole_body();
    body["latitude"] = json!(-1.2921);

    let resp = request(state, "POST", "/api/issues", None, Some(body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn blank_road_name_is_400() {
    let state = make_state().await;
    let mut body = pothole_body();
    body["road_name"] = json!("   ");

    let resp = request(state, "POST", "/api/issues", None, Some(body)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Auth plumbing ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn garbage_bearer_token_is_401() {
    let state = make_state().await;
    let resp = request(
      state,
      "GET",
      "/api/issues",
      Some("definitely-not-a-token"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn missing_token_on_admin_route_is_403() {
    let state = make_state().await;
    let resp = request(state, "GET", "/api/issues", None, None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn wrong_password_is_401() {
    let state = make_state().await;
    seed_user(&state, "admin@example.com", "s3cret", Role::Admin).await;

    let resp = request(
      state,
      "POST",
      "/api/login",
      None,
      Some(json!({ "email": "admin@example.com", "password": "nope" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Listing ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_lists_all_issues() {
    let state = make_state().await;
    seed_user(&state, "admin@example.com", "s3cret", Role::Admin).await;
    let token = login(&state, "admin@example.com", "s3cret").await;

    request(state.clone(), "POST", "/api/issues", None, Some(pothole_body()))
      .await;
    request(state.clone(), "POST", "/api/issues", None, Some(pothole_body()))
      .await;

    let resp =
      request(state, "GET", "/api/issues", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn workers_cannot_list_all_issues() {
    let state = make_state().await;
    seed_user(&state, "worker@example.com", "s3cret", Role::FieldWorker)
      .await;
    let token = login(&state, "worker@example.com", "s3cret").await;

    let resp =
      request(state, "GET", "/api/issues", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn assigned_listing_is_own_queue_only() {
    let state = make_state().await;
    seed_user(&state, "admin@example.com", "s3cret", Role::Admin).await;
    let worker_id =
      seed_user(&state, "worker@example.com", "s3cret", Role::FieldWorker)
        .await;
    let admin_token = login(&state, "admin@example.com", "s3cret").await;
    let worker_token = login(&state, "worker@example.com", "s3cret").await;

    let resp = request(
      state.clone(),
      "POST",
      "/api/issues",
      None,
      Some(pothole_body()),
    )
    .await;
    let issue_id = body_json(resp).await["issue_id"]
      .as_str()
      .unwrap()
      .to_string();

    request(
      state.clone(),
      "POST",
      &format!("/api/issues/{issue_id}/assign"),
      Some(&admin_token),
      Some(json!({ "worker_id": worker_id })),
    )
    .await;

    let resp = request(
      state.clone(),
      "GET",
      &format!("/api/issues/assigned/{worker_id}"),
      Some(&worker_token),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);

    // A colleague's queue is off limits.
    let resp = request(
      state,
      "GET",
      &format!("/api/issues/assigned/{}", Uuid::new_v4()),
      Some(&worker_token),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  // ── Assignment and status ─────────────────────────────────────────────

  #[tokio::test]
  async fn assignment_and_status_lifecycle() {
    let state = make_state().await;
    seed_user(&state, "admin@example.com", "s3cret", Role::Admin).await;
    let worker_id =
      seed_user(&state, "worker@example.com", "s3cret", Role::FieldWorker)
        .await;
    seed_user(&state, "other@example.com", "s3cret", Role::FieldWorker)
      .await;

    let admin_token = login(&state, "admin@example.com", "s3cret").await;
    let worker_token = login(&state, "worker@example.com", "s3cret").await;
    let other_token = login(&state, "other@example.com", "s3cret").await;

    let resp = request(
      state.clone(),
      "POST",
      "/api/issues",
      None,
      Some(pothole_body()),
    )
    .await;
    let issue_id = body_json(resp).await["issue_id"]
      .as_str()
      .unwrap()
      .to_string();

    // A worker may not assign, even to themselves.
    let resp = request(
      state.clone(),
      "POST",
      &format!("/api/issues/{issue_id}/assign"),
      Some(&worker_token),
      Some(json!({ "worker_id": worker_id })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The admin may.
    let resp = request(
      state.clone(),
      "POST",
      &format!("/api/issues/{issue_id}/assign"),
      Some(&admin_token),
      Some(json!({ "worker_id": worker_id })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      body_json(resp).await["assigned_to"].as_str().unwrap(),
      worker_id.to_string()
    );

    // The assignee moves it along.
    let resp = request(
      state.clone(),
      "POST",
      &format!("/api/issues/{issue_id}/status"),
      Some(&worker_token),
      Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "in_progress");

    // A different worker gets turned away and the status stays put.
    let resp = request(
      state.clone(),
      "POST",
      &format!("/api/issues/{issue_id}/status"),
      Some(&other_token),
      Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = request(
      state,
      "GET",
      &format!("/api/issues/{issue_id}"),
      Some(&admin_token),
      None,
    )
    .await;
    assert_eq!(body_json(resp).await["status"], "in_progress");
  }

  #[tokio::test]
  async fn assigning_to_an_unknown_worker_is_422() {
    let state = make_state().await;
    seed_user(&state, "admin@example.com", "s3cret", Role::Admin).await;
    let token = login(&state, "admin@example.com", "s3cret").await;

    let resp = request(
      state.clone(),
      "POST",
      "/api/issues",
      None,
      Some(pothole_body()),
    )
    .await;
    let issue_id = body_json(resp).await["issue_id"]
      .as_str()
      .unwrap()
      .to_string();

    let resp = request(
      state,
      "POST",
      &format!("/api/issues/{issue_id}/assign"),
      Some(&token),
      Some(json!({ "worker_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn unknown_issue_is_404() {
    let state = make_state().await;
    seed_user(&state, "admin@example.com", "s3cret", Role::Admin).await;
    let token = login(&state, "admin@example.com", "s3cret").await;

    let resp = request(
      state,
      "GET",
      &format!("/api/issues/{}", Uuid::new_v4()),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Stats ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn stats_are_admin_gated() {
    let state = make_state().await;
    seed_user(&state, "admin@example.com", "s3cret", Role::Admin).await;
    let token = login(&state, "admin@example.com", "s3cret").await;

    request(state.clone(), "POST", "/api/issues", None, Some(pothole_body()))
      .await;

    let resp = request(state.clone(), "GET", "/api/stats", None, None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = request(state, "GET", "/api/stats", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stats = body_json(resp).await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["reported"], 1);
  }

  // ── Accounts ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn account_management_flow() {
    let state = make_state().await;
    let admin_id =
      seed_user(&state, "admin@example.com", "s3cret", Role::Admin).await;
    let token = login(&state, "admin@example.com", "s3cret").await;

    // Create a worker.
    let resp = request(
      state.clone(),
      "POST",
      "/api/users",
      Some(&token),
      Some(json!({
        "name": "New Worker",
        "email": "new@example.com",
        "password": "w0rker-pw",
        "role": "field_worker",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["email"], "new@example.com");
    // The credential hash stays server-side.
    assert!(created.get("credential_hash").is_none());
    let worker_id = created["user_id"].as_str().unwrap().to_string();

    // Same email again: conflict, nothing created.
    let resp = request(
      state.clone(),
      "POST",
      "/api/users",
      Some(&token),
      Some(json!({
        "name": "Impostor",
        "email": "NEW@example.com",
        "password": "pw",
        "role": "field_worker",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // The picker lists exactly the one worker.
    let resp = request(
      state.clone(),
      "GET",
      "/api/users/field-workers",
      Some(&token),
      None,
    )
    .await;
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);

    // Self-deletion is refused; deleting the worker goes through.
    let resp = request(
      state.clone(),
      "DELETE",
      &format!("/api/users/{admin_id}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = request(
      state.clone(),
      "DELETE",
      &format!("/api/users/{worker_id}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = request(
      state,
      "DELETE",
      &format!("/api/users/{worker_id}"),
      Some(&token),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn workers_cannot_manage_accounts() {
    let state = make_state().await;
    seed_user(&state, "worker@example.com", "s3cret", Role::FieldWorker)
      .await;
    let token = login(&state, "worker@example.com", "s3cret").await;

    let resp = request(
      state.clone(),
      "POST",
      "/api/users",
      Some(&token),
      Some(json!({
        "name": "X",
        "email": "x@example.com",
        "password": "pw",
        "role": "admin",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp =
      request(state, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }
}
