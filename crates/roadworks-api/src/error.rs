//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roadworks_core::Error;
use serde_json::json;

/// An engine failure on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
  fn from(e: Error) -> Self { Self(e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      Error::Validation(_) => StatusCode::BAD_REQUEST,
      Error::InvalidCredentials | Error::Unauthenticated => {
        StatusCode::UNAUTHORIZED
      }
      Error::Unauthorized | Error::SelfDeletion => StatusCode::FORBIDDEN,
      Error::IssueNotFound(_) | Error::UserNotFound(_) => {
        StatusCode::NOT_FOUND
      }
      Error::UnknownAssignee(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Error::DuplicateEmail(_) => StatusCode::CONFLICT,
      Error::Credential(_) | Error::Store(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    (status, Json(json!({ "error": self.0.to_string() }))).into_response()
  }
}
