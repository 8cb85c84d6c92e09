//! Bearer-token extractor.

use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use roadworks_core::{
  Error,
  store::{IdentityStore, IssueStore},
  user::Identity,
};

use crate::{AppState, error::ApiError};

/// The actor behind a request: `None` for an anonymous caller.
///
/// No `Authorization` header means anonymous; a header that is present but
/// malformed, unsigned, or forged is rejected outright rather than being
/// downgraded to anonymous.
pub struct CurrentActor(pub Option<Identity>);

impl<S> FromRequestParts<AppState<S>> for CurrentActor
where
  S: IdentityStore + IssueStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
      return Ok(Self(None));
    };

    let value = value
      .to_str()
      .map_err(|_| ApiError(Error::Unauthenticated))?;
    let token = value
      .strip_prefix("Bearer ")
      .ok_or(ApiError(Error::Unauthenticated))?;
    let identity = state
      .engine
      .decode_session(token)
      .ok_or(ApiError(Error::Unauthenticated))?;

    Ok(Self(Some(identity)))
  }
}
