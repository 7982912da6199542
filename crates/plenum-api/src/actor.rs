//! Resolving the acting user from the request.
//!
//! Session handling is out of scope; the deployment fronts this API with a
//! proxy that authenticates and forwards the user id in a header. An absent
//! header is a guest, an unknown id too — both get the guest denials rather
//! than an error.

use axum::http::HeaderMap;
use plenum_core::{actor::Actor, store::RecordStore};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_HEADER: &str = "x-user-id";

pub async fn resolve_actor<S>(
  store: &S,
  headers: &HeaderMap,
) -> Result<Actor, ApiError>
where
  S: RecordStore,
{
  let Some(value) = headers.get(USER_HEADER) else {
    return Ok(Actor::guest());
  };
  let id = value
    .to_str()
    .ok()
    .and_then(|s| Uuid::parse_str(s).ok())
    .ok_or_else(|| {
      ApiError::BadRequest(format!("malformed {USER_HEADER} header"))
    })?;
  let user = store
    .user(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(user.as_ref().map_or_else(Actor::guest, Actor::from_user))
}
