//! Requesting-principal extraction.
//!
//! Authentication itself happens upstream; by the time a request reaches the
//! report handlers, the session middleware has attached the authenticated
//! principal as a request extension. This extractor only surfaces it.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::entities::user;
use crate::errors::ApiError;

/// The authenticated principal making the request, as injected by the
/// upstream session layer.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub user::Model);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}
