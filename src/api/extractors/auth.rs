use axum::{extract::FromRequestParts, http::request::Parts};
use crate::domain::models::auth::CurrentUser;
use crate::error::AppError;

/// Identity attached by the `require_auth` middleware.
pub struct AuthUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions
            .get::<CurrentUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Access token required".into()))
    }
}
