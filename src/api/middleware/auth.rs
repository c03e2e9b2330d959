use std::sync::Arc;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, Span};
use crate::domain::models::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Resolves the bearer token to a live user and attaches `CurrentUser`.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("Access token required".into()))?;

    let claims = state.auth_service.verify_token(&token)?;

    let user = state.user_repo.find_by_id(&claims.sub).await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token - user not found".into()))?;

    let current = CurrentUser::from(&user);
    Span::current().record("organization_id", current.organization_id.as_str());
    Span::current().record("user_id", current.id.as_str());
    debug!(role = %current.role, "Authenticated request");

    request.extensions_mut().insert(current);
    Ok(next.run(request).await)
}
