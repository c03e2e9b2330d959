use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::json::AppJson;
use crate::api::dtos::requests::{LoginRequest, RegisterRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::{auth::CurrentUser, organization::OrganizationSummary};
use crate::domain::services::registration_service::RegisterInput;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.registration_service.register(RegisterInput {
        email: payload.email,
        password: payload.password,
        first_name: payload.first_name,
        last_name: payload.last_name,
        organization_name: payload.organization_name,
    }).await?;

    info!("Registered user {} for organization {}", session.user.id, session.organization.id);

    Ok((
        StatusCode::CREATED,
        Extension(CurrentUser::from(&session.user)),
        Json(json!({
            "message": "Registration successful",
            "user": session.user,
            "organization": OrganizationSummary::from(&session.organization),
            "token": session.token,
        })),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.registration_service.login(payload.email, payload.password).await?;

    Ok((
        Extension(CurrentUser::from(&session.user)),
        Json(json!({
            "message": "Login successful",
            "user": session.user,
            "organization": OrganizationSummary::from(&session.organization),
            "token": session.token,
        })),
    ))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let (user, organization) = state.registration_service.profile(&current).await?;
    Ok(Json(json!({
        "user": user,
        "organization": OrganizationSummary::from(&organization),
    })))
}

/// Tokens are stateless; logout exists so the event lands in the audit trail.
pub async fn logout(AuthUser(current): AuthUser) -> impl IntoResponse {
    info!("User logged out: {}", current.id);
    Json(json!({ "message": "Logout successful" }))
}
