use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::json::AppJson;
use crate::api::dtos::requests::UpdateRoleRequest;
use crate::api::extractors::auth::AuthUser;
use serde_json::json;
use std::sync::Arc;

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let users = state.registration_service.list_members(&current).await?;
    Ok(Json(json!({ "users": users })))
}

pub async fn update_user_role(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(user_id): Path<String>,
    AppJson(payload): AppJson<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.registration_service.update_role(&current, &user_id, payload.role).await?;
    Ok(Json(json!({
        "message": "User role updated successfully",
        "user": user,
    })))
}
