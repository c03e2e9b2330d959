use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Extension, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::json::AppJson;
use crate::api::dtos::{
    requests::{AcceptInviteRequest, CreateInviteRequest},
    responses::{InviteSummary, InviteView},
};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::{auth::CurrentUser, organization::OrganizationSummary};
use crate::domain::services::invite_service::{AcceptInvite, CreateInvite};
use serde_json::json;
use std::sync::Arc;

pub async fn create_invite(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    AppJson(payload): AppJson<CreateInviteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invite = state.invite_service.create(&current, CreateInvite {
        email: payload.email,
        role: payload.role,
    }).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Invite sent successfully",
            "invite": InviteSummary::from(&invite),
        })),
    ))
}

pub async fn list_invites(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let now = state.clock.now();
    let invites: Vec<InviteView> = state.invite_service.list(&current).await?
        .into_iter()
        .map(|row| InviteView::new(row, now))
        .collect();

    Ok(Json(json!({ "invites": invites })))
}

pub async fn accept_invite(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    AppJson(payload): AppJson<AcceptInviteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let accepted = state.invite_service.accept(&token, AcceptInvite {
        password: payload.password,
        first_name: payload.first_name,
        last_name: payload.last_name,
    }).await?;

    Ok((
        Extension(CurrentUser::from(&accepted.user)),
        Json(json!({
            "message": "Invite accepted successfully",
            "user": accepted.user,
            "organization": OrganizationSummary::from(&accepted.organization),
            "token": accepted.token,
        })),
    ))
}

pub async fn cancel_invite(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(invite_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invite = state.invite_service.cancel(&current, &invite_id).await?;

    Ok(Json(json!({
        "message": "Invite cancelled successfully",
        "invite": InviteSummary::from(&invite),
    })))
}
