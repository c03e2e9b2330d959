use axum::{extract::{Query, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::{
    requests::AuditListQuery,
    responses::{AuditLogPage, AuditLogView, Pagination},
};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::audit::AuditQuery;
use crate::domain::services::access_policy::{authorize, ADMIN_OR_MANAGER};
use std::sync::Arc;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

pub async fn list_audit_logs(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Query(params): Query<AuditListQuery>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&current, ADMIN_OR_MANAGER)?;

    let query = AuditQuery {
        organization_id: current.organization_id.clone(),
        action: params.action.filter(|a| !a.trim().is_empty()),
        user_id: params.user_id.filter(|u| !u.is_empty()),
        page: params.page.unwrap_or(1).max(1),
        limit: params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
    };

    let (rows, total) = state.audit_recorder.list(&query).await?;

    Ok(Json(AuditLogPage {
        audit_logs: rows.into_iter().map(AuditLogView::from).collect(),
        pagination: Pagination::new(query.page, query.limit, total),
    }))
}
