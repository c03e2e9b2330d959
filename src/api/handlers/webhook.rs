use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::extractors::json::AppJson;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

/// Ingress for notification events routed back from the webhook relay.
pub async fn receive_invite_webhook(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<Value>,
) -> Result<impl IntoResponse, AppError> {
    let received = state.notification_service.receive(&payload).await?;

    Ok(Json(json!({
        "message": "Webhook processed successfully",
        "event": received.event.as_str(),
        "auditLogId": received.audit_log.id,
        "timestamp": Utc::now(),
    })))
}

pub async fn webhook_test() -> impl IntoResponse {
    Json(json!({
        "message": "Webhook endpoint is working",
        "timestamp": Utc::now(),
        "endpoints": ["POST /api/webhooks/invite - Handle invite webhooks"],
    }))
}
