use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{ConnectInfo, Request, State},
    http::{header::USER_AGENT, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::error;
use crate::domain::models::auth::CurrentUser;
use crate::domain::services::audit_service::{AuditEntry, AuditRecorder};
use crate::error::AppError;
use crate::state::AppState;

const MAX_AUDITED_BODY: usize = 1024 * 1024;

/// Observes the final status and body of an audited route and hands them to
/// the recorder. The response is returned without waiting for the write.
///
/// The acting identity is whatever `require_auth` attached to the request, or,
/// for routes that establish the identity themselves (register, login,
/// accept), the `CurrentUser` the handler placed on the response.
pub async fn audit_trail(
    State((state, action)): State<(Arc<AppState>, &'static str)>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let request_bytes = match to_bytes(body, MAX_AUDITED_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => return AppError::Validation("Request body too large".into()).into_response(),
    };

    let entry = AuditEntry {
        action: action.to_string(),
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        request_body: parse_json(&request_bytes),
        ip_address: client_ip(&parts.headers, parts.extensions.get::<ConnectInfo<SocketAddr>>()),
        user_agent: parts.headers.get(USER_AGENT).and_then(|v| v.to_str().ok()).map(str::to_string),
    };
    let request_actor = parts.extensions.get::<CurrentUser>().cloned();

    let response = next.run(Request::from_parts(parts, Body::from(request_bytes))).await;

    let actor = request_actor.or_else(|| response.extensions().get::<CurrentUser>().cloned());
    let status = response.status().as_u16();
    if !AuditRecorder::should_record(status, actor.as_ref()) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let response_bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(action, "Failed to buffer response for audit: {}", e);
            return AppError::Internal.into_response();
        }
    };

    state.audit_recorder.record(entry, status, parse_json(&response_bytes), actor.as_ref());

    Response::from_parts(parts, Body::from(response_bytes))
}

fn parse_json(bytes: &Bytes) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}

/// First hop of `X-Forwarded-For`, else the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|ConnectInfo(addr)| addr.ip().to_string()))
}
