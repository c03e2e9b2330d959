use axum::{
    body::Body,
    extract::Request,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{audit, auth, health, invite, user, webhook};
use crate::api::middleware::{audit::audit_trail, auth::require_auth};
use crate::domain::models::audit::actions;
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    let audit_state = state.clone();
    let audited = move |action: &'static str| {
        middleware::from_fn_with_state((audit_state.clone(), action), audit_trail)
    };

    let protected = Router::new()
        // Session
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout).layer(audited(actions::USER_LOGOUT)))

        // Invites
        .route("/api/invites", get(invite::list_invites))
        .route("/api/invites", post(invite::create_invite).layer(audited(actions::INVITE_SENT)))
        .route("/api/invites/{id}", delete(invite::cancel_invite).layer(audited(actions::INVITE_CANCELLED)))

        // Members
        .route("/api/users", get(user::list_users))
        .route("/api/users/{id}/role", put(user::update_user_role).layer(audited(actions::USER_ROLE_UPDATED)))

        // Audit trail
        .route("/api/audit", get(audit::list_audit_logs))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/health", get(health::health_check))

        // Credential issuance
        .route("/api/auth/register", post(auth::register).layer(audited(actions::USER_REGISTER)))
        .route("/api/auth/login", post(auth::login).layer(audited(actions::USER_LOGIN)))

        // Invite acceptance is authenticated by the token in the path
        .route("/api/invites/accept/{token}", post(invite::accept_invite).layer(audited(actions::INVITE_ACCEPTED)))

        // Webhook ingress
        .route("/api/webhooks/invite", post(webhook::receive_invite_webhook))
        .route("/api/webhooks/test", get(webhook::webhook_test));

    public
        .merge(protected)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        organization_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
