use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use crate::domain::models::{
    invite::Invite,
    notification::{NotificationJob, WebhookDelivery, WebhookEvent},
};
use crate::domain::services::{
    notification_service::{build_invite_created, NotificationReceiver},
    templates::render_invite_email,
};
use crate::state::AppState;

/// Drains the notification queue until every sender is dropped. Each job
/// runs on its own task so a slow endpoint never holds up the next invite.
pub async fn start_notification_worker(state: Arc<AppState>, mut rx: NotificationReceiver) {
    info!("Starting notification worker...");

    while let Some(job) = rx.recv().await {
        let span = info_span!(
            "notification",
            event = job.kind(),
            invite_id = %job.invite_id()
        );

        let state = state.clone();
        tokio::spawn(
            async move {
                process_job(&state, job).await;
            }
            .instrument(span),
        );
    }

    warn!("Notification channel closed, worker exiting");
}

async fn process_job(state: &AppState, job: NotificationJob) {
    match job {
        NotificationJob::InviteCreated { invite } => deliver_invite_created(state, &invite).await,
    }
}

// Webhook and email are attempted independently; neither outcome is
// reported back to the request that scheduled them.
async fn deliver_invite_created(state: &AppState, invite: &Invite) {
    let event = WebhookEvent::InviteCreated.as_str();

    let organization = match state.organization_repo.find_by_id(&invite.organization_id).await {
        Ok(Some(org)) => org,
        Ok(None) => {
            error!(event, invite_id = %invite.id, "Organization missing for invite, dropping notification");
            return;
        }
        Err(e) => {
            error!(event, invite_id = %invite.id, "Failed to load organization: {}", e);
            return;
        }
    };

    let sender = match state.user_repo.find_by_id(&invite.sender_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            error!(event, invite_id = %invite.id, "Sender missing for invite, dropping notification");
            return;
        }
        Err(e) => {
            error!(event, invite_id = %invite.id, "Failed to load sender: {}", e);
            return;
        }
    };

    let notification = build_invite_created(
        invite,
        &organization,
        &sender,
        state.config.accept_url(&invite.token),
    );

    match serde_json::to_value(&notification) {
        Ok(data) => match state.webhook_service.send(event, &data).await {
            Ok(WebhookDelivery::Delivered(status)) => info!(event, status, "Webhook sent"),
            Ok(WebhookDelivery::Skipped) => debug!(event, "Webhook skipped"),
            Err(e) => error!(event, invite_id = %invite.id, "Webhook delivery failed: {}", e),
        },
        Err(e) => error!(event, invite_id = %invite.id, "Failed to encode webhook payload: {}", e),
    }

    match render_invite_email(&state.templates, &notification) {
        Ok(message) => match state.email_service.send(&message).await {
            Ok(()) => info!(event, to = %message.to, "Invitation email sent"),
            Err(e) => error!(event, invite_id = %invite.id, "Invitation email failed: {}", e),
        },
        Err(e) => error!(event, invite_id = %invite.id, "Failed to render invitation email: {}", e),
    }
}
