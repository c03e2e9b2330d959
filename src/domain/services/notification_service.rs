use std::sync::Arc;
use crate::domain::models::{
    invite::Invite,
    notification::{InviteCreatedNotification, NotificationJob, ReceivedWebhook, WebhookEvent},
    organization::Organization,
    user::User,
};
use crate::domain::services::audit_service::AuditRecorder;
use crate::error::AppError;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info, warn};

pub type NotificationReceiver = UnboundedReceiver<NotificationJob>;

/// Outbound fan-out is queued to the background worker; inbound webhook
/// events are turned into audit records.
pub struct NotificationService {
    tx: UnboundedSender<NotificationJob>,
    audit: Arc<AuditRecorder>,
}

impl NotificationService {
    pub fn new(audit: Arc<AuditRecorder>) -> (Self, NotificationReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, audit }, rx)
    }

    /// Never blocks and never fails the caller.
    pub fn schedule(&self, job: NotificationJob) {
        let kind = job.kind();
        let invite_id = job.invite_id().to_string();
        if self.tx.send(job).is_err() {
            error!(event = kind, invite_id = %invite_id, "Notification worker is gone, dropping job");
        }
    }

    pub async fn receive(&self, payload: &Value) -> Result<ReceivedWebhook, AppError> {
        let event = payload.get("event").and_then(Value::as_str).filter(|e| !e.is_empty());
        let data = payload.get("data").filter(|d| !d.is_null());

        let (event, data) = match (event, data) {
            (Some(event), Some(data)) => (event, data),
            _ => {
                warn!("Invalid webhook payload - missing event or data");
                return Err(AppError::Validation("Invalid webhook payload: event and data are required".into()));
            }
        };

        let event: WebhookEvent = event.parse().inspect_err(|_| warn!("Unknown webhook event: {}", event))?;

        let organization_id = data
            .get("orgId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Validation("Webhook data is missing orgId".into()))?;

        let audit_log = self.audit.record_webhook_event(event, organization_id, data).await?;
        info!(event = event.as_str(), organization_id, "Processed inbound webhook");

        Ok(ReceivedWebhook { event, audit_log })
    }
}

pub fn build_invite_created(
    invite: &Invite,
    organization: &Organization,
    sender: &User,
    accept_url: String,
) -> InviteCreatedNotification {
    InviteCreatedNotification {
        invite_id: invite.id.clone(),
        email: invite.email.clone(),
        role: invite.role.clone(),
        org_id: organization.id.clone(),
        org_name: organization.name.clone(),
        sender_name: sender.display_name(),
        sender_email: sender.email.clone(),
        expires_at: invite.expires_at,
        accept_url,
    }
}
