use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::str::FromStr;
use crate::domain::models::audit::AuditLog;
use crate::domain::models::invite::Invite;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEvent {
    InviteCreated,
    InviteAccepted,
    InviteExpired,
}

impl WebhookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEvent::InviteCreated => "invite.created",
            WebhookEvent::InviteAccepted => "invite.accepted",
            WebhookEvent::InviteExpired => "invite.expired",
        }
    }

    pub fn audit_action(&self) -> &'static str {
        match self {
            WebhookEvent::InviteCreated => "WEBHOOK_INVITE_CREATED",
            WebhookEvent::InviteAccepted => "WEBHOOK_INVITE_ACCEPTED",
            WebhookEvent::InviteExpired => "WEBHOOK_INVITE_EXPIRED",
        }
    }

    /// Payload fields copied into the audit details for this event.
    pub fn detail_fields(&self) -> &'static [&'static str] {
        match self {
            WebhookEvent::InviteCreated => &["inviteId", "email", "role", "orgName", "senderEmail"],
            WebhookEvent::InviteAccepted => &["inviteId", "email", "userId"],
            WebhookEvent::InviteExpired => &["inviteId", "email"],
        }
    }
}

impl FromStr for WebhookEvent {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invite.created" => Ok(WebhookEvent::InviteCreated),
            "invite.accepted" => Ok(WebhookEvent::InviteAccepted),
            "invite.expired" => Ok(WebhookEvent::InviteExpired),
            other => Err(AppError::Validation(format!("Unknown event type: {}", other))),
        }
    }
}

/// Body POSTed to the configured webhook endpoint.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WebhookEnvelope {
    pub event: String,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookDelivery {
    Delivered(u16),
    Skipped,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InviteCreatedNotification {
    pub invite_id: String,
    pub email: String,
    pub role: String,
    pub org_id: String,
    pub org_name: String,
    pub sender_name: String,
    pub sender_email: String,
    pub expires_at: DateTime<Utc>,
    pub accept_url: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Work handed to the background notification worker.
#[derive(Debug, Clone)]
pub enum NotificationJob {
    InviteCreated { invite: Invite },
}

impl NotificationJob {
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationJob::InviteCreated { .. } => WebhookEvent::InviteCreated.as_str(),
        }
    }

    pub fn invite_id(&self) -> &str {
        match self {
            NotificationJob::InviteCreated { invite } => &invite.id,
        }
    }
}

/// Outcome of an inbound webhook delivery.
#[derive(Debug, Clone)]
pub struct ReceivedWebhook {
    pub event: WebhookEvent,
    pub audit_log: AuditLog,
}
