use crate::domain::models::{
    organization::Organization, user::User, invite::{Invite, InviteWithSender},
    audit::{AuditLog, AuditLogWithUser, AuditQuery},
    notification::{EmailMessage, WebhookDelivery},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Persists the organization and its first admin atomically.
    async fn create_with_admin(&self, organization: &Organization, admin: &User) -> Result<(Organization, User), AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Organization>, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_in_organization(&self, organization_id: &str, id: &str) -> Result<Option<User>, AppError>;
    async fn find_in_organization_by_email(&self, organization_id: &str, email: &str) -> Result<Option<User>, AppError>;
    async fn list_by_organization(&self, organization_id: &str) -> Result<Vec<User>, AppError>;
    async fn update_role(&self, organization_id: &str, id: &str, role: &str) -> Result<User, AppError>;
}

#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Inserts the invite unless an active one already exists for the same
    /// (email, organization). `Ok(None)` means one does.
    async fn create_if_no_active(&self, invite: &Invite, now: DateTime<Utc>) -> Result<Option<Invite>, AppError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<Invite>, AppError>;
    async fn find_by_id(&self, organization_id: &str, id: &str) -> Result<Option<Invite>, AppError>;
    async fn list_with_sender(&self, organization_id: &str) -> Result<Vec<InviteWithSender>, AppError>;
    /// Creates `user` and stamps `accepted_at` in one transaction.
    async fn accept(&self, invite: &Invite, user: &User, accepted_at: DateTime<Utc>) -> Result<User, AppError>;
    async fn delete(&self, organization_id: &str, id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn create(&self, log: &AuditLog) -> Result<(), AppError>;
    async fn list(&self, query: &AuditQuery) -> Result<(Vec<AuditLogWithUser>, i64), AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError>;
}

#[async_trait]
pub trait WebhookService: Send + Sync {
    async fn send(&self, event: &str, data: &Value) -> Result<WebhookDelivery, AppError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
