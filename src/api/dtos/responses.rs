use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::models::{
    audit::{AuditLog, AuditLogWithUser},
    invite::{Invite, InviteStatus, InviteWithSender},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteSummary {
    pub id: String,
    pub email: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<&Invite> for InviteSummary {
    fn from(invite: &Invite) -> Self {
        Self {
            id: invite.id.clone(),
            email: invite.email.clone(),
            role: invite.role.clone(),
            expires_at: invite.expires_at,
            created_at: invite.created_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderView {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct InviteView {
    #[serde(flatten)]
    pub invite: Invite,
    pub status: InviteStatus,
    pub sender: Option<SenderView>,
}

impl InviteView {
    pub fn new(row: InviteWithSender, now: DateTime<Utc>) -> Self {
        let sender = row.sender_email.is_some().then(|| SenderView {
            first_name: row.sender_first_name,
            last_name: row.sender_last_name,
            email: row.sender_email,
        });
        Self {
            status: row.invite.status(now),
            invite: row.invite,
            sender,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditUserView {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct AuditLogView {
    #[serde(flatten)]
    pub log: AuditLog,
    pub user: Option<AuditUserView>,
}

impl From<AuditLogWithUser> for AuditLogView {
    fn from(row: AuditLogWithUser) -> Self {
        let user = match (&row.log.user_id, row.user_email) {
            (Some(id), Some(email)) => Some(AuditUserView {
                id: id.clone(),
                first_name: row.user_first_name,
                last_name: row.user_last_name,
                email: Some(email),
            }),
            _ => None,
        };
        Self { log: row.log, user }
    }
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self { page, limit, total, pages }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogPage {
    pub audit_logs: Vec<AuditLogView>,
    pub pagination: Pagination,
}
