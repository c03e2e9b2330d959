use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use serde_json::Value;

pub mod actions {
    pub const USER_REGISTER: &str = "USER_REGISTER";
    pub const USER_LOGIN: &str = "USER_LOGIN";
    pub const USER_LOGOUT: &str = "USER_LOGOUT";
    pub const USER_ROLE_UPDATED: &str = "USER_ROLE_UPDATED";
    pub const INVITE_SENT: &str = "INVITE_SENT";
    pub const INVITE_ACCEPTED: &str = "INVITE_ACCEPTED";
    pub const INVITE_CANCELLED: &str = "INVITE_CANCELLED";
}

pub const WEBHOOK_ORIGIN: &str = "webhook";
pub const WEBHOOK_USER_AGENT: &str = "webhook-processor";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,
    pub action: String,
    pub details: Json<Value>,
    pub user_id: Option<String>,
    pub organization_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        action: &str,
        details: Value,
        user_id: Option<String>,
        organization_id: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action: action.to_string(),
            details: Json(details),
            user_id,
            organization_id,
            ip_address,
            user_agent,
            created_at: now,
        }
    }
}

#[derive(Debug, FromRow, Clone)]
pub struct AuditLogWithUser {
    #[sqlx(flatten)]
    pub log: AuditLog,
    pub user_first_name: Option<String>,
    pub user_last_name: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuditQuery {
    pub organization_id: String,
    pub action: Option<String>,
    pub user_id: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl AuditQuery {
    /// Saturates for page numbers past the end of any realistic table.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// `%needle%` for a case-insensitive substring match. LIKE wildcards in
    /// the needle are escaped with `\`.
    pub fn action_pattern(&self) -> Option<String> {
        self.action.as_ref().map(|a| {
            let mut escaped = String::with_capacity(a.len());
            for c in a.to_lowercase().chars() {
                if matches!(c, '%' | '_' | '\\') {
                    escaped.push('\\');
                }
                escaped.push(c);
            }
            format!("%{}%", escaped)
        })
    }
}
