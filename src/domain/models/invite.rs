use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use rand::{rngs::OsRng, RngCore};
use crate::domain::models::user::Role;

pub const INVITE_TTL_DAYS: i64 = 7;
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InviteStatus {
    Pending,
    Expired,
    Accepted,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub id: String,
    pub email: String,
    pub role: String,
    pub organization_id: String,
    pub sender_id: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invite {
    pub fn new(email: String, role: Role, organization_id: String, sender_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            role: role.as_str().to_string(),
            organization_id,
            sender_id,
            token: generate_invite_token(),
            created_at: now,
            expires_at: now + Duration::days(INVITE_TTL_DAYS),
            accepted_at: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Member)
    }

    /// Pending requires `expires_at > now`, so the deadline instant itself is
    /// already expired and no longer acceptable.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted_at.is_some()
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_accepted() && !self.is_expired(now)
    }

    pub fn status(&self, now: DateTime<Utc>) -> InviteStatus {
        if self.is_accepted() {
            InviteStatus::Accepted
        } else if self.is_expired(now) {
            InviteStatus::Expired
        } else {
            InviteStatus::Pending
        }
    }

    pub fn regenerate_token(&mut self) {
        self.token = generate_invite_token();
    }
}

/// 256 bits from the OS CSPRNG, hex encoded.
pub fn generate_invite_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Debug, FromRow, Clone)]
pub struct InviteWithSender {
    #[sqlx(flatten)]
    pub invite: Invite,
    pub sender_first_name: Option<String>,
    pub sender_last_name: Option<String>,
    pub sender_email: Option<String>,
}
