use std::sync::Arc;
use crate::domain::models::{
    audit::{AuditLog, AuditLogWithUser, AuditQuery, WEBHOOK_ORIGIN, WEBHOOK_USER_AGENT},
    auth::CurrentUser,
    notification::WebhookEvent,
};
use crate::domain::ports::{AuditLogRepository, Clock};
use crate::error::AppError;
use serde_json::{json, Map, Value};
use tracing::{debug, error};

const REDACTED_KEYS: &[&str] = &["password", "token"];

/// Request-side facts captured before the handler runs.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub action: String,
    pub method: String,
    pub path: String,
    pub request_body: Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

pub struct AuditRecorder {
    repo: Arc<dyn AuditLogRepository>,
    clock: Arc<dyn Clock>,
}

impl AuditRecorder {
    pub fn new(repo: Arc<dyn AuditLogRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub fn should_record(status: u16, actor: Option<&CurrentUser>) -> bool {
        (200..=299).contains(&status) && actor.is_some()
    }

    /// Post-handler hook. Returns whether a write was scheduled; the write
    /// itself runs detached and its failure is only logged.
    pub fn record(&self, entry: AuditEntry, status: u16, response_body: Value, actor: Option<&CurrentUser>) -> bool {
        let actor = match actor {
            Some(actor) if Self::should_record(status, Some(actor)) => actor,
            _ => {
                debug!(action = %entry.action, status, "Audit skipped");
                return false;
            }
        };

        let details = json!({
            "method": entry.method,
            "url": entry.path,
            "body": redact(entry.request_body),
            "response": redact(response_body),
        });

        let log = AuditLog::new(
            &entry.action,
            details,
            Some(actor.id.clone()),
            actor.organization_id.clone(),
            entry.ip_address,
            entry.user_agent,
            self.clock.now(),
        );

        let repo = self.repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.create(&log).await {
                error!(
                    action = %log.action,
                    organization_id = %log.organization_id,
                    user_id = ?log.user_id,
                    "Audit log write failed: {}", e
                );
            }
        });
        true
    }

    /// Webhook-originated events carry no acting user.
    pub async fn record_webhook_event(&self, event: WebhookEvent, organization_id: &str, data: &Value) -> Result<AuditLog, AppError> {
        let mut details = Map::new();
        details.insert("event".into(), json!(event.as_str()));
        for field in event.detail_fields() {
            if let Some(value) = data.get(*field) {
                details.insert((*field).to_string(), value.clone());
            }
        }

        let log = AuditLog::new(
            event.audit_action(),
            Value::Object(details),
            None,
            organization_id.to_string(),
            Some(WEBHOOK_ORIGIN.to_string()),
            Some(WEBHOOK_USER_AGENT.to_string()),
            self.clock.now(),
        );
        self.repo.create(&log).await?;
        Ok(log)
    }

    pub async fn list(&self, query: &AuditQuery) -> Result<(Vec<AuditLogWithUser>, i64), AppError> {
        self.repo.list(query).await
    }
}

/// Masks credential-bearing keys at any depth.
pub fn redact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    if REDACTED_KEYS.contains(&k.as_str()) {
                        (k, json!("[REDACTED]"))
                    } else {
                        (k, redact(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact).collect()),
        other => other,
    }
}
