use std::sync::Arc;
use std::time::Duration;
use crate::config::Config;
use crate::domain::{
    models::notification::{WebhookDelivery, WebhookEnvelope},
    ports::{Clock, WebhookService},
};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info};

pub const WEBHOOK_USER_AGENT: &str = "org-dashboard-webhook/1.0";

/// Delivers outbound events to `WEBHOOK_URL`. Outside production, or with
/// no URL configured, every call is a no-op.
pub struct HttpWebhookService {
    client: Client,
    url: Option<String>,
    enabled: bool,
    clock: Arc<dyn Clock>,
}

impl HttpWebhookService {
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.webhook_timeout_secs))
            .user_agent(WEBHOOK_USER_AGENT)
            .build()
            .map_err(|e| AppError::InternalWithMsg(format!("Failed to build webhook client: {}", e)))?;

        Ok(Self {
            client,
            url: config.webhook_url.clone(),
            enabled: config.is_production(),
            clock,
        })
    }
}

#[async_trait]
impl WebhookService for HttpWebhookService {
    async fn send(&self, event: &str, data: &Value) -> Result<WebhookDelivery, AppError> {
        let url = match (&self.url, self.enabled) {
            (Some(url), true) => url,
            _ => {
                debug!(event, "Webhook delivery skipped (not production or no WEBHOOK_URL)");
                return Ok(WebhookDelivery::Skipped);
            }
        };

        let envelope = WebhookEnvelope {
            event: event.to_string(),
            data: data.clone(),
            timestamp: self.clock.now(),
        };

        let res = self.client.post(url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Webhook connection error: {}", e);
                error!(event, "{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        let status = res.status();
        if !status.is_success() {
            let msg = format!("Webhook endpoint responded with status {}", status);
            error!(event, "{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        info!(event, status = status.as_u16(), "Webhook delivered");
        Ok(WebhookDelivery::Delivered(status.as_u16()))
    }
}
