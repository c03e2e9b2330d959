use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub app_env: String,
    pub frontend_url: String,
    pub webhook_url: Option<String>,
    pub webhook_timeout_secs: u64,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub mail_from: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            frontend_url: env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string()),
            webhook_url: env::var("WEBHOOK_URL").ok().filter(|url| !url.trim().is_empty()),
            webhook_timeout_secs: env::var("WEBHOOK_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(5),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| "Org Dashboard <noreply@localhost>".to_string()),
        }
    }

    /// Webhooks only leave the process when running in production.
    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn accept_url(&self, token: &str) -> String {
        format!("{}/accept-invite/{}", self.frontend_url.trim_end_matches('/'), token)
    }
}
