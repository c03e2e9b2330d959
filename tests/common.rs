#![allow(dead_code)]

use org_dashboard::{
    api::router::create_router,
    background::start_notification_worker,
    config::Config,
    domain::models::notification::{EmailMessage, WebhookDelivery},
    domain::ports::{Clock, EmailService, WebhookService},
    error::AppError,
    infra::repositories::{
        sqlite_audit_repo::SqliteAuditRepo,
        sqlite_invite_repo::SqliteInviteRepo,
        sqlite_organization_repo::SqliteOrganizationRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
    state::{AppState, Repositories},
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, DurationRound, Utc};
use tower::ServiceExt;
use serde_json::{json, Value};

/// Settable clock. Starts at the current second so issued JWTs stay valid
/// against the real wall clock used by signature validation.
pub struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    pub fn new() -> Self {
        let now = Utc::now().duration_trunc(Duration::seconds(1)).unwrap();
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap() = at;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
pub struct MockEmailService {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail {
            return Err(AppError::InternalWithMsg("simulated mail outage".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockWebhookService {
    pub sent: Mutex<Vec<(String, Value)>>,
    pub fail: bool,
}

#[async_trait]
impl WebhookService for MockWebhookService {
    async fn send(&self, event: &str, data: &Value) -> Result<WebhookDelivery, AppError> {
        self.sent.lock().unwrap().push((event.to_string(), data.clone()));
        if self.fail {
            return Err(AppError::InternalWithMsg("simulated network error".into()));
        }
        Ok(WebhookDelivery::Delivered(200))
    }
}

/// Identity returned by the register/accept helpers.
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub organization_id: String,
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub clock: Arc<TestClock>,
    pub email: Arc<MockEmailService>,
    pub webhook: Arc<MockWebhookService>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(false).await
    }

    /// Both outbound transports fail every send.
    pub async fn with_failing_transports() -> Self {
        Self::build(true).await
    }

    async fn build(fail_transports: bool) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(StdDuration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            app_env: "test".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            webhook_url: None,
            webhook_timeout_secs: 1,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            mail_from: "noreply@test.local".to_string(),
        };

        let clock = Arc::new(TestClock::new());
        let email = Arc::new(MockEmailService { fail: fail_transports, ..Default::default() });
        let webhook = Arc::new(MockWebhookService { fail: fail_transports, ..Default::default() });

        let repos = Repositories {
            organization_repo: Arc::new(SqliteOrganizationRepo::new(pool.clone())),
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            invite_repo: Arc::new(SqliteInviteRepo::new(pool.clone())),
            audit_repo: Arc::new(SqliteAuditRepo::new(pool.clone())),
        };

        let (state, notifications) = AppState::build(
            config,
            repos,
            email.clone(),
            webhook.clone(),
            clock.clone(),
        ).expect("Failed to build state");
        let state = Arc::new(state);

        let worker_state = state.clone();
        tokio::spawn(async move {
            start_notification_worker(worker_state, notifications).await;
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            clock,
            email,
            webhook,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::USER_AGENT, "integration-test");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }

    /// Sends `body` verbatim with the given content type.
    pub async fn request_raw(&self, method: &str, uri: &str, token: Option<&str>, content_type: &str, body: &str) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::USER_AGENT, "integration-test")
            .header(header::CONTENT_TYPE, content_type);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = self.router.clone().oneshot(builder.body(Body::from(body.to_string())).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, json)
    }

    pub async fn register(&self, email: &str, organization_name: &str) -> Session {
        let (status, body) = self.request("POST", "/api/auth/register", None, Some(json!({
            "email": email,
            "password": "password123",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "organizationName": organization_name,
        }))).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        Session {
            token: body["token"].as_str().unwrap().to_string(),
            user_id: body["user"]["id"].as_str().unwrap().to_string(),
            organization_id: body["organization"]["id"].as_str().unwrap().to_string(),
        }
    }

    pub async fn create_invite(&self, token: &str, email: &str, role: &str) -> (StatusCode, Value) {
        self.request("POST", "/api/invites", Some(token), Some(json!({ "email": email, "role": role }))).await
    }

    pub async fn invite_token(&self, invite_id: &str) -> String {
        sqlx::query_scalar("SELECT token FROM invites WHERE id = ?")
            .bind(invite_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Invites `email` into the session's organization with `role` and
    /// accepts it, returning the new member's session.
    pub async fn add_member(&self, admin: &Session, email: &str, role: &str) -> Session {
        let (status, body) = self.create_invite(&admin.token, email, role).await;
        assert_eq!(status, StatusCode::CREATED, "invite failed: {body}");
        let token = self.invite_token(body["invite"]["id"].as_str().unwrap()).await;

        let (status, body) = self.request("POST", &format!("/api/invites/accept/{}", token), None, Some(json!({
            "password": "password123",
            "firstName": "Grace",
            "lastName": "Hopper",
        }))).await;
        assert_eq!(status, StatusCode::OK, "accept failed: {body}");

        Session {
            token: body["token"].as_str().unwrap().to_string(),
            user_id: body["user"]["id"].as_str().unwrap().to_string(),
            organization_id: body["organization"]["id"].as_str().unwrap().to_string(),
        }
    }

    pub async fn audit_count(&self, action: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE action = ?")
            .bind(action)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Audit writes are detached from the response; poll until they land.
    pub async fn wait_for_audit(&self, action: &str, expected: i64) -> i64 {
        let mut count = 0;
        for _ in 0..50 {
            count = self.audit_count(action).await;
            if count >= expected {
                break;
            }
            tokio::time::sleep(StdDuration::from_millis(20)).await;
        }
        count
    }

    /// Gives detached tasks a chance to run before asserting on absence.
    pub async fn settle(&self) {
        tokio::time::sleep(StdDuration::from_millis(150)).await;
    }

    pub async fn wait_for_emails(&self, expected: usize) -> Vec<EmailMessage> {
        for _ in 0..50 {
            if self.email.sent.lock().unwrap().len() >= expected {
                break;
            }
            tokio::time::sleep(StdDuration::from_millis(20)).await;
        }
        self.email.sent.lock().unwrap().clone()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
