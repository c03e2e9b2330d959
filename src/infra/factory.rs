use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::ports::Clock;
use crate::domain::services::notification_service::NotificationReceiver;
use crate::state::{AppState, Repositories};
use crate::infra::clock::SystemClock;
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::webhook::http_webhook_service::HttpWebhookService;
use crate::infra::repositories::{
    postgres_audit_repo::PostgresAuditRepo, postgres_invite_repo::PostgresInviteRepo,
    postgres_organization_repo::PostgresOrganizationRepo, postgres_user_repo::PostgresUserRepo,
    sqlite_audit_repo::SqliteAuditRepo, sqlite_invite_repo::SqliteInviteRepo,
    sqlite_organization_repo::SqliteOrganizationRepo, sqlite_user_repo::SqliteUserRepo,
};

pub async fn bootstrap_state(config: &Config) -> (AppState, NotificationReceiver) {
    let database_url = &config.database_url;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let email_service = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
        config.mail_from.clone(),
    ));
    let webhook_service = Arc::new(
        HttpWebhookService::new(config, clock.clone()).expect("Failed to build webhook client"),
    );

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        Repositories {
            organization_repo: Arc::new(PostgresOrganizationRepo::new(pool.clone())),
            user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
            invite_repo: Arc::new(PostgresInviteRepo::new(pool.clone())),
            audit_repo: Arc::new(PostgresAuditRepo::new(pool)),
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        Repositories {
            organization_repo: Arc::new(SqliteOrganizationRepo::new(pool.clone())),
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            invite_repo: Arc::new(SqliteInviteRepo::new(pool.clone())),
            audit_repo: Arc::new(SqliteAuditRepo::new(pool)),
        }
    };

    AppState::build(config.clone(), repos, email_service, webhook_service, clock)
        .expect("Failed to assemble application state")
}

pub async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
