use crate::domain::{
    models::audit::{AuditLog, AuditLogWithUser, AuditQuery},
    ports::AuditLogRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresAuditRepo {
    pool: PgPool,
}

impl PostgresAuditRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditRepo {
    async fn create(&self, log: &AuditLog) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO audit_logs (id, action, details, user_id, organization_id, ip_address, user_agent, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        )
            .bind(&log.id)
            .bind(&log.action)
            .bind(&log.details)
            .bind(&log.user_id)
            .bind(&log.organization_id)
            .bind(&log.ip_address)
            .bind(&log.user_agent)
            .bind(log.created_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn list(&self, query: &AuditQuery) -> Result<(Vec<AuditLogWithUser>, i64), AppError> {
        let pattern = query.action_pattern();

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_logs \
             WHERE organization_id = $1 \
             AND ($2::text IS NULL OR action ILIKE $2 ESCAPE '\\') \
             AND ($3::text IS NULL OR user_id = $3)"
        )
            .bind(&query.organization_id)
            .bind(&pattern)
            .bind(&query.user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let logs = sqlx::query_as::<_, AuditLogWithUser>(
            "SELECT a.*, u.first_name AS user_first_name, u.last_name AS user_last_name, u.email AS user_email \
             FROM audit_logs a LEFT JOIN users u ON u.id = a.user_id \
             WHERE a.organization_id = $1 \
             AND ($2::text IS NULL OR a.action ILIKE $2 ESCAPE '\\') \
             AND ($3::text IS NULL OR a.user_id = $3) \
             ORDER BY a.created_at DESC \
             LIMIT $4 OFFSET $5"
        )
            .bind(&query.organization_id)
            .bind(&pattern)
            .bind(&query.user_id)
            .bind(query.limit)
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok((logs, total))
    }
}
