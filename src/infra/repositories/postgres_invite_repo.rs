use crate::domain::{
    models::{invite::{Invite, InviteWithSender}, user::User},
    ports::InviteRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresInviteRepo {
    pool: PgPool,
}

impl PostgresInviteRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteRepository for PostgresInviteRepo {
    async fn create_if_no_active(&self, invite: &Invite, now: DateTime<Utc>) -> Result<Option<Invite>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Serializes creators for the same (organization, email) until commit.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(format!("invite:{}:{}", invite.organization_id, invite.email))
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Invite>(
            "INSERT INTO invites (id, email, role, organization_id, sender_id, token, created_at, expires_at, accepted_at) \
             SELECT $1, $2, $3, $4, $5, $6, $7, $8, NULL \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM invites \
                 WHERE organization_id = $4 AND email = $2 AND accepted_at IS NULL AND expires_at > $9 \
             ) \
             RETURNING *"
        )
            .bind(&invite.id)
            .bind(&invite.email)
            .bind(&invite.role)
            .bind(&invite.organization_id)
            .bind(&invite.sender_id)
            .bind(&invite.token)
            .bind(invite.created_at)
            .bind(invite.expires_at)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Invite>, AppError> {
        sqlx::query_as::<_, Invite>("SELECT * FROM invites WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, organization_id: &str, id: &str) -> Result<Option<Invite>, AppError> {
        sqlx::query_as::<_, Invite>("SELECT * FROM invites WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_with_sender(&self, organization_id: &str) -> Result<Vec<InviteWithSender>, AppError> {
        sqlx::query_as::<_, InviteWithSender>(
            "SELECT i.*, u.first_name AS sender_first_name, u.last_name AS sender_last_name, u.email AS sender_email \
             FROM invites i LEFT JOIN users u ON u.id = i.sender_id \
             WHERE i.organization_id = $1 ORDER BY i.created_at DESC"
        )
            .bind(organization_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn accept(&self, invite: &Invite, user: &User, accepted_at: DateTime<Utc>) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let claimed = sqlx::query("UPDATE invites SET accepted_at = $1 WHERE id = $2 AND accepted_at IS NULL")
            .bind(accepted_at)
            .bind(&invite.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if claimed.rows_affected() == 0 {
            return Err(AppError::AlreadyAccepted);
        }

        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, role, organization_id, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *"
        )
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.role)
            .bind(&user.organization_id)
            .bind(user.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn delete(&self, organization_id: &str, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM invites WHERE organization_id = $1 AND id = $2")
            .bind(organization_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
