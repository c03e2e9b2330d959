use crate::domain::{models::{organization::Organization, user::User}, ports::OrganizationRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresOrganizationRepo {
    pool: PgPool,
}

impl PostgresOrganizationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepo {
    async fn create_with_admin(&self, organization: &Organization, admin: &User) -> Result<(Organization, User), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (id, name, created_at) VALUES ($1, $2, $3) RETURNING *"
        )
            .bind(&organization.id)
            .bind(&organization.name)
            .bind(organization.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, role, organization_id, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *"
        )
            .bind(&admin.id)
            .bind(&admin.email)
            .bind(&admin.password_hash)
            .bind(&admin.first_name)
            .bind(&admin.last_name)
            .bind(&admin.role)
            .bind(&created.id)
            .bind(admin.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok((created, user))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Organization>, AppError> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
