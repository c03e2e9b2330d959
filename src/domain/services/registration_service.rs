use std::sync::Arc;
use crate::domain::models::{
    auth::CurrentUser,
    organization::Organization,
    user::{normalize_email, validate_email, Role, User},
};
use crate::domain::ports::{Clock, OrganizationRepository, UserRepository};
use crate::domain::services::{
    access_policy::{authorize, ADMIN_ONLY, ADMIN_OR_MANAGER},
    auth_service::AuthService,
    validation::{require, validate_password},
};
use crate::error::AppError;
use tracing::info;

#[derive(Debug, Default)]
pub struct RegisterInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organization_name: Option<String>,
}

#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub organization: Organization,
    pub token: String,
}

/// Creates the first user of a new organization, issues sessions and
/// manages member roles inside an organization.
pub struct RegistrationService {
    organization_repo: Arc<dyn OrganizationRepository>,
    user_repo: Arc<dyn UserRepository>,
    auth_service: Arc<AuthService>,
    clock: Arc<dyn Clock>,
}

impl RegistrationService {
    pub fn new(
        organization_repo: Arc<dyn OrganizationRepository>,
        user_repo: Arc<dyn UserRepository>,
        auth_service: Arc<AuthService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { organization_repo, user_repo, auth_service, clock }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<Session, AppError> {
        const MISSING: &str = "All fields are required";
        let email = normalize_email(&require(input.email, MISSING)?);
        let password = input.password.filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation(MISSING.into()))?;
        let first_name = require(input.first_name, MISSING)?;
        let last_name = require(input.last_name, MISSING)?;
        let organization_name = require(input.organization_name, MISSING)?;
        validate_email(&email)?;
        validate_password(&password)?;

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("User already exists with this email".into()));
        }

        let now = self.clock.now();
        let password_hash = self.auth_service.hash_password(&password)?;
        let organization = Organization::new(organization_name, now);
        let admin = User::new(organization.id.clone(), email, password_hash, first_name, last_name, Role::Admin, now);

        let (organization, user) = self.organization_repo
            .create_with_admin(&organization, &admin)
            .await
            .map_err(|e| e.conflict_on_unique("User already exists with this email"))?;

        let token = self.auth_service.issue_token(&user, now)?;
        info!(user_id = %user.id, organization_id = %organization.id, "Registered organization");

        Ok(Session { user, organization, token })
    }

    pub async fn login(&self, email: Option<String>, password: Option<String>) -> Result<Session, AppError> {
        const MISSING: &str = "Email and password are required";
        let email = normalize_email(&require(email, MISSING)?);
        let password = password.filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation(MISSING.into()))?;

        let user = self.user_repo.find_by_email(&email).await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

        if !self.auth_service.verify_password(&password, &user.password_hash) {
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }

        let organization = self.organization_repo.find_by_id(&user.organization_id).await?
            .ok_or_else(|| AppError::InternalWithMsg(format!("User {} has no organization", user.id)))?;

        let token = self.auth_service.issue_token(&user, self.clock.now())?;
        info!(user_id = %user.id, "User logged in");

        Ok(Session { user, organization, token })
    }

    pub async fn profile(&self, actor: &CurrentUser) -> Result<(User, Organization), AppError> {
        let user = self.user_repo.find_by_id(&actor.id).await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        let organization = self.organization_repo.find_by_id(&user.organization_id).await?
            .ok_or_else(|| AppError::NotFound("Organization not found".into()))?;
        Ok((user, organization))
    }

    pub async fn list_members(&self, actor: &CurrentUser) -> Result<Vec<User>, AppError> {
        authorize(actor, ADMIN_OR_MANAGER)?;
        self.user_repo.list_by_organization(&actor.organization_id).await
    }

    pub async fn update_role(&self, actor: &CurrentUser, user_id: &str, role: Option<String>) -> Result<User, AppError> {
        authorize(actor, ADMIN_ONLY)?;

        let role: Role = require(role, "Role is required")?.parse()?;

        let target = self.user_repo.find_in_organization(&actor.organization_id, user_id).await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        if target.id == actor.id && role != Role::Admin {
            return Err(AppError::Validation("Cannot remove your own admin privileges".into()));
        }

        let updated = self.user_repo.update_role(&actor.organization_id, &target.id, role.as_str()).await?;
        info!(user_id = %updated.id, role = %role, "User role updated");
        Ok(updated)
    }
}
