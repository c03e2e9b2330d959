use std::sync::Arc;
use crate::domain::models::{
    auth::CurrentUser,
    invite::{Invite, InviteWithSender},
    notification::NotificationJob,
    organization::Organization,
    user::{normalize_email, validate_email, Role, User},
};
use crate::domain::ports::{Clock, InviteRepository, OrganizationRepository, UserRepository};
use crate::domain::services::{
    access_policy::{authorize, ADMIN_ONLY, ADMIN_OR_MANAGER},
    auth_service::AuthService,
    notification_service::NotificationService,
    validation::{require, validate_password},
};
use crate::error::AppError;
use tracing::{info, warn};

const MAX_TOKEN_ATTEMPTS: usize = 3;

#[derive(Debug, Default)]
pub struct CreateInvite {
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default)]
pub struct AcceptInvite {
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug)]
pub struct AcceptedInvite {
    pub user: User,
    pub organization: Organization,
    pub token: String,
}

/// Owns invite issuance, acceptance and cancellation.
///
/// Expiry is never stored: it is derived from `expires_at` against the
/// injected clock. Cancellation physically removes the row.
pub struct InviteService {
    invite_repo: Arc<dyn InviteRepository>,
    user_repo: Arc<dyn UserRepository>,
    organization_repo: Arc<dyn OrganizationRepository>,
    auth_service: Arc<AuthService>,
    notifications: Arc<NotificationService>,
    clock: Arc<dyn Clock>,
}

impl InviteService {
    pub fn new(
        invite_repo: Arc<dyn InviteRepository>,
        user_repo: Arc<dyn UserRepository>,
        organization_repo: Arc<dyn OrganizationRepository>,
        auth_service: Arc<AuthService>,
        notifications: Arc<NotificationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { invite_repo, user_repo, organization_repo, auth_service, notifications, clock }
    }

    pub async fn create(&self, actor: &CurrentUser, input: CreateInvite) -> Result<Invite, AppError> {
        authorize(actor, ADMIN_OR_MANAGER)?;

        let email = normalize_email(&require(input.email, "Email is required")?);
        validate_email(&email)?;
        let role: Role = match input.role {
            Some(role) => role.parse()?,
            None => Role::Member,
        };

        if self.user_repo.find_in_organization_by_email(&actor.organization_id, &email).await?.is_some() {
            return Err(AppError::Conflict("User is already a member of this organization".into()));
        }

        let now = self.clock.now();
        let mut invite = Invite::new(email, role, actor.organization_id.clone(), actor.id.clone(), now);

        let mut created = None;
        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            match self.invite_repo.create_if_no_active(&invite, now).await {
                Ok(Some(row)) => {
                    created = Some(row);
                    break;
                }
                Ok(None) => {
                    return Err(AppError::Conflict("An active invite already exists for this email".into()));
                }
                Err(e) if e.is_unique_violation() => {
                    warn!(attempt, "Invite token collision, regenerating");
                    invite.regenerate_token();
                }
                Err(e) => return Err(e),
            }
        }

        let created = created.ok_or_else(|| {
            AppError::InternalWithMsg(format!("Could not issue a unique invite token after {} attempts", MAX_TOKEN_ATTEMPTS))
        })?;

        info!(invite_id = %created.id, organization_id = %created.organization_id, "Invite created");

        self.notifications.schedule(NotificationJob::InviteCreated { invite: created.clone() });

        Ok(created)
    }

    pub async fn list(&self, actor: &CurrentUser) -> Result<Vec<InviteWithSender>, AppError> {
        authorize(actor, ADMIN_OR_MANAGER)?;
        self.invite_repo.list_with_sender(&actor.organization_id).await
    }

    /// Public: the token is the credential.
    pub async fn accept(&self, token: &str, input: AcceptInvite) -> Result<AcceptedInvite, AppError> {
        let invite = self.invite_repo.find_by_token(token).await?
            .ok_or_else(|| AppError::NotFound("Invalid or expired invite".into()))?;

        let now = self.clock.now();
        if invite.is_expired(now) {
            return Err(AppError::Expired);
        }
        if invite.is_accepted() {
            return Err(AppError::AlreadyAccepted);
        }

        const MISSING: &str = "Password, first name, and last name are required";
        let password = input.password.filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation(MISSING.into()))?;
        let first_name = require(input.first_name, MISSING)?;
        let last_name = require(input.last_name, MISSING)?;
        validate_password(&password)?;

        if self.user_repo.find_by_email(&invite.email).await?.is_some() {
            return Err(AppError::Conflict("User already exists with this email".into()));
        }

        let organization = self.organization_repo.find_by_id(&invite.organization_id).await?
            .ok_or_else(|| AppError::NotFound("Organization not found".into()))?;

        let password_hash = self.auth_service.hash_password(&password)?;
        let user = User::new(
            invite.organization_id.clone(),
            invite.email.clone(),
            password_hash,
            first_name,
            last_name,
            invite.role(),
            now,
        );

        let user = self.invite_repo.accept(&invite, &user, now).await
            .map_err(|e| e.conflict_on_unique("User already exists with this email"))?;
        let token = self.auth_service.issue_token(&user, now)?;

        info!(invite_id = %invite.id, user_id = %user.id, "Invite accepted");

        Ok(AcceptedInvite { user, organization, token })
    }

    pub async fn cancel(&self, actor: &CurrentUser, invite_id: &str) -> Result<Invite, AppError> {
        authorize(actor, ADMIN_ONLY)?;

        let invite = self.invite_repo.find_by_id(&actor.organization_id, invite_id).await?
            .ok_or_else(|| AppError::NotFound("Invite not found".into()))?;

        if !self.invite_repo.delete(&actor.organization_id, &invite.id).await? {
            return Err(AppError::NotFound("Invite not found".into()));
        }

        info!(invite_id = %invite.id, organization_id = %invite.organization_id, "Invite cancelled");
        Ok(invite)
    }
}
