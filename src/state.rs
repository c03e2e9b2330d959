use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{
    AuditLogRepository, Clock, EmailService, InviteRepository, OrganizationRepository,
    UserRepository, WebhookService,
};
use crate::domain::services::{
    audit_service::AuditRecorder,
    auth_service::AuthService,
    invite_service::InviteService,
    notification_service::{NotificationReceiver, NotificationService},
    registration_service::RegistrationService,
    templates::load_templates,
};
use crate::error::AppError;
use tera::Tera;

pub struct Repositories {
    pub organization_repo: Arc<dyn OrganizationRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub invite_repo: Arc<dyn InviteRepository>,
    pub audit_repo: Arc<dyn AuditLogRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub organization_repo: Arc<dyn OrganizationRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub auth_service: Arc<AuthService>,
    pub invite_service: Arc<InviteService>,
    pub registration_service: Arc<RegistrationService>,
    pub audit_recorder: Arc<AuditRecorder>,
    pub notification_service: Arc<NotificationService>,
    pub email_service: Arc<dyn EmailService>,
    pub webhook_service: Arc<dyn WebhookService>,
    pub clock: Arc<dyn Clock>,
    pub templates: Arc<Tera>,
}

impl AppState {
    /// Wires services over the given adapters. The returned receiver feeds
    /// the notification worker.
    pub fn build(
        config: Config,
        repos: Repositories,
        email_service: Arc<dyn EmailService>,
        webhook_service: Arc<dyn WebhookService>,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, NotificationReceiver), AppError> {
        let templates = Arc::new(load_templates()?);
        let auth_service = Arc::new(AuthService::new(&config));
        let audit_recorder = Arc::new(AuditRecorder::new(repos.audit_repo.clone(), clock.clone()));
        let (notification_service, receiver) = NotificationService::new(audit_recorder.clone());
        let notification_service = Arc::new(notification_service);

        let invite_service = Arc::new(InviteService::new(
            repos.invite_repo.clone(),
            repos.user_repo.clone(),
            repos.organization_repo.clone(),
            auth_service.clone(),
            notification_service.clone(),
            clock.clone(),
        ));
        let registration_service = Arc::new(RegistrationService::new(
            repos.organization_repo.clone(),
            repos.user_repo.clone(),
            auth_service.clone(),
            clock.clone(),
        ));

        let state = AppState {
            config,
            organization_repo: repos.organization_repo,
            user_repo: repos.user_repo,
            auth_service,
            invite_service,
            registration_service,
            audit_recorder,
            notification_service,
            email_service,
            webhook_service,
            clock,
            templates,
        };
        Ok((state, receiver))
    }
}
