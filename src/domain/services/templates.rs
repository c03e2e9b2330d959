use crate::domain::models::{invite::INVITE_TTL_DAYS, notification::{EmailMessage, InviteCreatedNotification}};
use crate::error::AppError;
use tera::{Context, Tera};

pub const INVITE_TEMPLATE: &str = "invite.html";

pub fn load_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_template(INVITE_TEMPLATE, include_str!("../../templates/invite.html"))
        .map_err(|e| AppError::InternalWithMsg(format!("Tera parse error: {:?}", e)))?;
    Ok(tera)
}

pub fn invite_subject(org_name: &str) -> String {
    format!("You're invited to join {}!", org_name)
}

pub fn render_invite_email(tera: &Tera, notification: &InviteCreatedNotification) -> Result<EmailMessage, AppError> {
    let mut context = Context::new();
    context.insert("org_name", &notification.org_name);
    context.insert("sender_name", &notification.sender_name);
    context.insert("role", &notification.role);
    context.insert("accept_url", &notification.accept_url);
    context.insert("expiry_days", &INVITE_TTL_DAYS);

    let html = tera
        .render(INVITE_TEMPLATE, &context)
        .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))?;

    Ok(EmailMessage {
        to: notification.email.clone(),
        subject: invite_subject(&notification.org_name),
        html,
    })
}
