pub mod access_policy;
pub mod audit_service;
pub mod auth_service;
pub mod invite_service;
pub mod notification_service;
pub mod registration_service;
pub mod templates;
pub mod validation;
