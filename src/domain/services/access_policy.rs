use crate::domain::models::{auth::CurrentUser, user::Role};
use crate::error::AppError;

pub const ADMIN_OR_MANAGER: &[Role] = &[Role::Admin, Role::Manager];
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Denies unless the caller's role is one of `allowed`.
pub fn authorize(user: &CurrentUser, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::InsufficientRole {
            required: allowed.to_vec(),
            current: user.role,
        })
    }
}
