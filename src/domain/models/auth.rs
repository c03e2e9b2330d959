use serde::{Deserialize, Serialize};
use crate::domain::models::user::{Role, User};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub org: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

/// Identity resolved by the credential verifier and attached to the request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub organization_id: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role(),
            organization_id: user.organization_id.clone(),
        }
    }
}
