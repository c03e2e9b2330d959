pub mod sqlite_audit_repo;
pub mod sqlite_invite_repo;
pub mod sqlite_organization_repo;
pub mod sqlite_user_repo;

pub mod postgres_audit_repo;
pub mod postgres_invite_repo;
pub mod postgres_organization_repo;
pub mod postgres_user_repo;
