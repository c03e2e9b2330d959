pub mod audit;
pub mod auth;
pub mod invite;
pub mod notification;
pub mod organization;
pub mod user;
