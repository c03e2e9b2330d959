pub mod audit;
pub mod auth;
pub mod health;
pub mod invite;
pub mod user;
pub mod webhook;
