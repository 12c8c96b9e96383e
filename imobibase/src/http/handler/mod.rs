pub mod api;
pub mod auth;
pub mod csrf_token;
pub mod health;
pub mod webhooks;
