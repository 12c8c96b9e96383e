pub mod auth;
pub mod redirect;
pub mod session;
pub mod webhook;
