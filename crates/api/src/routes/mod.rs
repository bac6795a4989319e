//! Request handlers: the auth endpoints and the backend proxy.

pub mod auth;
pub mod proxy;
