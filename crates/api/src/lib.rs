//! HTTP gateway: encrypted session cookie, auth endpoints, route guard, and
//! the authenticated backend proxy.

pub mod app;
pub mod config;
pub mod errors;
pub mod guard;
pub mod refresh;
pub mod routes;
pub mod store;
