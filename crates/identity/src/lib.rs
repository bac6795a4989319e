//! `dashgate-identity` — client for the upstream identity service.
//!
//! Owns every remote token operation (authenticate, signup, verify, refresh,
//! revoke) and the error taxonomy for upstream failures. Session state and
//! routing live elsewhere; this crate never touches cookies.

pub mod client;
pub mod error;
pub mod models;

pub use client::IdentityClient;
pub use error::{FieldError, IdentityError};
pub use models::{Account, SignupRequest};
