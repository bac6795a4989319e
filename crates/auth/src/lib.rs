//! `dashgate-auth` — pure session/authorization domain layer.
//!
//! This crate is intentionally decoupled from HTTP and storage: the session
//! model, the role registry, the route authorization engine, and the token
//! refresh policy are all deterministic and IO-free. The API layer owns
//! cookies, upstream calls, and response mapping.

pub mod policy;
pub mod roles;
pub mod routing;
pub mod session;

pub use policy::{token_action, TokenAction, REFRESH_SKEW_SECONDS};
pub use roles::{available_roles, has_role, parse_role, RoleKey, RoleMapping, ROLE_MAPPINGS};
pub use routing::{classify, is_bypassed, return_url, RouteDecision};
pub use session::{Session, SessionError, TokenPair, UserProfile};
