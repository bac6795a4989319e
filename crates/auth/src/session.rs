use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roles::{available_roles, parse_role, RoleKey};

/// Denormalized profile snapshot taken from the identity service at login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Convenience display name (`first_name last_name`).
    pub name: String,
    pub enabled: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Access/refresh token pair returned by authenticate and refresh.
///
/// Transient value: it is folded into the [`Session`] and never persisted
/// anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A role selection was attempted for a role the session does not hold.
    #[error("role '{0}' is not granted to this session")]
    RoleNotHeld(String),
}

/// The sole durable entity, held entirely client-side in an encrypted cookie.
///
/// Invariants maintained by the mutators below:
/// - `is_authenticated == true` implies a non-empty access token;
/// - `selected_role`, if set, is one of `roles`;
/// - expiry timestamps are only ever replaced forward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub access_token_expires_at: Option<DateTime<Utc>>,
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub selected_role: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
    pub last_activity: Option<DateTime<Utc>>,
}

impl Session {
    /// A fresh, unauthenticated session (what a first request sees).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Populate the session after a successful authenticate or signup.
    pub fn establish(
        &mut self,
        pair: &TokenPair,
        user: UserProfile,
        roles: Vec<String>,
        now: DateTime<Utc>,
    ) {
        self.user = Some(user);
        self.roles = roles;
        self.selected_role = None;
        self.apply_token_pair(pair, now);
    }

    /// Fold a refreshed token pair into the session.
    ///
    /// Expiry timestamps are monotonic: a pair carrying an earlier expiry than
    /// the one already held never rolls the session backward.
    pub fn apply_token_pair(&mut self, pair: &TokenPair, now: DateTime<Utc>) {
        self.access_token = Some(pair.access_token.clone());
        self.refresh_token = Some(pair.refresh_token.clone());
        self.access_token_expires_at = Some(monotonic(
            self.access_token_expires_at,
            pair.access_token_expires_at,
        ));
        self.refresh_token_expires_at = Some(monotonic(
            self.refresh_token_expires_at,
            pair.refresh_token_expires_at,
        ));
        self.is_authenticated = true;
        self.touch(now);
    }

    /// Record a successful token operation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = Some(now);
    }

    /// Select the active role when more than one is granted.
    ///
    /// Rejects (leaving the session unchanged) when the role is not held.
    pub fn select_role(&mut self, role: &str) -> Result<(), SessionError> {
        if !self.roles.iter().any(|r| r == role) {
            return Err(SessionError::RoleNotHeld(role.to_string()));
        }
        self.selected_role = Some(role.to_string());
        Ok(())
    }

    /// The selected role, when it is both held and known to the registry.
    pub fn valid_selected_role(&self) -> Option<RoleKey> {
        let selected = self.selected_role.as_deref()?;
        if !self.roles.iter().any(|r| r == selected) {
            return None;
        }
        parse_role(selected)
    }

    /// Registry roles this session can route on.
    pub fn available_roles(&self) -> Vec<RoleKey> {
        available_roles(&self.roles)
    }

    /// Where this session should land after login (or when bounced off a
    /// public page while already authenticated).
    ///
    /// An explicit valid selection always wins over positional first-match.
    pub fn redirect_path(&self) -> &'static str {
        if !self.is_authenticated {
            return "/auth/login";
        }
        let available = self.available_roles();
        if available.is_empty() {
            return "/unauthorized";
        }
        if available.len() == 1 {
            return available[0].path();
        }
        if let Some(selected) = self.valid_selected_role() {
            return selected.path();
        }
        "/auth/role-selection"
    }

    /// Destroy all session state (logout, verification failure, gateway error).
    pub fn clear(&mut self) {
        *self = Session::default();
    }
}

fn monotonic(current: Option<DateTime<Utc>>, incoming: DateTime<Utc>) -> DateTime<Utc> {
    match current {
        Some(held) if held > incoming => held,
        _ => incoming,
    }
}
