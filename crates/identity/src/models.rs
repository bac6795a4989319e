use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dashgate_auth::UserProfile;

/// Account record as returned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub enabled: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Account {
    /// The denormalized snapshot stored in the session.
    pub fn into_profile(self) -> UserProfile {
        let name = format!("{} {}", self.first_name, self.last_name);
        UserProfile {
            id: self.id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            name,
            enabled: self.enabled,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Payload for creating a new account upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}
