use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

use dashgate_auth::TokenPair;

use crate::error::{IdentityError, UpstreamErrorBody};
use crate::models::{Account, SignupRequest};

/// Total per-call budget against the identity service. The upstream defines
/// no timeout of its own, so the gateway enforces one.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the upstream identity service.
///
/// Stateless and cheap to clone; one instance is shared across all requests.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange credentials for a token pair.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenPair, IdentityError> {
        let res = self
            .http
            .post(self.url("/authenticate"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        match res.status() {
            s if s.is_success() => Ok(res.json().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(IdentityError::InvalidCredentials)
            }
            s => Err(upstream_error(s, res).await),
        }
    }

    /// Create an account. Field-level rejections surface as
    /// [`IdentityError::Validation`] with every reported error enumerated.
    pub async fn signup(&self, req: &SignupRequest) -> Result<Account, IdentityError> {
        let res = self.http.post(self.url("/signup")).json(req).send().await?;

        let status = res.status();
        if status.is_success() {
            return Ok(res.json().await?);
        }

        let body: UpstreamErrorBody = res.json().await.unwrap_or_default();
        if !body.errors.is_empty() || status == StatusCode::BAD_REQUEST {
            return Err(IdentityError::Validation {
                status: status.as_u16(),
                message: body.message_or("Signup failed"),
                errors: body.errors,
            });
        }
        Err(IdentityError::Upstream {
            status: status.as_u16(),
            message: body.message_or("signup rejected"),
        })
    }

    /// Fetch the profile behind an access token.
    pub async fn account_details(&self, access_token: &str) -> Result<Account, IdentityError> {
        let res = self
            .http
            .get(self.url("/account/getAccountDetails"))
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            return Ok(res.json().await?);
        }
        Err(upstream_error(status, res).await)
    }

    /// Check whether an access token is still honored upstream.
    ///
    /// A 403 means "invalid token" and maps to `Ok(false)`. Every other
    /// non-success (network faults, 5xx) propagates as an error so callers
    /// cannot mistake an outage for a revoked token.
    pub async fn verify(&self, access_token: &str) -> Result<bool, IdentityError> {
        let res = self
            .http
            .get(self.url("/account/isAuthenticated"))
            .bearer_auth(access_token)
            .send()
            .await?;

        match res.status() {
            s if s.is_success() => Ok(true),
            StatusCode::FORBIDDEN => Ok(false),
            s => Err(upstream_error(s, res).await),
        }
    }

    /// Trade a refresh token for a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, IdentityError> {
        let res = self
            .http
            .post(self.url("/refreshToken"))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await?;

        match res.status() {
            s if s.is_success() => Ok(res.json().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(IdentityError::InvalidCredentials)
            }
            s => Err(upstream_error(s, res).await),
        }
    }

    /// Best-effort token revocation. Never fails the caller: an unreachable
    /// upstream must not block local session destruction.
    pub async fn revoke(&self, access_token: &str, refresh_token: &str) {
        let outcome = self
            .http
            .post(self.url("/account/logout"))
            .bearer_auth(access_token)
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await;

        match outcome {
            Ok(res) if !res.status().is_success() => {
                tracing::warn!(status = res.status().as_u16(), "upstream revoke rejected");
            }
            Err(err) => {
                tracing::warn!(error = %err, "upstream revoke unreachable");
            }
            Ok(_) => {}
        }
    }
}

async fn upstream_error(status: StatusCode, res: reqwest::Response) -> IdentityError {
    let body: UpstreamErrorBody = res.json().await.unwrap_or_default();
    IdentityError::Upstream {
        status: status.as_u16(),
        message: body.message_or("unexpected upstream response"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = IdentityClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.url("/authenticate"), "http://localhost:8080/authenticate");
    }
}
