//! Environment-driven gateway configuration.

use anyhow::ensure;

/// Minimum length of the cookie-sealing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the gateway listens on.
    pub bind_addr: String,
    /// Base URL of the upstream identity/backend API.
    pub upstream_api_url: String,
    /// Secret sealing the session cookie (>= 32 bytes).
    pub session_secret: String,
    /// Whether the session cookie carries the `Secure` attribute.
    pub secure_cookies: bool,
}

impl Config {
    /// Read configuration from the environment, warning about insecure dev
    /// defaults the way the rest of the stack does.
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let upstream_api_url = std::env::var("UPSTREAM_API_URL").unwrap_or_else(|_| {
            tracing::warn!("UPSTREAM_API_URL not set; defaulting to http://localhost:8080");
            "http://localhost:8080".to_string()
        });

        let session_secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| {
            tracing::warn!("SESSION_SECRET not set; using insecure dev default");
            "complex_password_at_least_32_characters_long_for_development".to_string()
        });
        ensure!(
            session_secret.len() >= MIN_SECRET_LEN,
            "SESSION_SECRET must be at least {MIN_SECRET_LEN} bytes"
        );

        let production = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);
        let secure_cookies = std::env::var("COOKIE_SECURE")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(production);

        Ok(Self {
            bind_addr,
            upstream_api_url,
            session_secret,
            secure_cookies,
        })
    }
}
