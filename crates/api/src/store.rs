//! Client-held session store: one encrypted, integrity-protected cookie.
//!
//! There is no server-side session database. Every request reconstructs the
//! [`Session`] from the cookie alone, and every mutation is written back as a
//! fresh `Set-Cookie`. Tampering and decryption failures degrade to an empty,
//! unauthenticated session rather than an error.

use axum::http::{header, HeaderMap, HeaderValue};
use cookie::{Cookie, CookieJar, Key, SameSite};
use thiserror::Error;

use dashgate_auth::Session;

use crate::config::MIN_SECRET_LEN;

/// Name of the session cookie; stable across deployments.
pub const COOKIE_NAME: &str = "app-session";

/// Fixed cookie lifetime, independent of token expiry. The cookie may outlive
/// the access token; that is what refresh is for.
const COOKIE_MAX_AGE_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session secret must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort,

    #[error("failed to serialize session")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to encode session cookie")]
    Encode,
}

/// Seals sessions into cookies and opens them back up.
#[derive(Clone)]
pub struct SessionStore {
    key: Key,
    secure: bool,
}

impl SessionStore {
    pub fn new(secret: &str, secure: bool) -> Result<Self, StoreError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(StoreError::SecretTooShort);
        }
        Ok(Self {
            key: Key::derive_from(secret.as_bytes()),
            secure,
        })
    }

    /// Reconstruct the session from the request headers.
    ///
    /// Missing cookie, failed decryption, failed integrity check, and
    /// unparseable payloads all yield an empty, unauthenticated session.
    pub fn load(&self, headers: &HeaderMap) -> Session {
        let Some(raw) = find_cookie_value(headers) else {
            return Session::empty();
        };

        let mut jar = CookieJar::new();
        jar.add_original(Cookie::new(COOKIE_NAME, raw));

        match jar.private(&self.key).get(COOKIE_NAME) {
            Some(opened) => serde_json::from_str(opened.value()).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "session cookie payload unreadable; treating as anonymous");
                Session::empty()
            }),
            None => Session::empty(),
        }
    }

    /// Seal the session into a `Set-Cookie` header value.
    pub fn save(&self, session: &Session) -> Result<HeaderValue, StoreError> {
        let payload = serde_json::to_string(session)?;

        let mut cookie = Cookie::new(COOKIE_NAME, payload);
        self.apply_attributes(&mut cookie);
        cookie.set_max_age(cookie::time::Duration::hours(COOKIE_MAX_AGE_HOURS));

        let mut jar = CookieJar::new();
        jar.private_mut(&self.key).add(cookie);
        let sealed = jar.get(COOKIE_NAME).ok_or(StoreError::Encode)?;

        HeaderValue::from_str(&sealed.to_string()).map_err(|_| StoreError::Encode)
    }

    /// A `Set-Cookie` header value that invalidates the session cookie.
    pub fn destroy(&self) -> HeaderValue {
        let mut cookie = Cookie::new(COOKIE_NAME, "");
        self.apply_attributes(&mut cookie);
        cookie.set_max_age(cookie::time::Duration::ZERO);
        cookie.set_expires(cookie::time::OffsetDateTime::UNIX_EPOCH);

        // The removal cookie is static ASCII; encoding cannot fail.
        HeaderValue::from_str(&cookie.to_string())
            .unwrap_or_else(|_| HeaderValue::from_static(""))
    }

    fn apply_attributes(&self, cookie: &mut Cookie<'_>) {
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Strict);
        cookie.set_path("/");
    }
}

fn find_cookie_value(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(header::COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        for piece in raw.split(';') {
            if let Some((name, value)) = piece.trim().split_once('=') {
                if name == COOKIE_NAME {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}
