use chrono::{DateTime, Duration, Utc};

use crate::session::Session;

/// Safety margin subtracted from the access token's expiry: a token inside
/// this window is refreshed proactively instead of being trusted.
pub const REFRESH_SKEW_SECONDS: i64 = 30;

/// What the token lifecycle must do before the held access token may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    /// No usable credential at all; the caller is unauthenticated.
    Unauthenticated,
    /// The token is inside the skew window (or past expiry): refresh first.
    Refresh,
    /// The token looks live; verify it upstream before trusting it.
    Verify,
}

/// Decide the refresh step for a session at `now`.
///
/// `now + skew >= access_token_expires_at` triggers a proactive refresh.
/// Otherwise the token must still be verified; a failed verification is the
/// caller's cue for the single reactive refresh. A session without a recorded
/// expiry falls back to the verify path.
pub fn token_action(session: &Session, now: DateTime<Utc>) -> TokenAction {
    if !session.is_authenticated {
        return TokenAction::Unauthenticated;
    }
    let Some(access_token) = session.access_token.as_deref() else {
        return TokenAction::Unauthenticated;
    };
    if access_token.is_empty() {
        return TokenAction::Unauthenticated;
    }

    match session.access_token_expires_at {
        Some(expires_at) if now + Duration::seconds(REFRESH_SKEW_SECONDS) >= expires_at => {
            TokenAction::Refresh
        }
        _ => TokenAction::Verify,
    }
}
