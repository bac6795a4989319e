//! Token trust orchestration: the single place that decides whether the held
//! access token may be used, refreshing or destroying the session as needed.

use chrono::{DateTime, Utc};

use dashgate_auth::{token_action, Session, TokenAction};
use dashgate_identity::{IdentityClient, IdentityError};

/// Result of bringing a session's access token up to trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOutcome {
    /// No usable credential; the session has been cleared if it held one.
    Unauthenticated,
    /// The access token in the session is live and trusted.
    Valid,
}

/// Apply the refresh policy to `session` before its access token is trusted.
///
/// Proactive path: a token inside the skew window is refreshed immediately.
/// Reactive path: a token that fails upstream verification is refreshed once.
/// A refresh failure on either path destroys the session: fail closed, with
/// no second attempt.
///
/// Errors are only returned when *verification* cannot be carried out at all
/// (upstream outage); callers decide whether that maps to "unauthenticated"
/// or to a 5xx, because an unreachable upstream is not a revoked token.
pub async fn ensure_fresh(
    identity: &IdentityClient,
    session: &mut Session,
    now: DateTime<Utc>,
) -> Result<TokenOutcome, IdentityError> {
    match token_action(session, now) {
        TokenAction::Unauthenticated => Ok(TokenOutcome::Unauthenticated),
        TokenAction::Refresh => Ok(refresh_once(identity, session, now).await),
        TokenAction::Verify => {
            // The token looks live; confirm upstream before trusting it.
            let access_token = session
                .access_token
                .clone()
                .unwrap_or_default();
            if identity.verify(&access_token).await? {
                session.touch(now);
                Ok(TokenOutcome::Valid)
            } else {
                Ok(refresh_once(identity, session, now).await)
            }
        }
    }
}

/// The single refresh attempt. Failure destroys the session.
async fn refresh_once(
    identity: &IdentityClient,
    session: &mut Session,
    now: DateTime<Utc>,
) -> TokenOutcome {
    let Some(refresh_token) = session.refresh_token.clone() else {
        session.clear();
        return TokenOutcome::Unauthenticated;
    };

    match identity.refresh(&refresh_token).await {
        Ok(pair) => {
            session.apply_token_pair(&pair, now);
            TokenOutcome::Valid
        }
        Err(err) => {
            tracing::warn!(error = %err, "token refresh failed; destroying session");
            session.clear();
            TokenOutcome::Unauthenticated
        }
    }
}
