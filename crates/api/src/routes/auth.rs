//! Session lifecycle endpoints: login, signup, logout, refresh, session
//! read/update, and the access-token handout for API callers.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use dashgate_auth::Session;
use dashgate_identity::SignupRequest;

use crate::app::AppState;
use crate::errors::{identity_error_response, json_error};
use crate::refresh::{ensure_fresh, TokenOutcome};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

/// `POST /auth/login`: authenticate credentials, snapshot the account, and
/// establish the session cookie.
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Response {
    let (Some(username), Some(password)) = (non_empty(body.username), non_empty(body.password))
    else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "missing_credentials",
            "Username and password are required",
        );
    };

    let pair = match state.identity.authenticate(&username, &password).await {
        Ok(pair) => pair,
        Err(err) => return identity_error_response(err),
    };
    let account = match state.identity.account_details(&pair.access_token).await {
        Ok(account) => account,
        Err(err) => return identity_error_response(err),
    };

    let roles = account.roles.clone();
    let mut session = Session::empty();
    session.establish(&pair, account.into_profile(), roles, Utc::now());

    tracing::info!(user = %username, "login succeeded");
    established_response(&state, &session)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupBody {
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    password: Option<String>,
}

/// `POST /auth/signup`: create the account, then log it straight in.
///
/// Field-level upstream rejections are relayed with every reported error
/// enumerated, never collapsed into one message.
pub async fn signup(State(state): State<AppState>, Json(body): Json<SignupBody>) -> Response {
    let (Some(username), Some(first_name), Some(last_name), Some(password)) = (
        non_empty(body.username),
        non_empty(body.first_name),
        non_empty(body.last_name),
        non_empty(body.password),
    ) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "missing_fields",
            "Username, First Name, Last Name, and Password are required",
        );
    };

    let request = SignupRequest {
        username: username.clone(),
        first_name,
        last_name,
        password: password.clone(),
    };
    if let Err(err) = state.identity.signup(&request).await {
        return identity_error_response(err);
    }

    // Authenticate immediately so signup lands in a live session.
    let pair = match state.identity.authenticate(&username, &password).await {
        Ok(pair) => pair,
        Err(err) => return identity_error_response(err),
    };
    let account = match state.identity.account_details(&pair.access_token).await {
        Ok(account) => account,
        Err(err) => return identity_error_response(err),
    };

    let roles = account.roles.clone();
    let mut session = Session::empty();
    session.establish(&pair, account.into_profile(), roles, Utc::now());

    tracing::info!(user = %username, "signup succeeded");
    established_response(&state, &session)
}

/// `POST /auth/logout`: best-effort upstream revoke, unconditional local
/// destruction, and success no matter what.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = state.store.load(&headers);
    if let (Some(access), Some(refresh)) = (&session.access_token, &session.refresh_token) {
        state.identity.revoke(access, refresh).await;
    }

    (
        [(header::SET_COOKIE, state.store.destroy())],
        Json(serde_json::json!({ "success": true })),
    )
        .into_response()
}

/// `GET /auth/refresh`: explicit refresh of the token pair.
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut session = state.store.load(&headers);
    let (Some(_), Some(refresh_token)) =
        (session.access_token.clone(), session.refresh_token.clone())
    else {
        return json_error(StatusCode::UNAUTHORIZED, "not_authenticated", "Not authenticated");
    };

    match state.identity.refresh(&refresh_token).await {
        Ok(pair) => {
            session.apply_token_pair(&pair, Utc::now());
            with_session_cookie(
                &state,
                &session,
                serde_json::json!({ "success": true, "message": "Session refreshed" }),
            )
        }
        Err(err) => {
            // Fail closed: a rejected refresh invalidates the whole session.
            let mut response = identity_error_response(err);
            response
                .headers_mut()
                .append(header::SET_COOKIE, state.store.destroy());
            response
        }
    }
}

/// `GET /auth/session`: the session probe. Applies the refresh policy as a
/// side effect, so a near-expiry token comes back already renewed.
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut session = state.store.load(&headers);

    match ensure_fresh(&state.identity, &mut session, Utc::now()).await {
        Ok(TokenOutcome::Valid) => with_session_cookie(
            &state,
            &session,
            serde_json::json!({
                "isAuthenticated": true,
                "user": session.user,
                "roles": session.roles,
                "selectedRole": session.selected_role,
            }),
        ),
        Ok(TokenOutcome::Unauthenticated) => anonymous_session_response(&state),
        Err(err) => {
            // Transient outage, not a revoked token: answer anonymously but
            // keep the cookie so the session survives upstream recovery.
            tracing::warn!(error = %err, "session validation unavailable; answering anonymously");
            Json(anonymous_session_body()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionBody {
    selected_role: Option<String>,
}

/// `PUT /auth/session`: record the caller's role selection.
///
/// A missing `selectedRole` or one outside the session's grants is rejected
/// with 400 and the stored session is left untouched (no cookie is written).
pub async fn update_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UpdateSessionBody>,
) -> Response {
    let mut session = state.store.load(&headers);
    if !session.is_authenticated {
        return json_error(StatusCode::UNAUTHORIZED, "not_authenticated", "Not authenticated");
    }

    let Some(role) = body.selected_role else {
        return json_error(StatusCode::BAD_REQUEST, "missing_role", "selectedRole is required");
    };
    if session.select_role(&role).is_err() {
        return json_error(StatusCode::BAD_REQUEST, "invalid_role", "Invalid role selection");
    }

    let selected = session.selected_role.clone();
    with_session_cookie(
        &state,
        &session,
        serde_json::json!({ "success": true, "selectedRole": selected }),
    )
}

/// `GET /auth/jwt`: hand the current access token to a caller that needs to
/// talk to the backend directly. Runs the same trust policy as the probe.
pub async fn jwt(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut session = state.store.load(&headers);

    match ensure_fresh(&state.identity, &mut session, Utc::now()).await {
        Ok(TokenOutcome::Valid) => {
            let access_token = session.access_token.clone();
            with_session_cookie(
                &state,
                &session,
                serde_json::json!({ "accessToken": access_token }),
            )
        }
        Ok(TokenOutcome::Unauthenticated) => {
            let mut response =
                json_error(StatusCode::UNAUTHORIZED, "not_authenticated", "Not authenticated");
            response
                .headers_mut()
                .append(header::SET_COOKIE, state.store.destroy());
            response
        }
        // The upstream being unreachable is not a revoked token; the session
        // cookie stays so the caller can retry once the outage clears.
        Err(err) => identity_error_response(err),
    }
}

/// Success payload shared by login and signup.
fn established_response(state: &AppState, session: &Session) -> Response {
    with_session_cookie(
        state,
        session,
        serde_json::json!({
            "success": true,
            "user": session.user,
            "roles": session.roles,
            "redirectPath": session.redirect_path(),
        }),
    )
}

/// Persist the (possibly mutated) session and attach the payload.
fn with_session_cookie(
    state: &AppState,
    session: &Session,
    body: serde_json::Value,
) -> Response {
    match state.store.save(session) {
        Ok(set_cookie) => ([(header::SET_COOKIE, set_cookie)], Json(body)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to seal session cookie");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "session_store_error",
                "failed to persist session",
            )
        }
    }
}

/// The unauthenticated probe answer, clearing whatever cookie was presented.
fn anonymous_session_response(state: &AppState) -> Response {
    (
        [(header::SET_COOKIE, state.store.destroy())],
        Json(anonymous_session_body()),
    )
        .into_response()
}

fn anonymous_session_body() -> serde_json::Value {
    serde_json::json!({
        "isAuthenticated": false,
        "user": null,
        "roles": [],
        "selectedRole": null,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
