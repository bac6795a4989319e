//! Backend proxy: forwards authorized calls upstream with the caller's
//! access token injected, relaying the response byte-for-byte.

use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::app::AppState;
use crate::errors::json_error;
use crate::refresh::{ensure_fresh, TokenOutcome};

/// Forwarded calls get a generous budget: uploads stream through here.
const PROXY_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upstream HTTP client for forwarded calls.
///
/// Redirects are never followed; they are relayed verbatim so the caller's
/// browser handles them.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(PROXY_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

/// `ANY /backend/{*path}`: authorize, then forward.
///
/// The refresh policy runs first, so an expired access token with a live
/// refresh token is renewed before the call goes out. A caller with no
/// usable credential gets 401 and the upstream is never contacted.
pub async fn forward(
    State(state): State<AppState>,
    Path(path): Path<String>,
    req: Request<Body>,
) -> Response {
    if req.method() == Method::OPTIONS {
        return cors_preflight();
    }

    let mut session = state.store.load(req.headers());
    match ensure_fresh(&state.identity, &mut session, Utc::now()).await {
        Ok(TokenOutcome::Valid) => {}
        Ok(TokenOutcome::Unauthenticated) => {
            let mut response =
                json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized");
            response
                .headers_mut()
                .append(header::SET_COOKIE, state.store.destroy());
            return response;
        }
        // An unreachable identity service is not a revoked token: keep the
        // session, report the outage.
        Err(err) => {
            tracing::error!(error = %err, "token verification unavailable");
            return json_error(
                StatusCode::BAD_GATEWAY,
                "upstream_unavailable",
                "identity service unavailable",
            );
        }
    }

    // Valid outcome guarantees a live access token.
    let access_token = session.access_token.clone().unwrap_or_default();
    let set_cookie = match state.store.save(&session) {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(error = %err, "failed to seal session cookie");
            return json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "session_store_error",
                "failed to persist session",
            );
        }
    };

    let url = match req.uri().query() {
        Some(query) => format!("{}/{}?{}", state.proxy.base_url, path, query),
        None => format!("{}/{}", state.proxy.base_url, path),
    };
    tracing::debug!(method = %req.method(), %url, "proxying backend call");

    let method = req.method().clone();
    let mut headers = req.headers().clone();
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    let bearer = match HeaderValue::from_str(&format!("Bearer {access_token}")) {
        Ok(value) => value,
        Err(_) => return json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized"),
    };
    headers.insert(header::AUTHORIZATION, bearer);

    let has_body = !matches!(method, Method::GET | Method::HEAD);
    let mut upstream_req = state.proxy.http.request(method, &url).headers(headers);
    if has_body {
        // Bodies stream through unbuffered; multipart uploads stay
        // byte-correct and nothing is held in memory.
        upstream_req =
            upstream_req.body(reqwest::Body::wrap_stream(req.into_body().into_data_stream()));
    }

    match upstream_req.send().await {
        Ok(upstream) => {
            let status = upstream.status();
            let mut response_headers = upstream.headers().clone();
            // Framing is re-established by our own server.
            response_headers.remove(header::TRANSFER_ENCODING);
            response_headers.remove(header::CONNECTION);

            let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
            *response.status_mut() = status;
            *response.headers_mut() = response_headers;
            response
                .headers_mut()
                .append(header::SET_COOKIE, set_cookie);
            response
        }
        Err(err) => {
            tracing::error!(error = %err, %url, "proxy call failed");
            (
                StatusCode::BAD_GATEWAY,
                axum::Json(serde_json::json!({
                    "error": "proxy_error",
                    "message": "failed to reach upstream API",
                    "details": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// `OPTIONS /backend/{*path}` is answered locally, never forwarded.
fn cors_preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type, Authorization"),
            ),
        ],
    )
        .into_response()
}
