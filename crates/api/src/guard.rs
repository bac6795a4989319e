//! Route guard middleware: applies the authorization engine to every request.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

use dashgate_auth::{classify, is_bypassed, RouteDecision};

use crate::app::AppState;

/// Classify the request and either let it through or bounce it.
///
/// Any internal failure redirects to login instead of serving the request:
/// the guard fails closed.
pub async fn route_guard(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // Static assets and self-authorizing API paths skip the session entirely.
    if is_bypassed(req.uri().path()) {
        return next.run(req).await;
    }

    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|q| q.to_string());

    let session = state.store.load(req.headers());
    let decision = classify(&method, &path, query.as_deref(), &session);

    match decision {
        RouteDecision::Bypass | RouteDecision::Allow => next.run(req).await,
        RouteDecision::Redirect(location) => {
            tracing::debug!(%path, %location, "route guard redirect");
            redirect(&location)
        }
    }
}

/// A plain 302 with a `Location` header.
pub fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => Response::builder()
            .status(StatusCode::FOUND)
            .header(header::LOCATION, value)
            .body(Body::empty())
            .unwrap_or_else(|_| fail_closed()),
        // A location we cannot even render as a header falls back to login.
        Err(_) => fail_closed(),
    }
}

fn fail_closed() -> Response {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, HeaderValue::from_static("/auth/login"))
        .body(Body::empty())
        .expect("static login redirect is always a valid response")
}
