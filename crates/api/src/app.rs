//! Router assembly and shared request state.

use axum::http::StatusCode;
use axum::routing::{any, get, post};
use axum::Router;

use dashgate_identity::IdentityClient;

use crate::config::Config;
use crate::routes::proxy::ProxyClient;
use crate::store::SessionStore;

/// Everything a handler needs; cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub store: SessionStore,
    pub identity: IdentityClient,
    pub proxy: ProxyClient,
}

/// Build the gateway router: auth endpoints, backend proxy, health probe, and
/// the route guard layered over everything.
pub fn build_app(config: &Config) -> anyhow::Result<Router> {
    let state = AppState {
        store: SessionStore::new(&config.session_secret, config.secure_cookies)?,
        identity: IdentityClient::new(&config.upstream_api_url)?,
        proxy: ProxyClient::new(&config.upstream_api_url)?,
    };

    let router = Router::new()
        .route("/auth/login", post(crate::routes::auth::login))
        .route("/auth/signup", post(crate::routes::auth::signup))
        .route("/auth/logout", post(crate::routes::auth::logout))
        .route("/auth/refresh", get(crate::routes::auth::refresh))
        .route(
            "/auth/session",
            get(crate::routes::auth::session).put(crate::routes::auth::update_session),
        )
        .route("/auth/jwt", get(crate::routes::auth::jwt))
        .route("/backend/*path", any(crate::routes::proxy::forward))
        .route("/health", get(health))
        // Everything else is the fronted dashboard surface; the guard decides
        // whether it is reachable, the shell below stands in for rendering.
        .fallback(shell)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::guard::route_guard,
        ))
        .with_state(state);

    Ok(router)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Placeholder for the dashboard shell served behind the guard. Rendering is
/// an external concern; reaching this handler means the request was allowed.
async fn shell() -> StatusCode {
    StatusCode::OK
}
