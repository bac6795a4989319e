//! Route authorization engine: a per-request gate deciding, from the path and
//! the session alone, whether a request passes through, bounces to login, or
//! lands on an error/selection page. Nothing here is persisted.

use crate::roles::ROLE_MAPPINGS;
use crate::session::Session;

/// Outcome of classifying one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Static asset or an API surface that carries its own auth; the guard
    /// does not even read the session.
    Bypass,
    /// Serve the request unchanged.
    Allow,
    /// 302 to the given location.
    Redirect(String),
}

/// Paths the guard skips entirely (no session read).
const BYPASS_PREFIXES: &[&str] = &["/_next/", "/static/", "/backend/", "/health"];

/// Asset suffixes that bypass the guard.
const ASSET_EXTENSIONS: &[&str] = &[
    ".ico", ".png", ".svg", ".jpg", ".jpeg", ".gif", ".webp", ".css", ".js",
];

/// Routes reachable without a session: the auth pages, the auth API prefix,
/// and the unauthorized page.
const PUBLIC_PREFIXES: &[&str] = &[
    "/auth/login",
    "/auth/signup",
    "/auth/role-selection",
    "/unauthorized",
    "/auth/",
];

/// Whether the guard skips this path entirely, without reading the session.
pub fn is_bypassed(path: &str) -> bool {
    BYPASS_PREFIXES.iter().any(|p| path.starts_with(p))
        || ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

fn is_root_entry(path: &str) -> bool {
    path == "/" || path == "/dashboard"
}

/// The value of the `returnUrl` query parameter appended when bouncing an
/// unauthenticated request to login: original path + query, URL-encoded.
pub fn return_url(path: &str, query: Option<&str>) -> String {
    if is_public(path) {
        return "/".to_string();
    }
    match query {
        Some(q) if !q.is_empty() => urlencoding::encode(&format!("{path}?{q}")).into_owned(),
        _ => urlencoding::encode(path).into_owned(),
    }
}

/// Whether `path` sits inside a role-scoped dashboard namespace, and if so
/// whether the session's roles grant it. `None` when the path is unscoped.
fn namespace_grant(path: &str, session: &Session) -> Option<bool> {
    let mut scoped = false;
    let mut granted = false;
    for mapping in &ROLE_MAPPINGS {
        let in_namespace =
            path == mapping.path || path.starts_with(&format!("{}/", mapping.path));
        if in_namespace {
            scoped = true;
            if session.roles.iter().any(|r| r == mapping.key) {
                granted = true;
            }
        }
    }
    scoped.then_some(granted)
}

/// Classify one request.
///
/// Order matters and mirrors the gateway's contract: bypass, public routes,
/// authentication, role availability, namespace grants, root-entry fan-out,
/// then plain allow.
pub fn classify(method: &str, path: &str, query: Option<&str>, session: &Session) -> RouteDecision {
    // 1. Static assets and self-authorizing API paths.
    if is_bypassed(path) {
        return RouteDecision::Bypass;
    }

    // 2. Public routes; an authenticated session asking for the login page is
    //    sent to its dashboard instead of being allowed to re-login.
    if is_public(path) {
        if path == "/auth/login" && method == "GET" && session.is_authenticated {
            return RouteDecision::Redirect(session.redirect_path().to_string());
        }
        return RouteDecision::Allow;
    }

    // 3. Everything else requires an authenticated session.
    if !session.is_authenticated {
        return RouteDecision::Redirect(format!(
            "/auth/login?returnUrl={}",
            return_url(path, query)
        ));
    }

    // 4. A session whose roles have no registry intersection can go nowhere.
    let available = session.available_roles();
    if available.is_empty() {
        return RouteDecision::Redirect("/unauthorized".to_string());
    }

    // 5. Role-scoped namespaces.
    if let Some(granted) = namespace_grant(path, session) {
        if !granted {
            return RouteDecision::Redirect("/unauthorized".to_string());
        }
    }

    // 6. Root/dashboard entry fans out by role: a single role goes straight to
    //    its dashboard, an explicit valid selection wins, otherwise the caller
    //    picks a role first.
    if is_root_entry(path) {
        return RouteDecision::Redirect(session.redirect_path().to_string());
    }

    // 7. Nothing else to enforce.
    RouteDecision::Allow
}
