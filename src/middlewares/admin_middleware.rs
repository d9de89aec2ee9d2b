use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::service::auth_service::AuthService;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub const SESSION_COOKIE: &str = "cpf_session";
pub const LOGIN_PATH: &str = "/admin/login";

/// Outcome of the admin gate for one request.
///
/// `Pending` renders nothing, `Granted` renders the protected content and
/// `Redirect` sends the visitor to the login page. A state never does two of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Pending,
    Granted,
    Redirect(String),
}

impl GuardState {
    pub fn start(local_flag: bool) -> Self {
        if local_flag {
            GuardState::Granted
        } else {
            GuardState::Pending
        }
    }

    /// Settle a pending gate with the session check; settled states are final.
    pub fn resolve(self, authenticated: bool) -> Self {
        match self {
            GuardState::Pending if authenticated => GuardState::Granted,
            GuardState::Pending => GuardState::Redirect(LOGIN_PATH.to_string()),
            settled => settled,
        }
    }

    pub fn shows_content(&self) -> bool {
        matches!(self, GuardState::Granted)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            GuardState::Redirect(target) => Some(target),
            _ => None,
        }
    }
}

pub struct AdminAuthState {
    pub auth_service: Arc<dyn AuthService>,
    /// Token the inbound reply bridge sends as `Authorization: Bearer`.
    pub backend_token: Option<String>,
}

/// Bearer token first, then the session cookie; one check each, no revalidation.
fn authorize(auth: &dyn AuthService, headers: &HeaderMap) -> (GuardState, Option<Claims>) {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|header| auth.check_bearer(header).ok());
    let state = GuardState::start(bearer.is_some());
    if state != GuardState::Pending {
        return (state, bearer);
    }

    let jar = CookieJar::from_headers(headers);
    let session = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| auth.check_token(cookie.value()).ok());
    (state.resolve(session.is_some()), session)
}

/// Admin API routes: 401 unless the request carries a valid session.
pub async fn admin_api_guard(
    State(state): State<Arc<AdminAuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let (gate, claims) = authorize(state.auth_service.as_ref(), req.headers());
    if !gate.shows_content() {
        debug!("Rejected unauthenticated admin API call to {}", req.uri().path());
        return Err(HandlerError::unauthorized("Authentication required"));
    }
    if let Some(claims) = claims {
        req.extensions_mut().insert(claims);
    }
    Ok(next.run(req).await)
}

fn is_protected_page(path: &str) -> bool {
    let under_admin = path == "/admin" || path.starts_with("/admin/");
    let login = path == LOGIN_PATH || path.starts_with(&format!("{}/", LOGIN_PATH));
    under_admin && !login
}

/// Admin pages: 307 to the login page unless the visitor has a session.
pub async fn admin_page_guard(
    State(state): State<Arc<AdminAuthState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !is_protected_page(req.uri().path()) {
        return next.run(req).await;
    }
    let (gate, _) = authorize(state.auth_service.as_ref(), req.headers());
    match gate.redirect_target() {
        Some(target) => Redirect::temporary(target).into_response(),
        None => next.run(req).await,
    }
}

/// Inbound client-reply webhook: `Authorization: Bearer <BACKEND_TOKEN>`.
pub async fn backend_token_guard(
    State(state): State<Arc<AdminAuthState>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.backend_token.as_deref() else {
        warn!("BACKEND_TOKEN not set, refusing inbound client reply");
        return Err(StatusCode::UNAUTHORIZED);
    };
    let presented = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);
    if presented != Some(expected) {
        warn!("Inbound client reply with a wrong backend token");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}
