use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use time::Duration;
use tracing::info;
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, SessionResponse};
use crate::middlewares::admin_middleware::SESSION_COOKIE;
use crate::service::auth_service::AuthService;
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub struct AuthState {
    pub auth_service: Arc<dyn AuthService>,
    pub cookie_secure: bool,
}

fn session_cookie(value: String, secure: bool, max_age: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

// Handler: Admin login, sets the session cookie
pub async fn login_handler(
    State(state): State<Arc<AuthState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate()?;
    let session = state.auth_service.login(payload.password).await?;
    let cookie = session_cookie(
        session.token,
        state.cookie_secure,
        Duration::seconds(session.max_age_secs),
    );
    info!("[login_handler] Session cookie issued");
    let body = SessionResponse {
        authenticated: true,
        role: crate::service::auth_service::ADMIN_ROLE.to_string(),
        expires_at: Some(session.expires_at.to_rfc3339()),
    };
    Ok((jar.add(cookie), Json(body)))
}

// Handler: Current session; the admin guard answers 401 before this runs
pub async fn me_handler(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    Json(SessionResponse {
        authenticated: true,
        role: claims.role.clone(),
        expires_at: claims.expires_at().map(|at| at.to_rfc3339()),
    })
}

// Handler: Clear the session cookie
pub async fn logout_handler(State(state): State<Arc<AuthState>>, jar: CookieJar) -> impl IntoResponse {
    let cookie = session_cookie(String::new(), state.cookie_secure, Duration::ZERO);
    (jar.add(cookie), StatusCode::NO_CONTENT)
}
