use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::auth_handler::{login_handler, logout_handler, me_handler, AuthState};
use crate::middlewares::admin_middleware::{admin_api_guard, AdminAuthState};

pub fn auth_router(state: Arc<AuthState>, admin_auth_state: Arc<AdminAuthState>) -> Router {
    let public = Router::new()
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .with_state(state);

    let session = Router::new()
        .route("/api/auth/me", get(me_handler))
        .route_layer(middleware::from_fn_with_state(admin_auth_state, admin_api_guard));

    public.merge(session)
}
