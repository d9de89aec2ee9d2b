use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::dto::reply_dto::{MAX_ATTACHMENTS, MAX_ATTACHMENT_BYTES};
use crate::handler::reply_handler::{
    list_client_replies_handler, quote_history_handler, record_client_reply_handler, send_reply_handler,
};
use crate::middlewares::admin_middleware::{admin_api_guard, backend_token_guard, AdminAuthState};
use crate::service::reply_service::ReplyService;

/// Room for every attachment plus the text parts.
const REPLY_BODY_LIMIT: usize = MAX_ATTACHMENTS * MAX_ATTACHMENT_BYTES + 1024 * 1024;

pub fn reply_router(service: Arc<dyn ReplyService>, admin_auth_state: Arc<AdminAuthState>) -> Router {
    let admin = Router::new()
        .route(
            "/api/quotes/{id}/reply",
            post(send_reply_handler).layer(DefaultBodyLimit::max(REPLY_BODY_LIMIT)),
        )
        // Path the public site's admin screen posts to
        .route(
            "/api/devis/{id}/reponse",
            post(send_reply_handler).layer(DefaultBodyLimit::max(REPLY_BODY_LIMIT)),
        )
        .route("/api/quotes/{id}/history", get(quote_history_handler))
        .route("/api/replies/{quote_id}", get(list_client_replies_handler))
        .route_layer(middleware::from_fn_with_state(admin_auth_state.clone(), admin_api_guard));

    // Inbound bridge, authenticated with BACKEND_TOKEN instead of a session
    let webhook = Router::new()
        .route("/api/replies/{quote_id}", post(record_client_reply_handler))
        .route_layer(middleware::from_fn_with_state(admin_auth_state, backend_token_guard));

    admin.merge(webhook).with_state(service)
}
