use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::quote_handler::{
    clear_quotes_handler, delete_quote_handler, get_quote_handler, list_quotes_handler, quote_request_handler,
    submit_quote_handler, update_quote_handler, update_quote_status_handler,
};
use crate::middlewares::admin_middleware::{admin_api_guard, AdminAuthState};
use crate::service::quote_service::QuoteService;
use crate::service::submission::QuoteIntakeService;

pub fn quote_router(
    intake: Arc<dyn QuoteIntakeService>,
    service: Arc<dyn QuoteService>,
    admin_auth_state: Arc<AdminAuthState>,
) -> Router {
    // Public routes
    let public = Router::new()
        .route("/api/quotes/submit", post(submit_quote_handler))
        .route("/api/public/quote-request", post(quote_request_handler))
        .with_state(intake);

    // Admin-protected routes
    let admin = Router::new()
        .route("/api/quotes", get(list_quotes_handler).delete(clear_quotes_handler))
        .route(
            "/api/quotes/{id}",
            get(get_quote_handler).patch(update_quote_handler).delete(delete_quote_handler),
        )
        .route("/api/quotes/{id}/status", put(update_quote_status_handler))
        .route_layer(middleware::from_fn_with_state(admin_auth_state, admin_api_guard))
        .with_state(service);

    public.merge(admin)
}
