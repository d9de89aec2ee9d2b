use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::handler::settings_handler::{get_settings_handler, public_site_handler, update_settings_handler};
use crate::middlewares::admin_middleware::{admin_api_guard, AdminAuthState};
use crate::service::settings_service::SettingsService;

pub fn settings_router(service: Arc<dyn SettingsService>, admin_auth_state: Arc<AdminAuthState>) -> Router {
    let public = Router::new().route("/api/public/site", get(public_site_handler));

    let admin = Router::new()
        .route("/api/admin/settings", get(get_settings_handler).put(update_settings_handler))
        .route_layer(middleware::from_fn_with_state(admin_auth_state, admin_api_guard));

    public.merge(admin).with_state(service)
}
