use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::engine_page_handler::{
    create_engine_page_handler, delete_engine_page_handler, engine_brands_handler, engine_pages_by_brand_handler,
    get_engine_page_handler, import_engine_pages_handler, list_engine_pages_handler, public_engine_page_handler,
    public_engine_pages_handler, update_engine_page_handler,
};
use crate::middlewares::admin_middleware::{admin_api_guard, AdminAuthState};
use crate::service::engine_page_service::EnginePageService;

pub fn engine_page_router(service: Arc<dyn EnginePageService>, admin_auth_state: Arc<AdminAuthState>) -> Router {
    // `brands` and `brand/{marque}` are matched before the `{slug}` capture
    let public = Router::new()
        .route("/api/public/engine-pages", get(public_engine_pages_handler))
        .route("/api/public/engine-pages/brands", get(engine_brands_handler))
        .route("/api/public/engine-pages/brand/{marque}", get(engine_pages_by_brand_handler))
        .route("/api/public/engine-pages/{slug}", get(public_engine_page_handler));

    let admin = Router::new()
        .route(
            "/api/admin/engine-pages",
            get(list_engine_pages_handler).post(create_engine_page_handler),
        )
        .route("/api/admin/engine-pages/import", post(import_engine_pages_handler))
        .route(
            "/api/admin/engine-pages/{id}",
            get(get_engine_page_handler)
                .put(update_engine_page_handler)
                .delete(delete_engine_page_handler),
        )
        .route_layer(middleware::from_fn_with_state(admin_auth_state, admin_api_guard));

    public.merge(admin).with_state(service)
}
