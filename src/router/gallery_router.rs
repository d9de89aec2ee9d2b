use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::dto::gallery_dto::MAX_IMAGE_BYTES;
use crate::handler::gallery_handler::{
    admin_gallery_handler, delete_gallery_image_handler, public_gallery_handler, update_gallery_image_handler,
    upload_gallery_image_handler,
};
use crate::middlewares::admin_middleware::{admin_api_guard, AdminAuthState};
use crate::service::gallery_service::GalleryService;

pub fn gallery_router(service: Arc<dyn GalleryService>, admin_auth_state: Arc<AdminAuthState>) -> Router {
    let public = Router::new().route("/api/public/gallery", get(public_gallery_handler));

    let admin = Router::new()
        .route("/api/gallery/admin", get(admin_gallery_handler))
        .route(
            "/api/gallery/upload",
            post(upload_gallery_image_handler).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024)),
        )
        .route(
            "/api/gallery/{id}",
            patch(update_gallery_image_handler).delete(delete_gallery_image_handler),
        )
        .route_layer(middleware::from_fn_with_state(admin_auth_state, admin_api_guard));

    public.merge(admin).with_state(service)
}
