use axum::{routing::get, Router};
use std::sync::Arc;

use crate::handler::site_handler::{health_handler, sitemap_handler};
use crate::service::sitemap_service::SitemapService;

pub fn site_router(sitemap: Arc<dyn SitemapService>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/sitemap.xml", get(sitemap_handler))
        .with_state(sitemap)
}
