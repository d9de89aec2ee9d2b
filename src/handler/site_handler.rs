use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::service::sitemap_service::SitemapService;
use crate::util::error::HandlerError;

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn sitemap_handler(
    State(service): State<Arc<dyn SitemapService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let xml = service.sitemap_xml().await?;
    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml))
}
