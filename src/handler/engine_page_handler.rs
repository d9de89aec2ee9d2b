use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::dto::engine_page_dto::{EnginePageListQuery, EnginePageRequest};
use crate::dto::pagination::ListQuery;
use crate::service::engine_page_service::EnginePageService;
use crate::util::error::HandlerError;

pub async fn list_engine_pages_handler(
    State(service): State<Arc<dyn EnginePageService>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_admin(query).await?))
}

pub async fn get_engine_page_handler(
    State(service): State<Arc<dyn EnginePageService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get(&id).await?))
}

pub async fn create_engine_page_handler(
    State(service): State<Arc<dyn EnginePageService>>,
    Json(payload): Json<EnginePageRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

pub async fn update_engine_page_handler(
    State(service): State<Arc<dyn EnginePageService>>,
    Path(id): Path<String>,
    Json(payload): Json<EnginePageRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.update(&id, payload).await?))
}

pub async fn delete_engine_page_handler(
    State(service): State<Arc<dyn EnginePageService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HandlerError> {
    service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Rows are taken as raw JSON so one malformed row does not reject the batch.
pub async fn import_engine_pages_handler(
    State(service): State<Arc<dyn EnginePageService>>,
    Json(rows): Json<Vec<Value>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.import(rows).await?))
}

pub async fn public_engine_pages_handler(
    State(service): State<Arc<dyn EnginePageService>>,
    Query(query): Query<EnginePageListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_public(query).await?))
}

pub async fn engine_brands_handler(
    State(service): State<Arc<dyn EnginePageService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.brands().await?))
}

pub async fn engine_pages_by_brand_handler(
    State(service): State<Arc<dyn EnginePageService>>,
    Path(marque): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_by_brand(&marque, query).await?))
}

pub async fn public_engine_page_handler(
    State(service): State<Arc<dyn EnginePageService>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get_public(&slug).await?))
}
