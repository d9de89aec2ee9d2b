use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::model::settings::SiteSettings;
use crate::service::settings_service::SettingsService;
use crate::util::error::HandlerError;

pub async fn get_settings_handler(
    State(service): State<Arc<dyn SettingsService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.get().await?))
}

pub async fn update_settings_handler(
    State(service): State<Arc<dyn SettingsService>>,
    Json(payload): Json<SiteSettings>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.update(payload).await?))
}

pub async fn public_site_handler(State(service): State<Arc<dyn SettingsService>>) -> impl IntoResponse {
    Json(service.public_site().await)
}
