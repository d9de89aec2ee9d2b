use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::dto::gallery_dto::{GalleryPatchRequest, GalleryUploadForm, UploadedFile, MAX_IMAGE_BYTES};
use crate::dto::pagination::ListQuery;
use crate::handler::{multipart_error, read_file_field, read_text_field};
use crate::service::gallery_service::GalleryService;
use crate::util::error::HandlerError;

// Handler: Published images for the public gallery
pub async fn public_gallery_handler(
    State(service): State<Arc<dyn GalleryService>>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_public().await?))
}

// Handler: Searchable image list (admin only)
pub async fn admin_gallery_handler(
    State(service): State<Arc<dyn GalleryService>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.list_admin(query).await?))
}

// Handler: Upload one image (admin only)
pub async fn upload_gallery_image_handler(
    State(service): State<Arc<dyn GalleryService>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    const CONTEXT: &str = "upload_gallery_image_handler";
    let mut file: Option<UploadedFile> = None;
    let mut form = GalleryUploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(CONTEXT, e))? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        match name.as_str() {
            "file" => {
                let upload = read_file_field(CONTEXT, field, MAX_IMAGE_BYTES).await?;
                info!("[{}] Received file: {} ({} bytes)", CONTEXT, upload.filename, upload.content.len());
                file = Some(upload);
            }
            "title" => form.title = Some(read_text_field(CONTEXT, field).await?),
            "alt" => form.alt = Some(read_text_field(CONTEXT, field).await?),
            "category" => form.category = Some(read_text_field(CONTEXT, field).await?),
            _ => debug!("[{}] Ignoring field {}", CONTEXT, name),
        }
    }

    let file = file.ok_or_else(|| HandlerError::bad_request("Missing file part"))?;
    let image = service.upload(file, form).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

// Handler: Inline edit (admin only)
pub async fn update_gallery_image_handler(
    State(service): State<Arc<dyn GalleryService>>,
    Path(id): Path<String>,
    Json(patch): Json<GalleryPatchRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    Ok(Json(service.update(&id, patch).await?))
}

// Handler: Delete document and stored object (admin only)
pub async fn delete_gallery_image_handler(
    State(service): State<Arc<dyn GalleryService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HandlerError> {
    service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
