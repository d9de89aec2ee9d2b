pub mod auth_handler;
pub mod engine_page_handler;
pub mod gallery_handler;
pub mod quote_handler;
pub mod reply_handler;
pub mod settings_handler;
pub mod site_handler;

use axum::extract::multipart::{Field, MultipartError};
use bytes::BytesMut;
use tracing::error;

use crate::dto::gallery_dto::UploadedFile;
use crate::util::error::{HandlerError, HandlerErrorKind};

pub(crate) fn multipart_error(context: &str, e: MultipartError) -> HandlerError {
    error!("[{}] Malformed multipart body: {}", context, e);
    HandlerError::bad_request(format!("Failed to read multipart body: {}", e))
}

/// Read a file part chunk by chunk, refusing it once it passes `max_bytes`.
pub(crate) async fn read_file_field(
    context: &str,
    mut field: Field<'_>,
    max_bytes: usize,
) -> Result<UploadedFile, HandlerError> {
    let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
    let content_type = field.content_type().map(|s| s.to_string()).unwrap_or_default();
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(context, e))? {
        if buf.len() + chunk.len() > max_bytes {
            error!("[{}] File {} is over {} bytes", context, filename, max_bytes);
            return Err(HandlerError::new(
                HandlerErrorKind::PayloadTooLarge,
                format!("{} exceeds the 5 MB limit", filename),
            ));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(UploadedFile { filename, content_type, content: buf.to_vec() })
}

pub(crate) async fn read_text_field(context: &str, field: Field<'_>) -> Result<String, HandlerError> {
    field.text().await.map_err(|e| multipart_error(context, e))
}
