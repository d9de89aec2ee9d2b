use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::dto::reply_dto::{ClientReplyRequest, ReplyDraft, ReplyExtras, MAX_ATTACHMENTS, MAX_ATTACHMENT_BYTES};
use crate::handler::{multipart_error, read_file_field, read_text_field};
use crate::model::quote::ResponseChannel;
use crate::service::reply_service::ReplyService;
use crate::util::email::Attachment;
use crate::util::error::HandlerError;

fn parse_channel(raw: &str) -> Result<ResponseChannel, HandlerError> {
    match raw.trim() {
        "email" => Ok(ResponseChannel::Email),
        "whatsapp" => Ok(ResponseChannel::Whatsapp),
        other => Err(HandlerError::bad_request(format!("Unknown reply channel: {}", other))),
    }
}

/// Multipart parts: `message`, `channel`, optional `extras` (JSON) and up to
/// five image parts named `attachments` or `file*`.
async fn read_draft(mut multipart: Multipart) -> Result<ReplyDraft, HandlerError> {
    const CONTEXT: &str = "send_reply_handler";
    let mut message: Option<String> = None;
    let mut channel: Option<ResponseChannel> = None;
    let mut extras = ReplyExtras::default();
    let mut attachments: Vec<Attachment> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(CONTEXT, e))? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        debug!("[{}] Processing field: {}", CONTEXT, name);
        match name.as_str() {
            "message" => message = Some(read_text_field(CONTEXT, field).await?),
            "channel" => channel = Some(parse_channel(&read_text_field(CONTEXT, field).await?)?),
            "extras" => {
                let raw = read_text_field(CONTEXT, field).await?;
                if !raw.trim().is_empty() {
                    extras = serde_json::from_str(&raw).map_err(|e| {
                        error!("[{}] Invalid extras JSON: {}", CONTEXT, e);
                        HandlerError::bad_request(format!("Invalid extras: {}", e))
                    })?;
                }
            }
            n if n == "attachments" || n.starts_with("file") => {
                if attachments.len() == MAX_ATTACHMENTS {
                    return Err(HandlerError::bad_request(format!(
                        "At most {} attachments are allowed",
                        MAX_ATTACHMENTS
                    )));
                }
                let file = read_file_field(CONTEXT, field, MAX_ATTACHMENT_BYTES).await?;
                info!("[{}] Received attachment: {} ({} bytes)", CONTEXT, file.filename, file.content.len());
                attachments.push(Attachment {
                    filename: file.filename,
                    content_type: file.content_type,
                    data: file.content,
                });
            }
            _ => debug!("[{}] Ignoring field {}", CONTEXT, name),
        }
    }

    Ok(ReplyDraft {
        message: message.ok_or_else(|| HandlerError::bad_request("Missing reply message"))?,
        channel: channel.ok_or_else(|| HandlerError::bad_request("Missing reply channel"))?,
        extras,
        attachments,
    })
}

// Handler: Send an admin reply (admin only)
pub async fn send_reply_handler(
    State(service): State<Arc<dyn ReplyService>>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let draft = read_draft(multipart).await?;
    let outcome = service.send_reply(&id, draft).await?;
    Ok(Json(outcome))
}

// Handler: Merged conversation under a quote (admin only)
pub async fn quote_history_handler(
    State(service): State<Arc<dyn ReplyService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let detail = service.history(&id).await?;
    Ok(Json(detail))
}

// Handler: List inbound replies (admin only)
pub async fn list_client_replies_handler(
    State(service): State<Arc<dyn ReplyService>>,
    Path(quote_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let replies = service.list_client_replies(&quote_id).await?;
    Ok(Json(replies))
}

// Handler: Inbound reply webhook (backend token)
pub async fn record_client_reply_handler(
    State(service): State<Arc<dyn ReplyService>>,
    Path(quote_id): Path<String>,
    Json(payload): Json<ClientReplyRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let reply = service.record_client_reply(&quote_id, payload).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}
