use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::dto::quote_dto::{AckResponse, QuoteListQuery, QuoteRequestForm, UpdateQuoteStatusRequest};
use crate::model::quote::QuotePatch;
use crate::service::quote_service::QuoteService;
use crate::service::submission::QuoteIntakeService;
use crate::util::error::{HandlerError, HandlerErrorKind};

// Handler: Submit a quote from any public form
pub async fn submit_quote_handler(
    State(service): State<Arc<dyn QuoteIntakeService>>,
    Json(form): Json<QuoteRequestForm>,
) -> Result<impl IntoResponse, HandlerError> {
    info!("[submit_quote_handler] Handler called");
    let response = service.submit(form).await?;
    info!("[submit_quote_handler] Quote {} recorded via {}", response.quote.id, response.channel);
    Ok((StatusCode::CREATED, Json(response)))
}

// Handler: Internal e-mail endpoint, the second channel of the chain
pub async fn quote_request_handler(
    State(service): State<Arc<dyn QuoteIntakeService>>,
    Json(form): Json<QuoteRequestForm>,
) -> Result<Json<AckResponse>, HandlerError> {
    service.notify_by_email(form).await.map_err(|e| {
        error!("[quote_request_handler] {}", e);
        HandlerError::from(e)
    })?;
    Ok(Json(AckResponse { ok: true }))
}

// Handler: List quotes (admin only)
pub async fn list_quotes_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Query(query): Query<QuoteListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = service.list_quotes(query).await?;
    Ok(Json(page))
}

// Handler: Get quote (admin only)
pub async fn get_quote_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let quote = service.get_quote(&id).await?;
    Ok(Json(quote))
}

// Handler: Inline edit (admin only)
pub async fn update_quote_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Path(id): Path<String>,
    Json(patch): Json<QuotePatch>,
) -> Result<impl IntoResponse, HandlerError> {
    let quote = service.update_quote(&id, patch).await?;
    Ok(Json(quote))
}

// Handler: Update quote status (admin only)
pub async fn update_quote_status_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuoteStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let quote = service.update_quote_status(&id, payload.status).await?;
    Ok(Json(quote))
}

// Handler: Delete quote (admin only)
pub async fn delete_quote_handler(
    State(service): State<Arc<dyn QuoteService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HandlerError> {
    if service.delete_quote(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HandlerError::new(HandlerErrorKind::NotFound, format!("Quote not found: {}", id)))
    }
}

// Handler: Bulk clear (admin only)
pub async fn clear_quotes_handler(
    State(service): State<Arc<dyn QuoteService>>,
) -> Result<StatusCode, HandlerError> {
    service.clear_quotes().await?;
    info!("[clear_quotes_handler] Quote mailbox cleared");
    Ok(StatusCode::NO_CONTENT)
}
