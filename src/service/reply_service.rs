use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::dto::quote_dto::QuoteDetail;
use crate::dto::reply_dto::{
    ClientReplyRequest, ReplyDelivery, ReplyDraft, ReplyOutcome, MAX_ATTACHMENTS, MAX_ATTACHMENT_BYTES,
};
use crate::model::client_reply::ClientReply;
use crate::model::history::merge_history;
use crate::model::quote::{QuoteItem, QuoteResponse, ResponseChannel};
use crate::repository::client_reply_repo::ClientReplyRepository;
use crate::repository::quote_store::QuoteRepository;
use crate::util::email::{quote_reply_template, Attachment, EmailMessage, Mailer};
use crate::util::error::ServiceError;
use crate::util::links::{mailto_link, whatsapp_link};

#[async_trait]
pub trait ReplyService: Send + Sync {
    /// Deliver a reply and, once delivered, append it to the quote's responses.
    async fn send_reply(&self, quote_id: &str, draft: ReplyDraft) -> Result<ReplyOutcome, ServiceError>;
    /// Quote with its outbound responses and inbound replies in one timeline.
    async fn history(&self, quote_id: &str) -> Result<QuoteDetail, ServiceError>;
    async fn list_client_replies(&self, quote_id: &str) -> Result<Vec<ClientReply>, ServiceError>;
    async fn record_client_reply(&self, quote_id: &str, request: ClientReplyRequest) -> Result<ClientReply, ServiceError>;
}

pub struct ReplyServiceImpl {
    pub quotes: Arc<dyn QuoteRepository>,
    pub client_replies: Arc<dyn ClientReplyRepository>,
    /// `None` when SMTP is not configured; e-mail replies then become `mailto:` links.
    pub mailer: Option<Arc<dyn Mailer>>,
}

fn reply_subject(quote: &QuoteItem) -> String {
    if quote.vehicle_id.is_empty() {
        "Votre demande de devis".to_string()
    } else {
        format!("Votre demande de devis - {}", quote.vehicle_id)
    }
}

pub fn check_attachments(attachments: &[Attachment]) -> Result<(), ServiceError> {
    if attachments.len() > MAX_ATTACHMENTS {
        return Err(ServiceError::InvalidInput(format!(
            "At most {} attachments are allowed",
            MAX_ATTACHMENTS
        )));
    }
    for attachment in attachments {
        if !attachment.content_type.starts_with("image/") {
            return Err(ServiceError::InvalidInput(format!(
                "{} is not an image",
                attachment.filename
            )));
        }
        if attachment.data.len() > MAX_ATTACHMENT_BYTES {
            return Err(ServiceError::InvalidInput(format!(
                "{} exceeds the 5 MB limit",
                attachment.filename
            )));
        }
    }
    Ok(())
}

/// Keeps a caller-supplied timestamp when it is valid RFC 3339.
fn reply_timestamp(created_at: Option<&str>) -> String {
    created_at
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| Utc::now().to_rfc3339())
}

impl ReplyServiceImpl {
    async fn load_quote(&self, quote_id: &str) -> Result<QuoteItem, ServiceError> {
        self.quotes
            .find(quote_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Quote not found: {}", quote_id)))
    }

    async fn deliver(&self, quote: &QuoteItem, draft: ReplyDraft, body: &str) -> Result<ReplyDelivery, ServiceError> {
        match draft.channel {
            ResponseChannel::Email => {
                let to = quote.email.as_deref().ok_or_else(|| {
                    ServiceError::InvalidInput("This quote has no e-mail address".to_string())
                })?;
                let subject = reply_subject(quote);
                let Some(mailer) = &self.mailer else {
                    info!("No mailer configured, handing back a mailto link");
                    return Ok(ReplyDelivery::Mailto { url: mailto_link(to, &subject, body) });
                };
                let (text, html) = quote_reply_template(mailer.sender_name(), &quote.name, body);
                let message = EmailMessage::new(to.to_string(), subject)
                    .with_text_body(text)
                    .with_html_body(html)
                    .with_attachments(draft.attachments);
                let res = mailer.send_email(message).await;
                match &res {
                    Ok(()) => info!("Reply e-mail sent"),
                    Err(e) => error!("Failed to send reply e-mail: {e}"),
                }
                res?;
                Ok(ReplyDelivery::EmailSent)
            }
            ResponseChannel::Whatsapp => {
                let phone = quote.phone.as_deref().ok_or_else(|| {
                    ServiceError::InvalidInput("This quote has no phone number".to_string())
                })?;
                let url = whatsapp_link(phone, body).ok_or_else(|| {
                    ServiceError::InvalidInput("The quote's phone number has no digits".to_string())
                })?;
                Ok(ReplyDelivery::Whatsapp { url })
            }
        }
    }
}

#[async_trait]
impl ReplyService for ReplyServiceImpl {
    #[instrument(skip(self, draft), fields(channel = draft.channel.as_str(), attachments = draft.attachments.len()))]
    async fn send_reply(&self, quote_id: &str, draft: ReplyDraft) -> Result<ReplyOutcome, ServiceError> {
        draft
            .validate()
            .map_err(|e| ServiceError::InvalidInput(format!("Validation error: {}", e)))?;
        if draft.message.trim().is_empty() {
            return Err(ServiceError::InvalidInput("message is required".to_string()));
        }
        check_attachments(&draft.attachments)?;
        if draft.channel == ResponseChannel::Whatsapp && !draft.attachments.is_empty() {
            warn!("Attachments are dropped on WhatsApp replies");
        }

        let quote = self.load_quote(quote_id).await?;
        let body = draft.composed_message();
        let channel = draft.channel;
        let delivery = self.deliver(&quote, draft, &body).await?;

        let response = QuoteResponse {
            channel,
            message: body,
            created_at: Utc::now().to_rfc3339(),
        };
        let quote = self
            .quotes
            .append_response(quote_id, response)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Quote not found: {}", quote_id)))?;
        info!("Reply recorded, {} responses on the quote", quote.responses.len());
        Ok(ReplyOutcome { delivery, quote })
    }

    #[instrument(skip(self))]
    async fn history(&self, quote_id: &str) -> Result<QuoteDetail, ServiceError> {
        let quote = self.load_quote(quote_id).await?;
        let replies = match self.client_replies.list_for_quote(quote_id).await {
            Ok(replies) => replies,
            Err(e) => {
                warn!("Client replies unavailable, showing local history only: {e}");
                Vec::new()
            }
        };
        let history = merge_history(&quote.responses, &replies);
        Ok(QuoteDetail { quote, history })
    }

    #[instrument(skip(self))]
    async fn list_client_replies(&self, quote_id: &str) -> Result<Vec<ClientReply>, ServiceError> {
        let res = self.client_replies.list_for_quote(quote_id).await;
        if let Err(e) = &res {
            error!("Failed to list client replies: {e}");
        }
        res.map_err(ServiceError::from)
    }

    #[instrument(skip(self, request), fields(channel = request.channel.as_str()))]
    async fn record_client_reply(&self, quote_id: &str, request: ClientReplyRequest) -> Result<ClientReply, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::InvalidInput(format!("Validation error: {}", e)))?;
        let message = request.message.trim().to_string();
        if message.is_empty() {
            return Err(ServiceError::InvalidInput("message is required".to_string()));
        }

        let reply = ClientReply {
            id: None,
            quote_id: quote_id.to_string(),
            from: request.from.map(|f| f.trim().to_string()).filter(|f| !f.is_empty()),
            channel: request.channel,
            message,
            created_at: reply_timestamp(request.created_at.as_deref()),
        };
        let res = self.client_replies.create(reply).await;
        match &res {
            Ok(_) => info!("Client reply recorded"),
            Err(e) => error!("Failed to record client reply: {e}"),
        }
        res.map_err(ServiceError::from)
    }
}
