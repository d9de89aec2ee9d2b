use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::config::{QuoteApiConfig, SiteConfig};
use crate::dto::quote_dto::{QuoteRequestForm, SubmitQuoteResponse};
use crate::model::quote::{NewQuote, QuoteChannel};
use crate::repository::quote_store::QuoteRepository;
use crate::util::email::{quote_notification_template, EmailMessage, Mailer};
use crate::util::error::ServiceError;
use crate::util::links::{append_whatsapp_text, international_digits};

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSuccess {
    pub channel: QuoteChannel,
    /// Link the browser must open to finish the hand-off.
    pub redirect_url: Option<String>,
}

/// One way of transmitting a quote. Attempts are tried in order until one succeeds.
#[async_trait]
pub trait ChannelAttempt: Send + Sync {
    fn channel(&self) -> QuoteChannel;
    async fn attempt(&self, quote: &NewQuote) -> Result<ChannelSuccess, ChannelError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackOutcome {
    pub channel: QuoteChannel,
    pub whatsapp_url: Option<String>,
}

/// Walk `attempts` in order and stop at the first success. No retries; an
/// exhausted list yields channel `unknown`.
pub async fn submit_with_fallback(attempts: &[Arc<dyn ChannelAttempt>], quote: &NewQuote) -> FallbackOutcome {
    for attempt in attempts {
        let channel = attempt.channel();
        match attempt.attempt(quote).await {
            Ok(success) => {
                info!(channel = %success.channel, "Quote transmitted");
                return FallbackOutcome { channel: success.channel, whatsapp_url: success.redirect_url };
            }
            Err(e) => warn!(channel = %channel, "Quote channel failed, trying next: {}", e),
        }
    }
    warn!("Every quote channel failed");
    FallbackOutcome { channel: QuoteChannel::Unknown, whatsapp_url: None }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExternalQuotePayload<'a> {
    name: &'a str,
    email: Option<&'a str>,
    phone: Option<&'a str>,
    vehicle_id: &'a str,
    message: &'a str,
}

/// POSTs the quote as JSON to the configured quote API.
pub struct ExternalApiChannel {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl ExternalApiChannel {
    pub fn new(url: String, api_key: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ExternalApiChannel { client, url, api_key })
    }
}

#[async_trait]
impl ChannelAttempt for ExternalApiChannel {
    fn channel(&self) -> QuoteChannel {
        QuoteChannel::Api
    }

    #[instrument(skip(self, quote), fields(url = %self.url))]
    async fn attempt(&self, quote: &NewQuote) -> Result<ChannelSuccess, ChannelError> {
        let payload = ExternalQuotePayload {
            name: &quote.name,
            email: quote.email.as_deref(),
            phone: quote.phone.as_deref(),
            vehicle_id: &quote.vehicle_id,
            message: &quote.message,
        };
        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }
        let response = request.send().await.map_err(|e| ChannelError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Status(status.as_u16()));
        }
        Ok(ChannelSuccess { channel: QuoteChannel::Api, redirect_url: None })
    }
}

/// Sends the notification mail to the shop inbox.
pub struct InternalEmailChannel {
    mailer: Arc<dyn Mailer>,
    site_label: String,
}

impl InternalEmailChannel {
    pub fn new(mailer: Arc<dyn Mailer>, site_label: String) -> Self {
        InternalEmailChannel { mailer, site_label }
    }

    pub async fn notify(&self, quote: &NewQuote) -> Result<(), crate::util::email::EmailError> {
        let (subject, text, html) = quote_notification_template(&self.site_label, quote);
        let message = EmailMessage::new(self.mailer.quote_inbox().to_string(), subject)
            .with_reply_to(quote.email.clone())
            .with_text_body(text)
            .with_html_body(html);
        self.mailer.send_email(message).await
    }
}

#[async_trait]
impl ChannelAttempt for InternalEmailChannel {
    fn channel(&self) -> QuoteChannel {
        QuoteChannel::Email
    }

    async fn attempt(&self, quote: &NewQuote) -> Result<ChannelSuccess, ChannelError> {
        self.notify(quote).await.map_err(|e| ChannelError::Rejected(e.to_string()))?;
        Ok(ChannelSuccess { channel: QuoteChannel::Email, redirect_url: None })
    }
}

/// Builds the prefilled click-to-chat link; never fails.
pub struct WhatsAppChannel {
    base_url: String,
}

impl WhatsAppChannel {
    pub fn new(base_url: String) -> Self {
        WhatsAppChannel { base_url }
    }
}

/// Text prefilled in the customer's WhatsApp conversation with the shop.
pub fn whatsapp_quote_text(quote: &NewQuote) -> String {
    let mut lines = vec![format!("Bonjour, je souhaite un devis pour : {}", quote.vehicle_id)];
    if !quote.name.is_empty() {
        lines.push(format!("Nom : {}", quote.name));
    }
    if let Some(phone) = &quote.phone {
        lines.push(format!("Téléphone : {}", phone));
    }
    if let Some(email) = &quote.email {
        lines.push(format!("E-mail : {}", email));
    }
    if !quote.message.is_empty() {
        lines.push(quote.message.clone());
    }
    lines.join("\n")
}

#[async_trait]
impl ChannelAttempt for WhatsAppChannel {
    fn channel(&self) -> QuoteChannel {
        QuoteChannel::Whatsapp
    }

    async fn attempt(&self, quote: &NewQuote) -> Result<ChannelSuccess, ChannelError> {
        let url = append_whatsapp_text(&self.base_url, &whatsapp_quote_text(quote));
        Ok(ChannelSuccess { channel: QuoteChannel::Whatsapp, redirect_url: Some(url) })
    }
}

/// The ordered channel list for this deployment: API, then internal mail, then
/// WhatsApp, each only when configured. WhatsApp falls back to the contact phone
/// when no click-to-chat URL is set.
pub fn build_attempts(
    quote_api: &QuoteApiConfig,
    email_channel: Option<Arc<InternalEmailChannel>>,
    site: &SiteConfig,
) -> Vec<Arc<dyn ChannelAttempt>> {
    let mut attempts: Vec<Arc<dyn ChannelAttempt>> = Vec::new();
    if let Some(url) = &quote_api.api_url {
        match ExternalApiChannel::new(url.clone(), quote_api.api_key.clone(), Duration::from_secs(quote_api.timeout_secs)) {
            Ok(channel) => attempts.push(Arc::new(channel)),
            Err(e) => error!("Quote API channel disabled, HTTP client failed to build: {}", e),
        }
    }
    if let Some(channel) = email_channel {
        attempts.push(channel);
    }
    let whatsapp_base = site.whatsapp_url.clone().or_else(|| {
        let digits = international_digits(site.contact_phone.as_deref()?);
        (!digits.is_empty()).then(|| format!("https://wa.me/{}", digits))
    });
    match whatsapp_base {
        Some(url) => attempts.push(Arc::new(WhatsAppChannel::new(url))),
        None => warn!("Neither WHATSAPP_URL nor CONTACT_PHONE is set, quotes have no WhatsApp fallback"),
    }
    info!(
        "Quote channels: {:?}",
        attempts.iter().map(|a| a.channel().as_str()).collect::<Vec<_>>()
    );
    attempts
}

#[async_trait]
pub trait QuoteIntakeService: Send + Sync {
    /// Validate, transmit through the first working channel, then record.
    async fn submit(&self, form: QuoteRequestForm) -> Result<SubmitQuoteResponse, ServiceError>;
    /// The internal e-mail endpoint on its own.
    async fn notify_by_email(&self, form: QuoteRequestForm) -> Result<(), ServiceError>;
}

pub struct QuoteIntakeServiceImpl {
    pub quotes: Arc<dyn QuoteRepository>,
    pub attempts: Vec<Arc<dyn ChannelAttempt>>,
    pub email_channel: Option<Arc<InternalEmailChannel>>,
}

#[async_trait]
impl QuoteIntakeService for QuoteIntakeServiceImpl {
    #[instrument(skip(self, form), fields(form = form.origin()))]
    async fn submit(&self, form: QuoteRequestForm) -> Result<SubmitQuoteResponse, ServiceError> {
        let form = form.normalized();
        form.validate_submission()?;
        info!("Quote request received from the {} form", form.origin());

        let mut new_quote = form.into_new_quote();
        let outcome = submit_with_fallback(&self.attempts, &new_quote).await;
        new_quote.channel = Some(outcome.channel);

        let quote = self.quotes.add(new_quote).await.map_err(|e| {
            error!("Failed to record quote: {}", e);
            ServiceError::from(e)
        })?;

        Ok(SubmitQuoteResponse { channel: outcome.channel, quote, whatsapp_url: outcome.whatsapp_url })
    }

    #[instrument(skip(self, form), fields(form = form.origin()))]
    async fn notify_by_email(&self, form: QuoteRequestForm) -> Result<(), ServiceError> {
        let form = form.normalized();
        form.validate_submission()?;
        let channel = self
            .email_channel
            .as_ref()
            .ok_or_else(|| ServiceError::Upstream("Mail delivery is not configured".to_string()))?;
        channel.notify(&form.into_new_quote()).await.map_err(|e| {
            error!("Quote notification failed: {}", e);
            ServiceError::Upstream(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Scripted {
        channel: QuoteChannel,
        succeed: bool,
        calls: Arc<Mutex<Vec<QuoteChannel>>>,
    }

    #[async_trait]
    impl ChannelAttempt for Scripted {
        fn channel(&self) -> QuoteChannel {
            self.channel
        }

        async fn attempt(&self, _quote: &NewQuote) -> Result<ChannelSuccess, ChannelError> {
            self.calls.lock().unwrap().push(self.channel);
            if self.succeed {
                Ok(ChannelSuccess { channel: self.channel, redirect_url: None })
            } else {
                Err(ChannelError::Status(500))
            }
        }
    }

    fn chain(script: &[(QuoteChannel, bool)]) -> (Vec<Arc<dyn ChannelAttempt>>, Arc<Mutex<Vec<QuoteChannel>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let attempts = script
            .iter()
            .map(|(channel, succeed)| {
                Arc::new(Scripted { channel: *channel, succeed: *succeed, calls: calls.clone() }) as Arc<dyn ChannelAttempt>
            })
            .collect();
        (attempts, calls)
    }

    fn quote() -> NewQuote {
        NewQuote { vehicle_id: "K9K".to_string(), phone: Some("0612345678".to_string()), ..NewQuote::default() }
    }

    #[tokio::test]
    async fn test_first_success_wins_and_stops_the_chain() {
        let (attempts, calls) =
            chain(&[(QuoteChannel::Api, false), (QuoteChannel::Email, true), (QuoteChannel::Whatsapp, true)]);
        let outcome = submit_with_fallback(&attempts, &quote()).await;
        assert_eq!(outcome.channel, QuoteChannel::Email);
        assert_eq!(*calls.lock().unwrap(), vec![QuoteChannel::Api, QuoteChannel::Email]);
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_unknown() {
        let (attempts, calls) = chain(&[(QuoteChannel::Api, false), (QuoteChannel::Email, false)]);
        let outcome = submit_with_fallback(&attempts, &quote()).await;
        assert_eq!(outcome.channel, QuoteChannel::Unknown);
        assert!(outcome.whatsapp_url.is_none());
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_chain_is_unknown() {
        assert_eq!(submit_with_fallback(&[], &quote()).await.channel, QuoteChannel::Unknown);
    }

    #[tokio::test]
    async fn test_whatsapp_channel_builds_prefilled_link() {
        let channel = WhatsAppChannel::new("https://wa.me/33600000000".to_string());
        let success = channel.attempt(&quote()).await.unwrap();
        let url = success.redirect_url.unwrap();
        assert!(url.starts_with("https://wa.me/33600000000?text=Bonjour%2C%20je%20souhaite"));
        assert!(url.contains("K9K"));
    }

    #[test]
    fn test_build_attempts_skips_unconfigured_channels() {
        let site = SiteConfig { whatsapp_url: None, ..SiteConfig::default() };
        assert!(build_attempts(&QuoteApiConfig::default(), None, &site).is_empty());

        let site = SiteConfig { whatsapp_url: Some("https://wa.me/33600000000".to_string()), ..SiteConfig::default() };
        let api = QuoteApiConfig { api_url: Some("https://api.example.com/quotes".to_string()), timeout_secs: 5, ..QuoteApiConfig::default() };
        let channels: Vec<QuoteChannel> = build_attempts(&api, None, &site).iter().map(|a| a.channel()).collect();
        assert_eq!(channels, vec![QuoteChannel::Api, QuoteChannel::Whatsapp]);
    }

    #[tokio::test]
    async fn test_whatsapp_falls_back_to_the_contact_phone() {
        let site = SiteConfig {
            whatsapp_url: None,
            contact_phone: Some("06 12 34 56 78".to_string()),
            ..SiteConfig::default()
        };
        let attempts = build_attempts(&QuoteApiConfig::default(), None, &site);
        assert_eq!(attempts.len(), 1);

        let outcome = submit_with_fallback(&attempts, &quote()).await;
        assert_eq!(outcome.channel, QuoteChannel::Whatsapp);
        assert!(outcome.whatsapp_url.unwrap().starts_with("https://wa.me/33612345678?text="));
    }
}
