use crate::config::{ConfigError, EmailConfig};
use crate::model::quote::NewQuote;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment as MailAttachment, Mailbox, MessageBuilder, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SMTP error: {0}")]
    SmtpError(String),

    #[error("Message building error: {0}")]
    MessageError(String),

    #[error("Address error: {0}")]
    AddressError(String),
}

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::ConfigError(err.to_string())
    }
}

/// File attached to an outgoing mail.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub reply_to: Option<String>,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl EmailMessage {
    pub fn new(to: String, subject: String) -> Self {
        Self {
            to,
            subject,
            reply_to: None,
            text_body: None,
            html_body: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_text_body(mut self, body: String) -> Self {
        self.text_body = Some(body);
        self
    }

    pub fn with_html_body(mut self, body: String) -> Self {
        self.html_body = Some(body);
        self
    }

    pub fn with_reply_to(mut self, reply_to: Option<String>) -> Self {
        self.reply_to = reply_to;
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// Outgoing mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError>;

    /// Address new quote notifications go to.
    fn quote_inbox(&self) -> &str;

    /// Display name used in subjects and signatures.
    fn sender_name(&self) -> &str;
}

pub struct SmtpEmailService {
    pub config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    #[instrument(skip(config), fields(host = %config.smtp_host, port = config.smtp_port))]
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        info!("Initializing SMTP email service");

        config.validate().map_err(EmailError::from)?;

        let mut transport_builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .timeout(Some(std::time::Duration::from_secs(config.connection_timeout_secs)));

        if config.use_tls {
            let tls_parameters = TlsParameters::new(config.smtp_host.clone())
                .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;

            if config.use_starttls {
                transport_builder = transport_builder.tls(Tls::Required(tls_parameters));
            } else {
                transport_builder = transport_builder.tls(Tls::Wrapper(tls_parameters));
            }
        } else {
            transport_builder = transport_builder.tls(Tls::None);
        }

        if !config.smtp_username.is_empty() && !config.smtp_password.is_empty() {
            let credentials = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
            transport_builder = transport_builder.credentials(credentials);
        }

        let transport = transport_builder.build();

        info!("SMTP email service initialized successfully");
        Ok(Self { config, transport })
    }

    fn build_message(&self, email_message: EmailMessage) -> Result<Message, EmailError> {
        let from_mailbox: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;

        let to_mailbox: Mailbox = email_message
            .to
            .parse()
            .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;

        let mut builder = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&email_message.subject);

        if let Some(reply_to) = &email_message.reply_to {
            let reply_to: Mailbox = reply_to
                .parse()
                .map_err(|e| EmailError::AddressError(format!("Invalid reply-to address: {}", e)))?;
            builder = builder.reply_to(reply_to);
        }

        assemble(builder, email_message.text_body, email_message.html_body, email_message.attachments)
    }
}

enum Body {
    Single(SinglePart),
    Alternative(MultiPart),
}

fn assemble(
    builder: MessageBuilder,
    text: Option<String>,
    html: Option<String>,
    attachments: Vec<Attachment>,
) -> Result<Message, EmailError> {
    let body = match (text, html) {
        (Some(text), Some(html)) => Body::Alternative(MultiPart::alternative_plain_html(text, html)),
        (Some(text), None) => Body::Single(SinglePart::plain(text)),
        (None, Some(html)) => Body::Single(SinglePart::html(html)),
        (None, None) => return Err(EmailError::MessageError("No message body provided".to_string())),
    };

    let result = if attachments.is_empty() {
        match body {
            Body::Single(part) => builder.singlepart(part),
            Body::Alternative(part) => builder.multipart(part),
        }
    } else {
        let mut mixed = match body {
            Body::Single(part) => MultiPart::mixed().singlepart(part),
            Body::Alternative(part) => MultiPart::mixed().multipart(part),
        };
        for attachment in attachments {
            let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                EmailError::MessageError(format!("Invalid attachment type '{}': {}", attachment.content_type, e))
            })?;
            mixed = mixed.singlepart(MailAttachment::new(attachment.filename).body(attachment.data, content_type));
        }
        builder.multipart(mixed)
    };

    result.map_err(|e| EmailError::MessageError(format!("Failed to build message: {}", e)))
}

#[async_trait]
impl Mailer for SmtpEmailService {
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject, attachments = message.attachments.len()))]
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!("Sending email to: {}", message.to);

        validate_email_address(&message.to)?;
        let email_message = self.build_message(message)?;

        self.transport.send(email_message).await.map_err(|e| {
            error!("Failed to send email: {}", e);
            EmailError::SmtpError(format!("Failed to send email: {}", e))
        })?;

        info!("Email sent successfully");
        Ok(())
    }

    fn quote_inbox(&self) -> &str {
        &self.config.quote_inbox_email
    }

    fn sender_name(&self) -> &str {
        &self.config.from_name
    }
}

pub fn validate_email_address(email: &str) -> Result<(), EmailError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(EmailError::AddressError("Invalid email format".to_string()));
    }
    Ok(())
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}

/// Notification sent to the shop inbox for a new quote request.
pub fn quote_notification_template(site_label: &str, quote: &NewQuote) -> (String, String, String) {
    let subject = format!("Nouvelle demande de devis - {}", quote.vehicle_id);
    let name = or_dash(Some(quote.name.as_str()));
    let email = or_dash(quote.email.as_deref());
    let phone = or_dash(quote.phone.as_deref());
    let message = or_dash(Some(quote.message.as_str()));

    let text = format!(
        "Nouvelle demande de devis sur {site_label}\n\n\
         Nom : {name}\n\
         E-mail : {email}\n\
         Téléphone : {phone}\n\
         Véhicule / référence : {vehicle}\n\n\
         Message :\n{message}\n",
        vehicle = quote.vehicle_id,
    );

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head><meta charset="UTF-8"><title>Nouvelle demande de devis</title></head>
<body style="font-family: Arial, sans-serif; color: #222; max-width: 600px; margin: 0 auto;">
    <h2>Nouvelle demande de devis</h2>
    <table cellpadding="6">
        <tr><td><strong>Nom</strong></td><td>{name}</td></tr>
        <tr><td><strong>E-mail</strong></td><td>{email}</td></tr>
        <tr><td><strong>Téléphone</strong></td><td>{phone}</td></tr>
        <tr><td><strong>Véhicule / référence</strong></td><td>{vehicle}</td></tr>
    </table>
    <p><strong>Message</strong></p>
    <p style="white-space: pre-line;">{message}</p>
    <p style="font-size: 12px; color: #888;">{site_label}</p>
</body>
</html>"#,
        name = html_escape::encode_text(name),
        email = html_escape::encode_text(email),
        phone = html_escape::encode_text(phone),
        vehicle = html_escape::encode_text(&quote.vehicle_id),
        message = html_escape::encode_text(message),
        site_label = html_escape::encode_text(site_label),
    );

    (subject, text, html)
}

/// Admin reply to a customer; `body` already carries the extras summary.
pub fn quote_reply_template(site_label: &str, customer_name: &str, body: &str) -> (String, String) {
    let greeting = if customer_name.trim().is_empty() {
        "Bonjour,".to_string()
    } else {
        format!("Bonjour {},", customer_name.trim())
    };

    let text = format!("{greeting}\n\n{body}\n\nCordialement,\n{site_label}\n");
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head><meta charset="UTF-8"><title>{site_label}</title></head>
<body style="font-family: Arial, sans-serif; color: #222; max-width: 600px; margin: 0 auto;">
    <p>{greeting}</p>
    <p style="white-space: pre-line;">{body}</p>
    <p>Cordialement,<br>{site_label}</p>
</body>
</html>"#,
        greeting = html_escape::encode_text(&greeting),
        body = html_escape::encode_text(body),
        site_label = html_escape::encode_text(site_label),
    );
    (text, html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_address() {
        assert!(validate_email_address("a@b.fr").is_ok());
        assert!(validate_email_address("ab.fr").is_err());
        assert!(validate_email_address("@b.fr").is_err());
        assert!(validate_email_address("a@b@c").is_err());
    }

    #[test]
    fn test_notification_escapes_html() {
        let quote = NewQuote {
            name: "<script>".to_string(),
            vehicle_id: "K9K 1.5 dCi".to_string(),
            phone: Some("0612345678".to_string()),
            ..NewQuote::default()
        };
        let (subject, text, html) = quote_notification_template("Atelier", &quote);
        assert_eq!(subject, "Nouvelle demande de devis - K9K 1.5 dCi");
        assert!(text.contains("E-mail : -"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_reply_greeting() {
        let (text, _) = quote_reply_template("Atelier", "Luc", "Prix : 900 EUR");
        assert!(text.starts_with("Bonjour Luc,"));
        let (text, _) = quote_reply_template("Atelier", " ", "Prix");
        assert!(text.starts_with("Bonjour,"));
    }

    #[test]
    fn test_message_with_attachment_builds() {
        let builder = Message::builder()
            .from("Atelier <devis@example.com>".parse().unwrap())
            .to("client@example.com".parse().unwrap())
            .subject("Devis");
        let attachment = Attachment {
            filename: "moteur.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            data: vec![0xFF, 0xD8, 0xFF],
        };
        let message = assemble(builder, Some("texte".into()), Some("<p>html</p>".into()), vec![attachment]);
        assert!(message.is_ok());
    }
}
