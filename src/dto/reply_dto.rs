use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::quote::{QuoteItem, ResponseChannel};
use crate::util::email::Attachment;

pub const MAX_ATTACHMENTS: usize = 5;
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: String,
}

/// Structured details the admin can add under a reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyExtras {
    pub price: Option<String>,
    pub mileage: Option<String>,
    pub delivery_delay: Option<String>,
    pub reference: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub tests_performed: Vec<String>,
    pub defects: Option<String>,
}

impl ReplyExtras {
    /// Plain-text block appended to the reply, empty when nothing is set.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        let mut push = |label: &str, value: &Option<String>| {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                lines.push(format!("{} : {}", label, v));
            }
        };
        push("Référence", &self.reference);
        push("Prix", &self.price);
        push("Kilométrage", &self.mileage);
        push("Délai de livraison", &self.delivery_delay);

        let items: Vec<&LineItem> = self.line_items.iter().filter(|i| !i.label.trim().is_empty()).collect();
        if !items.is_empty() {
            lines.push("Détail :".to_string());
            lines.extend(items.iter().map(|i| format!("- {} : {}", i.label.trim(), i.amount.trim())));
        }

        let tests: Vec<&str> = self.tests_performed.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
        if !tests.is_empty() {
            lines.push("Tests effectués :".to_string());
            lines.extend(tests.iter().map(|t| format!("- {}", t)));
        }

        if let Some(defects) = self.defects.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            lines.push(format!("Défauts constatés : {}", defects));
        }
        lines.join("\n")
    }
}

/// Reply composed in the admin screen; nothing is stored until it is sent.
#[derive(Debug, Clone, Validate)]
pub struct ReplyDraft {
    #[validate(length(min = 1, max = 10000))]
    pub message: String,
    pub channel: ResponseChannel,
    pub extras: ReplyExtras,
    pub attachments: Vec<Attachment>,
}

impl ReplyDraft {
    /// Message plus the extras summary; this is what gets sent and stored.
    pub fn composed_message(&self) -> String {
        let summary = self.extras.summary();
        if summary.is_empty() {
            self.message.trim().to_string()
        } else {
            format!("{}\n\n{}", self.message.trim(), summary)
        }
    }
}

/// How a reply left the back-office.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyDelivery {
    /// Sent through the configured mail server.
    EmailSent,
    /// Prefilled `mailto:` link for the admin's mail client.
    Mailto { url: String },
    /// Prefilled `wa.me` link.
    Whatsapp { url: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplyOutcome {
    pub delivery: ReplyDelivery,
    pub quote: QuoteItem,
}

/// Inbound customer message posted by the mail/WhatsApp bridge.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientReplyRequest {
    #[validate(length(max = 200))]
    pub from: Option<String>,
    pub channel: ResponseChannel,
    #[validate(length(min = 1, max = 10000))]
    pub message: String,
    pub created_at: Option<String>,
}
