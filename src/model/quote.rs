use serde::{Deserialize, Serialize};

/// Transmission path a quote went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteChannel {
    Whatsapp,
    Email,
    Api,
    #[default]
    Unknown,
}

impl QuoteChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteChannel::Whatsapp => "whatsapp",
            QuoteChannel::Email => "email",
            QuoteChannel::Api => "api",
            QuoteChannel::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for QuoteChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin-managed processing status. Any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Nouveau,
    EnCours,
    Termine,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Nouveau => "nouveau",
            QuoteStatus::EnCours => "en_cours",
            QuoteStatus::Termine => "termine",
        }
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nouveau" => Ok(QuoteStatus::Nouveau),
            "en_cours" => Ok(QuoteStatus::EnCours),
            "termine" => Ok(QuoteStatus::Termine),
            other => Err(format!("unknown quote status: {}", other)),
        }
    }
}

/// Channel of an outbound admin reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseChannel {
    Whatsapp,
    Email,
}

impl ResponseChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseChannel::Whatsapp => "whatsapp",
            ResponseChannel::Email => "email",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub channel: ResponseChannel,
    pub message: String,
    pub created_at: String,
}

/// A quote request as kept in the mailbox blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub vehicle_id: String,
    #[serde(default)]
    pub message: String,
    pub created_at: String,
    #[serde(default)]
    pub channel: QuoteChannel,
    #[serde(default)]
    pub status: QuoteStatus,
    #[serde(default)]
    pub responses: Vec<QuoteResponse>,
}

/// Fields supplied by a form when a quote is recorded.
#[derive(Debug, Clone, Default)]
pub struct NewQuote {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub vehicle_id: String,
    pub message: String,
    pub channel: Option<QuoteChannel>,
}

/// Shallow patch; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub vehicle_id: Option<String>,
    pub message: Option<String>,
    pub channel: Option<QuoteChannel>,
    pub status: Option<QuoteStatus>,
    pub responses: Option<Vec<QuoteResponse>>,
}

impl QuotePatch {
    pub fn status(status: QuoteStatus) -> Self {
        QuotePatch { status: Some(status), ..QuotePatch::default() }
    }

    /// Whether the patch edits what the customer typed in the form.
    pub fn edits_submission(&self) -> bool {
        self.name.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.vehicle_id.is_some()
            || self.message.is_some()
    }

    pub fn apply(self, quote: &mut QuoteItem) {
        if let Some(name) = self.name {
            quote.name = name.trim().to_string();
        }
        if let Some(email) = self.email {
            quote.email = non_blank(email);
        }
        if let Some(phone) = self.phone {
            quote.phone = non_blank(phone);
        }
        if let Some(vehicle_id) = self.vehicle_id {
            quote.vehicle_id = vehicle_id.trim().to_string();
        }
        if let Some(message) = self.message {
            quote.message = message.trim().to_string();
        }
        if let Some(channel) = self.channel {
            quote.channel = channel;
        }
        if let Some(status) = self.status {
            quote.status = status;
        }
        if let Some(responses) = self.responses {
            quote.responses = responses;
        }
    }
}

/// Trimmed value, or `None` when nothing is left.
pub fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
