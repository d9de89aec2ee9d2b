use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::history::HistoryEntry;
use crate::model::quote::{non_blank, NewQuote, QuoteChannel, QuoteItem, QuoteStatus};
use crate::util::error::ServiceError;

/// Body posted by the hero quick-quote, the quote section and the quote page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestForm {
    /// Originating form (`hero`, `section`, `page`), only logged.
    #[serde(default)]
    #[validate(length(max = 30))]
    pub form: Option<String>,

    #[serde(default)]
    #[validate(length(max = 120))]
    pub name: String,

    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(min = 6, max = 30))]
    pub phone: Option<String>,

    #[serde(default)]
    #[validate(length(max = 120))]
    pub vehicle_id: String,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub message: String,
}

impl QuoteRequestForm {
    /// Trim fields and turn blank optional ones into `None`.
    pub fn normalized(self) -> Self {
        QuoteRequestForm {
            form: self.form.and_then(non_blank),
            name: self.name.trim().to_string(),
            email: self.email.and_then(non_blank),
            phone: self.phone.and_then(non_blank),
            vehicle_id: self.vehicle_id.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    /// The single validator every quote form goes through.
    pub fn validate_submission(&self) -> Result<(), ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::InvalidInput(format!("Validation error: {}", e)))?;
        if self.vehicle_id.is_empty() {
            return Err(ServiceError::InvalidInput("vehicleId is required".to_string()));
        }
        if self.email.is_none() && self.phone.is_none() {
            return Err(ServiceError::InvalidInput("A phone number or an e-mail address is required".to_string()));
        }
        Ok(())
    }

    /// The stored fields of a quote, as if they had been posted again.
    pub fn from_quote(quote: &QuoteItem) -> Self {
        QuoteRequestForm {
            form: None,
            name: quote.name.clone(),
            email: quote.email.clone(),
            phone: quote.phone.clone(),
            vehicle_id: quote.vehicle_id.clone(),
            message: quote.message.clone(),
        }
    }

    pub fn origin(&self) -> &str {
        self.form.as_deref().unwrap_or("unknown")
    }

    pub fn into_new_quote(self) -> NewQuote {
        NewQuote {
            name: self.name,
            email: self.email,
            phone: self.phone,
            vehicle_id: self.vehicle_id,
            message: self.message,
            channel: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuoteResponse {
    pub channel: QuoteChannel,
    pub quote: QuoteItem,
    /// Link for the browser to open when WhatsApp was the winning channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuoteStatusRequest {
    pub status: QuoteStatus,
}

/// `?q=&status=&page=&limit=` on the admin quote list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteListQuery {
    pub q: Option<String>,
    pub status: Option<QuoteStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDetail {
    pub quote: QuoteItem,
    pub history: Vec<HistoryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> QuoteRequestForm {
        QuoteRequestForm {
            form: Some("hero".to_string()),
            name: "Luc".to_string(),
            email: Some("luc@example.com".to_string()),
            phone: None,
            vehicle_id: "K9K".to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(form().normalized().validate_submission().is_ok());
    }

    #[test]
    fn test_vehicle_is_required() {
        let f = QuoteRequestForm { vehicle_id: "   ".to_string(), ..form() }.normalized();
        assert!(f.validate_submission().is_err());
    }

    #[test]
    fn test_phone_or_email_is_required() {
        let f = QuoteRequestForm { email: Some(" ".to_string()), phone: None, ..form() }.normalized();
        assert!(f.validate_submission().is_err());

        let f = QuoteRequestForm { email: None, phone: Some("06 12 34 56 78".to_string()), ..form() }.normalized();
        assert!(f.validate_submission().is_ok());
    }

    #[test]
    fn test_malformed_email_is_rejected() {
        let f = QuoteRequestForm { email: Some("luc.example.com".to_string()), ..form() }.normalized();
        assert!(f.validate_submission().is_err());
    }

    #[test]
    fn test_form_parses_camel_case() {
        let f: QuoteRequestForm =
            serde_json::from_str(r#"{"form":"page","vehicleId":"M9R","phone":"0612345678"}"#).unwrap();
        assert_eq!(f.vehicle_id, "M9R");
        assert_eq!(f.origin(), "page");
    }
}
