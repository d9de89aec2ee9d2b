//! Prefilled WhatsApp and mail links handed back to the browser.

/// Digits of a phone number in international form, without `+`.
///
/// A French national number (`0` + 9 digits) gets the `33` country code.
pub fn international_digits(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if let Some(rest) = digits.strip_prefix("00") {
        rest.to_string()
    } else if digits.len() == 10 && digits.starts_with('0') {
        format!("33{}", &digits[1..])
    } else {
        digits
    }
}

/// `https://wa.me/<digits>?text=<message>`, or `None` when the phone has no digits.
pub fn whatsapp_link(phone: &str, text: &str) -> Option<String> {
    let digits = international_digits(phone);
    if digits.is_empty() {
        return None;
    }
    Some(format!("https://wa.me/{}?text={}", digits, urlencoding::encode(text)))
}

/// Adds `text=` to an already configured click-to-chat URL.
pub fn append_whatsapp_text(base_url: &str, text: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}text={}", base_url, separator, urlencoding::encode(text))
}

pub fn mailto_link(to: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        to.trim(),
        urlencoding::encode(subject),
        urlencoding::encode(body)
    )
}
