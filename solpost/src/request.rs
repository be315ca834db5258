//! Schema-validated letter requests.
//!
//! The payload shape is checked once at pipeline entry, producing either a
//! fully-populated value or a single [`DispatchError::InvalidRequest`]. Later
//! pipeline steps never probe optional fields.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// Longest accepted letter body, in characters.
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Mail class accepted by the fulfillment service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailClass {
    /// Cheapest, slowest.
    Standard,
    /// Default.
    #[default]
    FirstClass,
    /// Fastest.
    Priority,
}

/// Print and mailing options for a letter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptions {
    /// Color printing; adds the configured surcharge.
    pub color: bool,
    /// Print on both sides of the sheet.
    pub double_sided: bool,
    /// Mail class to dispatch with.
    pub mail_class: MailClass,
}

/// Postal address of the letter recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientAddress {
    /// Full name of the recipient.
    pub name: String,
    /// Street address, first line.
    pub address_line1: String,
    /// Street address, second line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    /// City.
    pub city: String,
    /// State or province code. Optional in countries without one.
    #[serde(default)]
    pub state: String,
    /// ZIP or postal code.
    pub zip_code: String,
    /// ISO country code, e.g. `US`, `GB`. Defaults to `US`.
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "US".to_owned()
}

/// A letter dispatch request as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterRequest {
    /// Plain-text letter body.
    pub content: String,
    /// Where to mail the letter.
    pub recipient: RecipientAddress,
    /// Print and mailing options.
    #[serde(default)]
    pub options: PrintOptions,
}

impl LetterRequest {
    /// Validates required fields.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidRequest`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.content.trim().is_empty() {
            return Err(DispatchError::InvalidRequest(
                "letter content is empty".to_owned(),
            ));
        }
        if self.content.chars().count() > MAX_CONTENT_CHARS {
            return Err(DispatchError::InvalidRequest(format!(
                "letter content exceeds {MAX_CONTENT_CHARS} characters"
            )));
        }
        let recipient = &self.recipient;
        for (value, field) in [
            (&recipient.name, "recipient.name"),
            (&recipient.address_line1, "recipient.addressLine1"),
            (&recipient.city, "recipient.city"),
            (&recipient.zip_code, "recipient.zipCode"),
            (&recipient.country, "recipient.country"),
        ] {
            if value.trim().is_empty() {
                return Err(DispatchError::InvalidRequest(format!(
                    "missing required field: {field}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LetterRequest {
        LetterRequest {
            content: "Dear Ada,\n\nThe engine works.".to_owned(),
            recipient: RecipientAddress {
                name: "Ada Lovelace".to_owned(),
                address_line1: "12 St James's Square".to_owned(),
                address_line2: None,
                city: "London".to_owned(),
                state: String::new(),
                zip_code: "SW1Y 4JH".to_owned(),
                country: "GB".to_owned(),
            },
            options: PrintOptions::default(),
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let mut r = request();
        r.recipient.name = "   ".to_owned();
        let err = r.validate().unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRequest(ref m) if m.contains("recipient.name")));
    }

    #[test]
    fn empty_and_oversized_content_are_rejected() {
        let mut r = request();
        r.content = String::new();
        assert!(r.validate().is_err());

        r.content = "x".repeat(MAX_CONTENT_CHARS + 1);
        let err = r.validate().unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRequest(ref m) if m.contains("exceeds")));
    }

    #[test]
    fn options_default_to_first_class_black_and_white() {
        let parsed: LetterRequest = serde_json::from_str(
            r#"{
                "content": "hi",
                "recipient": {
                    "name": "A",
                    "addressLine1": "1 Main St",
                    "city": "Springfield",
                    "state": "IL",
                    "zipCode": "62701"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.recipient.country, "US");
        assert_eq!(parsed.options.mail_class, MailClass::FirstClass);
        assert!(!parsed.options.color);
    }
}
