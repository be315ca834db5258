//! Fulfillment collaborator contract and letter payloads.
//!
//! The mail service is a black box reached by a single call. Submission
//! happens strictly after payment is confirmed and verified; a rejection
//! here therefore always means the charge already stands.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::request::{MailClass, PrintOptions, RecipientAddress};

/// Letter payload plus payment proof submitted to the mail service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterSubmission {
    /// Payment proof: the confirmed transaction signature.
    pub signature: String,
    /// Recipient postal address.
    pub address: RecipientAddress,
    /// Plain-text letter body.
    pub content: String,
    /// Body content type; always `text`.
    pub content_type: &'static str,
    /// Fiat price paid, for the service's records.
    pub price_usd: Decimal,
    /// Print and mailing configuration.
    pub mail_config: MailConfig,
}

/// Print configuration in the shape the mail service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailConfig {
    /// Item kind; always `letter`.
    pub mail_type: &'static str,
    /// Color printing.
    pub color: bool,
    /// Double-sided printing.
    pub double_sided: bool,
    /// Mail class.
    pub mail_class: MailClass,
}

impl From<PrintOptions> for MailConfig {
    fn from(options: PrintOptions) -> Self {
        Self {
            mail_type: "letter",
            color: options.color,
            double_sided: options.double_sided,
            mail_class: options.mail_class,
        }
    }
}

/// Fields returned by the mail service on acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentReceipt {
    /// Service-assigned letter id.
    pub letter_id: String,
    /// Carrier tracking number, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    /// Expected delivery date, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_delivery_date: Option<String>,
    /// Rendered-letter preview URL, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

/// Failure submitting a letter.
#[derive(Debug, thiserror::Error)]
pub enum FulfillmentError {
    /// The service answered non-2xx; its error text is carried.
    #[error("{0}")]
    Rejected(String),
    /// The service could not be reached or its answer not parsed.
    #[error("fulfillment service unreachable: {0}")]
    Transport(String),
}

/// External print-and-mail collaborator.
#[async_trait::async_trait]
pub trait LetterDispatcher: Send + Sync {
    /// Submits a paid letter for printing and mailing.
    async fn submit(
        &self,
        submission: &LetterSubmission,
    ) -> Result<FulfillmentReceipt, FulfillmentError>;
}
