//! Print-and-mail fulfillment client.
//!
//! One `POST send-letter` call carrying the letter payload and the payment
//! signature as proof. A non-2xx answer surfaces the service's own error
//! text; the caller decides what a rejection after payment means.

use serde::Deserialize;
use solpost::fulfillment::{
    FulfillmentError, FulfillmentReceipt, LetterDispatcher, LetterSubmission,
};
use url::Url;

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Client for the external mail fulfillment service.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    http: reqwest::Client,
    base: Url,
}

impl HttpMailer {
    /// Creates a client against the service base URL.
    #[must_use]
    pub const fn new(http: reqwest::Client, base: Url) -> Self {
        Self { http, base }
    }
}

#[async_trait::async_trait]
impl LetterDispatcher for HttpMailer {
    async fn submit(
        &self,
        submission: &LetterSubmission,
    ) -> Result<FulfillmentReceipt, FulfillmentError> {
        let url = self
            .base
            .join("send-letter")
            .map_err(|e| FulfillmentError::Transport(e.to_string()))?;
        let response = self
            .http
            .post(url)
            .json(submission)
            .send()
            .await
            .map_err(|e| FulfillmentError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let receipt: FulfillmentReceipt = response
                .json()
                .await
                .map_err(|e| FulfillmentError::Transport(e.to_string()))?;
            tracing::info!(letter_id = %receipt.letter_id, "letter accepted for fulfillment");
            return Ok(receipt);
        }

        let reason = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| format!("fulfillment service answered {status}"));
        Err(FulfillmentError::Rejected(reason))
    }
}
