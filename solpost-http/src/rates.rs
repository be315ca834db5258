//! SOL/USD price feed client.
//!
//! Talks to a CoinGecko-shaped endpoint returning
//! `{"solana": {"usd": <rate>}}`. Best-effort by contract: one request, no
//! retries; the pipeline owns the fallback policy.

use rust_decimal::Decimal;
use serde::Deserialize;
use solpost::rates::{RateError, RateSource, SolRate};
use url::Url;

/// Public endpoint used when none is configured.
pub const DEFAULT_FEED_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=solana&vs_currencies=usd";

#[derive(Debug, Deserialize)]
struct FeedBody {
    solana: FeedEntry,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    usd: Decimal,
}

/// HTTP price feed implementing [`RateSource`].
#[derive(Debug, Clone)]
pub struct HttpRateFeed {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpRateFeed {
    /// Creates a feed client against the given endpoint.
    #[must_use]
    pub const fn new(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }
}

#[async_trait::async_trait]
impl RateSource for HttpRateFeed {
    async fn current_rate(&self) -> Result<SolRate, RateError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| RateError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Transport(format!(
                "price feed answered {status}"
            )));
        }
        let body: FeedBody = response
            .json()
            .await
            .map_err(|e| RateError::Invalid(e.to_string()))?;
        let rate = SolRate::new(body.solana.usd)
            .ok_or_else(|| RateError::Invalid(format!("non-positive rate {}", body.solana.usd)))?;
        tracing::debug!(usd_per_sol = %rate.usd_per_sol(), "fetched exchange rate");
        Ok(rate)
    }
}
