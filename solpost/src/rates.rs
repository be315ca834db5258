//! Exchange-rate source contract.
//!
//! The oracle itself never retries and applies no fallback; the pipeline
//! substitutes a configured static rate on failure.

use rust_decimal::Decimal;

/// A validated, strictly positive SOL/USD exchange rate.
///
/// Construction is the only place positivity is checked, so downstream
/// pricing math can divide without guarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolRate(Decimal);

impl SolRate {
    /// Wraps a rate, rejecting zero and negative values.
    #[must_use]
    pub fn new(usd_per_sol: Decimal) -> Option<Self> {
        (usd_per_sol > Decimal::ZERO).then_some(Self(usd_per_sol))
    }

    /// USD per SOL.
    #[must_use]
    pub const fn usd_per_sol(self) -> Decimal {
        self.0
    }
}

/// Failure to obtain a usable exchange rate.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    /// The price feed could not be reached or answered with an error status.
    #[error("price feed request failed: {0}")]
    Transport(String),
    /// The price feed answered, but the body was unusable.
    #[error("price feed returned an unusable rate: {0}")]
    Invalid(String),
}

/// Source of the current SOL/USD exchange rate.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches the current rate. Implementations do not retry.
    async fn current_rate(&self) -> Result<SolRate, RateError>;
}

/// A fixed rate, used as the configured outage fallback and in tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticRate(pub SolRate);

#[async_trait::async_trait]
impl RateSource for StaticRate {
    async fn current_rate(&self) -> Result<SolRate, RateError> {
        Ok(self.0)
    }
}
