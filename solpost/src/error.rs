//! Error taxonomy for the letter dispatch pipeline.
//!
//! Variants up to and including [`DispatchError::BroadcastFailed`] abort with
//! no financial side effect. [`DispatchError::PaymentFailed`] and
//! [`DispatchError::FulfillmentRejected`] are raised after the charge has
//! been taken: both carry the transaction signature and amount so an
//! out-of-band reconciliation can issue a refund. The pipeline never refunds
//! automatically.

use crate::tier::Tier;

/// Errors produced by the quote and dispatch operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    /// The presented API key is malformed or maps to no active subscription.
    /// The two causes are deliberately indistinguishable.
    #[error("invalid or unknown API key")]
    InvalidCredential,

    /// The monthly letter allowance is exhausted. No charge was attempted.
    #[error("monthly letter limit reached: {limit} letters on the {tier} tier")]
    QuotaExceeded {
        /// The caller's resolved tier.
        tier: Tier,
        /// The tier's monthly letter cap.
        limit: u32,
    },

    /// The request payload failed schema validation at pipeline entry.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The exchange-rate feed failed and no fallback rate is configured.
    #[error("exchange rate unavailable and no fallback rate configured")]
    PricingUnavailable,

    /// The payer wallet cannot cover the letter price plus the fee reserve.
    /// Broadcast was never attempted.
    #[error("insufficient funds: {required} lamports required, wallet holds {available}")]
    InsufficientFunds {
        /// Letter price plus fee reserve, in lamports.
        required: u64,
        /// Current wallet balance, in lamports.
        available: u64,
    },

    /// The supplied signing key material could not be decoded into a keypair.
    #[error("signing key could not be decoded")]
    InvalidSigningKey,

    /// The ledger rejected or timed out the broadcast; nothing was committed.
    #[error("payment broadcast failed: {0}")]
    BroadcastFailed(String),

    /// The transaction confirmed but the post-broadcast verification found an
    /// on-chain execution error. The charge may already have been taken;
    /// the signature is retained for manual reconciliation.
    #[error("payment {signature} did not verify on-chain: {reason}")]
    PaymentFailed {
        /// Transaction signature for reconciliation.
        signature: String,
        /// Amount charged, in lamports.
        lamports: u64,
        /// The ledger's execution error.
        reason: String,
    },

    /// The fulfillment service rejected the letter after payment was taken.
    /// The charge stands; a refund path exists outside this pipeline.
    #[error("letter rejected after payment {signature} was taken: {reason}")]
    FulfillmentRejected {
        /// Transaction signature of the payment already taken.
        signature: String,
        /// Amount charged, in lamports.
        lamports: u64,
        /// The fulfillment service's error text.
        reason: String,
    },

    /// The billing backend failed before any charge was attempted.
    #[error("billing backend error: {0}")]
    Billing(String),
}

impl DispatchError {
    /// Machine-readable error kind for response payloads.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "invalid_credential",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::InvalidRequest(_) => "invalid_request",
            Self::PricingUnavailable => "pricing_unavailable",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InvalidSigningKey => "invalid_signing_key",
            Self::BroadcastFailed(_) => "payment_broadcast_failed",
            Self::PaymentFailed { .. } => "payment_failed",
            Self::FulfillmentRejected { .. } => "fulfillment_rejected",
            Self::Billing(_) => "billing_unavailable",
        }
    }

    /// Lamports missing from the wallet, for [`Self::InsufficientFunds`].
    #[must_use]
    pub const fn shortfall(&self) -> Option<u64> {
        match self {
            Self::InsufficientFunds {
                required,
                available,
            } => Some(required.saturating_sub(*available)),
            _ => None,
        }
    }

    /// Signature and amount of a charge that was already taken, if any.
    ///
    /// `Some` marks the partial-failure window: payment succeeded but the
    /// request as a whole did not.
    #[must_use]
    pub fn charged(&self) -> Option<(&str, u64)> {
        match self {
            Self::PaymentFailed {
                signature,
                lamports,
                ..
            }
            | Self::FulfillmentRejected {
                signature,
                lamports,
                ..
            } => Some((signature, *lamports)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortfall_is_required_minus_available() {
        let err = DispatchError::InsufficientFunds {
            required: 20_005_000,
            available: 15_000_000,
        };
        assert_eq!(err.shortfall(), Some(5_005_000));
        assert_eq!(DispatchError::InvalidCredential.shortfall(), None);
    }

    #[test]
    fn charged_marks_post_payment_failures_only() {
        let verify = DispatchError::PaymentFailed {
            signature: "sig".into(),
            lamports: 42,
            reason: "custom program error".into(),
        };
        assert_eq!(verify.charged(), Some(("sig", 42)));

        let rejected = DispatchError::FulfillmentRejected {
            signature: "sig".into(),
            lamports: 42,
            reason: "address not deliverable".into(),
        };
        assert_eq!(rejected.charged(), Some(("sig", 42)));

        assert_eq!(DispatchError::PricingUnavailable.charged(), None);
        assert_eq!(
            DispatchError::BroadcastFailed("timeout".into()).charged(),
            None
        );
    }
}
