//! Payment rail contract.
//!
//! A rail charges the caller's wallet for a letter: balance check, build,
//! sign, broadcast, and confirmation are one operation; the independent
//! executed-without-error re-check is a second. Confirmation only proves
//! inclusion; the re-check is what catches a transaction that landed but
//! failed at execution.

use serde::Serialize;

/// Receipt for a confirmed on-chain payment.
///
/// The signature is the only artifact retained for recovery; signed
/// transaction bytes are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    /// Ledger-assigned transaction signature.
    pub signature: String,
    /// Amount transferred, in lamports.
    pub lamports: u64,
    /// Payer wallet address.
    pub payer: String,
    /// Payee wallet address.
    pub payee: String,
}

/// Payer wallet snapshot for the balance and address views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatus {
    /// Wallet address, base58.
    pub address: String,
    /// Balance in lamports.
    pub lamports: u64,
}

/// Failures raised by a payment rail.
#[derive(Debug, thiserror::Error)]
pub enum RailError {
    /// The signing key material could not be decoded into a keypair.
    #[error("signing key could not be decoded")]
    InvalidSigningKey,

    /// Balance below amount plus fee reserve; broadcast was not attempted.
    #[error("insufficient funds: {required} lamports required, wallet holds {available}")]
    InsufficientFunds {
        /// Amount plus fee reserve, in lamports.
        required: u64,
        /// Current balance, in lamports.
        available: u64,
    },

    /// Broadcast or confirmation failed; the ledger's own error is carried.
    #[error("broadcast failed: {0}")]
    Broadcast(String),

    /// A confirmed transaction failed at on-chain execution.
    #[error("transaction {signature} failed on-chain: {reason}")]
    OnChainFailure {
        /// Transaction signature.
        signature: String,
        /// The ledger's execution error.
        reason: String,
    },

    /// A ledger query outside broadcast failed.
    #[error("ledger rpc error: {0}")]
    Rpc(String),
}

/// Value-transfer rail used to charge for a letter.
#[async_trait::async_trait]
pub trait PaymentRail: Send + Sync {
    /// Runs a full payment attempt: balance check, build, sign, broadcast,
    /// and confirmation at the rail's finality level.
    async fn pay(&self, lamports: u64) -> Result<PaymentReceipt, RailError>;

    /// Independently re-fetches a confirmed transaction and asserts it
    /// executed without an on-chain error.
    async fn verify(&self, signature: &str) -> Result<(), RailError>;

    /// Current payer wallet address and balance.
    async fn wallet(&self) -> Result<WalletStatus, RailError>;
}
