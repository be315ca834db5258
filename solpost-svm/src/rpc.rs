//! Minimal ledger RPC abstraction.
//!
//! Narrows the nonblocking Solana RPC client to the four calls the rail
//! needs, so tests can substitute a scripted ledger. The two finality-bearing
//! calls both operate at the `confirmed` commitment: `send_and_confirm` for
//! inclusion, `signature_status` for the independent executed-without-error
//! check.

use solana_commitment_config::CommitmentConfig;
use solana_message::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::Transaction;

/// A failed ledger RPC call, flattened to the ledger's own message.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct RpcFailure(pub String);

/// The ledger RPC surface used by the payment rail.
#[async_trait::async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Lamport balance of an address.
    async fn balance(&self, address: &Pubkey) -> Result<u64, RpcFailure>;

    /// A recent blockhash to anchor a new transaction to.
    async fn latest_blockhash(&self) -> Result<Hash, RpcFailure>;

    /// Broadcasts a signed transaction and blocks until the ledger reports
    /// `confirmed` inclusion. The ledger's own timeout is propagated.
    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, RpcFailure>;

    /// Execution status of a transaction at `confirmed` commitment.
    ///
    /// `None` means the ledger does not know the signature at that
    /// commitment; `Some(Err(reason))` means it was included but failed
    /// at execution.
    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<Result<(), String>>, RpcFailure>;
}

#[async_trait::async_trait]
impl LedgerRpc for solana_client::nonblocking::rpc_client::RpcClient {
    async fn balance(&self, address: &Pubkey) -> Result<u64, RpcFailure> {
        self.get_balance(address)
            .await
            .map_err(|e| RpcFailure(e.to_string()))
    }

    async fn latest_blockhash(&self) -> Result<Hash, RpcFailure> {
        self.get_latest_blockhash()
            .await
            .map_err(|e| RpcFailure(e.to_string()))
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, RpcFailure> {
        self.send_and_confirm_transaction(transaction)
            .await
            .map_err(|e| RpcFailure(e.to_string()))
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<Result<(), String>>, RpcFailure> {
        let status = self
            .get_signature_status_with_commitment(signature, CommitmentConfig::confirmed())
            .await
            .map_err(|e| RpcFailure(e.to_string()))?;
        Ok(status.map(|result| result.map_err(|e| e.to_string())))
    }
}
