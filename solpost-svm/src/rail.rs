//! The Solana payment rail.
//!
//! A payment is one system-program lamport transfer from the operator wallet
//! to the fixed payee, anchored to a fresh blockhash, signed once, with the
//! payer as fee payer. The balance check runs first: a broadcast that is
//! known to be unfundable is never attempted.

use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_transaction::Transaction;
use solpost::rail::{PaymentRail, PaymentReceipt, RailError, WalletStatus};

use crate::networks::Network;
use crate::rpc::LedgerRpc;

/// Lamports held back to cover the transaction fee on top of the transfer
/// amount. One signature costs 5000 lamports at the default fee schedule.
pub const DEFAULT_FEE_RESERVE: u64 = 5_000;

/// Native-SOL payment rail charging a fixed payee wallet.
pub struct SolanaRail<R> {
    rpc: R,
    signer: Keypair,
    payee: Pubkey,
    fee_reserve: u64,
    network: Network,
}

impl<R> std::fmt::Debug for SolanaRail<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRail")
            .field("payee", &self.payee)
            .field("fee_reserve", &self.fee_reserve)
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

impl<R: LedgerRpc> SolanaRail<R> {
    /// Creates a rail over a ledger client and operator keypair.
    pub const fn new(
        rpc: R,
        signer: Keypair,
        payee: Pubkey,
        fee_reserve: u64,
        network: Network,
    ) -> Self {
        Self {
            rpc,
            signer,
            payee,
            fee_reserve,
            network,
        }
    }

    /// The cluster this rail pays on.
    #[must_use]
    pub const fn network(&self) -> Network {
        self.network
    }

    /// The operator wallet address.
    #[must_use]
    pub fn payer_address(&self) -> Pubkey {
        self.signer.pubkey()
    }
}

#[async_trait::async_trait]
impl<R: LedgerRpc> PaymentRail for SolanaRail<R> {
    async fn pay(&self, lamports: u64) -> Result<PaymentReceipt, RailError> {
        let payer = self.signer.pubkey();
        let available = self
            .rpc
            .balance(&payer)
            .await
            .map_err(|e| RailError::Rpc(e.to_string()))?;
        let required = lamports.saturating_add(self.fee_reserve);
        if available < required {
            return Err(RailError::InsufficientFunds {
                required,
                available,
            });
        }

        let blockhash = self
            .rpc
            .latest_blockhash()
            .await
            .map_err(|e| RailError::Rpc(e.to_string()))?;
        let instruction =
            solana_system_interface::instruction::transfer(&payer, &self.payee, lamports);
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&payer),
            &[&self.signer],
            blockhash,
        );

        tracing::info!(
            lamports,
            payee = %self.payee,
            network = %self.network,
            "broadcasting payment"
        );
        let signature = self
            .rpc
            .send_and_confirm(&transaction)
            .await
            .map_err(|e| RailError::Broadcast(e.to_string()))?;
        tracing::info!(signature = %signature, "payment confirmed");

        Ok(PaymentReceipt {
            signature: signature.to_string(),
            lamports,
            payer: payer.to_string(),
            payee: self.payee.to_string(),
        })
    }

    async fn verify(&self, signature: &str) -> Result<(), RailError> {
        let parsed: Signature = signature
            .parse()
            .map_err(|_| RailError::Rpc(format!("unparseable signature: {signature}")))?;
        match self
            .rpc
            .signature_status(&parsed)
            .await
            .map_err(|e| RailError::Rpc(e.to_string()))?
        {
            Some(Ok(())) => Ok(()),
            Some(Err(reason)) => Err(RailError::OnChainFailure {
                signature: signature.to_owned(),
                reason,
            }),
            None => Err(RailError::OnChainFailure {
                signature: signature.to_owned(),
                reason: "transaction not found at confirmed commitment".to_owned(),
            }),
        }
    }

    async fn wallet(&self) -> Result<WalletStatus, RailError> {
        let address = self.signer.pubkey();
        let lamports = self
            .rpc
            .balance(&address)
            .await
            .map_err(|e| RailError::Rpc(e.to_string()))?;
        Ok(WalletStatus {
            address: address.to_string(),
            lamports,
        })
    }
}
