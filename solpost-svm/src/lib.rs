//! Solana payment rail for the letter dispatch pipeline.
//!
//! Implements [`solpost::rail::PaymentRail`] with a native-SOL lamport
//! transfer to a fixed payee wallet: balance check (amount plus a fee
//! reserve), system-program transfer build, single-signature signing with the
//! payer as fee payer, broadcast, and confirmation at the `confirmed`
//! commitment. Verification independently re-fetches the signature status at
//! the same commitment and rejects transactions that confirmed with an
//! on-chain execution error.
//!
//! # Modules
//!
//! - [`networks`] - Named cluster selection and default RPC endpoints
//! - [`rail`] - The [`rail::SolanaRail`] payment rail
//! - [`rpc`] - Minimal ledger RPC abstraction over the nonblocking client
//! - [`wallet`] - Signing-key decoding (base58 and JSON byte-array forms)

pub mod networks;
pub mod rail;
pub mod rpc;
pub mod wallet;

pub use networks::Network;
pub use rail::SolanaRail;
pub use wallet::decode_signing_key;
