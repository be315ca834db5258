//! Signing-key decoding.
//!
//! Wallet tooling exports secret keys in two shapes: a base58 string and a
//! JSON array of 64 bytes. Both are accepted here; everything else is an
//! [`RailError::InvalidSigningKey`]. The decoded keypair is the only place
//! key material lives; it is never logged or persisted.

use solana_keypair::Keypair;
use solpost::rail::RailError;

/// Decodes secret-key material into a [`Keypair`].
///
/// # Errors
///
/// Returns [`RailError::InvalidSigningKey`] when the input is neither a
/// base58 string nor a JSON byte array, or does not produce a valid keypair.
pub fn decode_signing_key(raw: &str) -> Result<Keypair, RailError> {
    let trimmed = raw.trim();
    let bytes: Vec<u8> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|_| RailError::InvalidSigningKey)?
    } else {
        bs58::decode(trimmed)
            .into_vec()
            .map_err(|_| RailError::InvalidSigningKey)?
    };
    Keypair::try_from(bytes.as_slice()).map_err(|_| RailError::InvalidSigningKey)
}
