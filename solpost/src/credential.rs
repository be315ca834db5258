//! Bearer credential parsing.
//!
//! A caller presents either nothing (the free tier) or a structured
//! subscriber key of the form `skey_<account>_<check>`. The key is validated
//! structurally before any field is trusted; the billing backend remains the
//! authority on whether the embedded account reference maps to an active
//! subscription. The format is a compatibility shim inherited from the hosted
//! API, not a security boundary on its own.

use crate::error::DispatchError;

/// Sentinel credential value equivalent to presenting no key at all.
pub const FREE_SENTINEL: &str = "free";

const KEY_PREFIX: &str = "skey_";
const MIN_CHECK_LEN: usize = 8;

/// An API credential presented by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// No key, an empty key, or the `"free"` sentinel.
    Free,
    /// A structurally valid subscriber key.
    Key(ApiKey),
}

impl Credential {
    /// Parses an optional raw bearer token.
    ///
    /// Missing, empty, and sentinel values all resolve to [`Credential::Free`]
    /// without touching the billing backend.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidCredential`] if a key is present but
    /// fails the structural check.
    pub fn parse(raw: Option<&str>) -> Result<Self, DispatchError> {
        match raw.map(str::trim) {
            None | Some("") | Some(FREE_SENTINEL) => Ok(Self::Free),
            Some(key) => ApiKey::parse(key).map(Self::Key),
        }
    }
}

/// A parsed subscriber key: `skey_<account>_<check>`.
///
/// Only the account reference is retained; the trailing integrity segment is
/// checked for shape and then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    account_ref: String,
}

impl ApiKey {
    /// Parses and structurally validates a raw subscriber key.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidCredential`] on a missing prefix, a
    /// missing or empty segment, a non-alphanumeric account reference, or an
    /// integrity segment shorter than eight characters.
    pub fn parse(raw: &str) -> Result<Self, DispatchError> {
        let rest = raw
            .strip_prefix(KEY_PREFIX)
            .ok_or(DispatchError::InvalidCredential)?;

        // Account refs may themselves contain underscores (`cus_abc123`),
        // so the integrity segment is everything after the LAST separator.
        let (account_ref, check) = rest
            .rsplit_once('_')
            .ok_or(DispatchError::InvalidCredential)?;

        if account_ref.is_empty()
            || !account_ref
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(DispatchError::InvalidCredential);
        }
        if check.len() < MIN_CHECK_LEN || !check.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DispatchError::InvalidCredential);
        }

        Ok(Self {
            account_ref: account_ref.to_owned(),
        })
    }

    /// The billing account reference embedded in the key.
    #[must_use]
    pub fn account_ref(&self) -> &str {
        &self.account_ref
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_sentinel_resolve_to_free() {
        assert_eq!(Credential::parse(None).unwrap(), Credential::Free);
        assert_eq!(Credential::parse(Some("")).unwrap(), Credential::Free);
        assert_eq!(Credential::parse(Some("free")).unwrap(), Credential::Free);
        assert_eq!(Credential::parse(Some("  free  ")).unwrap(), Credential::Free);
    }

    #[test]
    fn well_formed_key_yields_account_ref() {
        let cred = Credential::parse(Some("skey_cus_9XyZ12_a1b2c3d4e5")).unwrap();
        let Credential::Key(key) = cred else {
            panic!("expected a key credential");
        };
        assert_eq!(key.account_ref(), "cus_9XyZ12");
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for raw in [
            "sk_live_123",             // wrong prefix
            "skey_",                   // nothing after prefix
            "skey_cus123",             // no integrity segment
            "skey__a1b2c3d4",          // empty account ref
            "skey_cus123_short",       // integrity segment too short
            "skey_cus 123_a1b2c3d4e5", // whitespace in account ref
            "skey_cus123_a1b2-3d4e5",  // non-alphanumeric integrity segment
        ] {
            assert!(
                matches!(
                    Credential::parse(Some(raw)),
                    Err(DispatchError::InvalidCredential)
                ),
                "{raw} should be rejected"
            );
        }
    }
}
