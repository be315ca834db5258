//! Billing collaborator contract, tier resolution, and the usage ledger.
//!
//! Accounts and usage counters live in the external billing backend; this
//! module only defines the contract and the two thin components built on it.
//! Nothing here is cached across requests.

use crate::credential::Credential;
use crate::error::DispatchError;
use crate::tier::{Account, Tier};

/// An active subscription as reported by the billing backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Billing account the subscription belongs to.
    pub billing_account_id: String,
    /// Plan identifier, mapped to a tier by [`Tier::from_plan_id`].
    pub plan_id: String,
}

/// Failure talking to the billing backend.
#[derive(Debug, thiserror::Error)]
#[error("billing backend error: {0}")]
pub struct BillingError(pub String);

/// External billing collaborator: subscription lookup plus usage counters.
///
/// `read_usage` and `write_usage` are deliberately two separate operations;
/// a backend with an atomic increment can implement `write_usage` on top of
/// it, but the core never assumes one exists.
#[async_trait::async_trait]
pub trait BillingProvider: Send + Sync {
    /// Looks up an active subscription for the given account reference.
    async fn active_subscription(
        &self,
        account_ref: &str,
    ) -> Result<Option<Subscription>, BillingError>;

    /// Reads the letters-sent counter for the current billing period.
    async fn read_usage(&self, billing_account_id: &str) -> Result<u64, BillingError>;

    /// Overwrites the letters-sent counter for the current billing period.
    async fn write_usage(&self, billing_account_id: &str, count: u64) -> Result<(), BillingError>;
}

/// Maps a parsed credential to an [`Account`] via the billing backend.
///
/// Free credentials are synthesized locally with no collaborator call. For
/// keyed credentials, "no active subscription" is returned as
/// [`DispatchError::InvalidCredential`], indistinguishable from a malformed
/// key, so callers cannot probe for account existence.
#[derive(Debug)]
pub struct TierResolver<'a, B> {
    billing: &'a B,
    enterprise_plan_id: &'a str,
}

impl<'a, B: BillingProvider> TierResolver<'a, B> {
    /// Creates a resolver borrowing the billing collaborator.
    pub const fn new(billing: &'a B, enterprise_plan_id: &'a str) -> Self {
        Self {
            billing,
            enterprise_plan_id,
        }
    }

    /// Resolves a credential to an account.
    ///
    /// # Errors
    ///
    /// [`DispatchError::InvalidCredential`] when no active subscription
    /// matches; [`DispatchError::Billing`] when the backend itself fails.
    pub async fn resolve(&self, credential: &Credential) -> Result<Account, DispatchError> {
        let key = match credential {
            Credential::Free => return Ok(Account::free()),
            Credential::Key(key) => key,
        };

        let subscription = self
            .billing
            .active_subscription(key.account_ref())
            .await
            .map_err(|e| DispatchError::Billing(e.to_string()))?
            .ok_or(DispatchError::InvalidCredential)?;

        let tier = Tier::from_plan_id(&subscription.plan_id, self.enterprise_plan_id);
        tracing::debug!(tier = %tier, "resolved subscriber tier");
        Ok(Account {
            customer_id: subscription.billing_account_id,
            tier,
            limits: tier.limits(),
        })
    }
}

/// Reads and advances the per-account letters-sent counter.
#[derive(Debug)]
pub struct UsageLedger<'a, B> {
    billing: &'a B,
}

impl<'a, B: BillingProvider> UsageLedger<'a, B> {
    /// Creates a ledger view borrowing the billing collaborator.
    pub const fn new(billing: &'a B) -> Self {
        Self { billing }
    }

    /// Current letters-sent count for the account.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError`] when the backend cannot be read.
    pub async fn current(&self, account: &Account) -> Result<u64, BillingError> {
        self.billing.read_usage(&account.customer_id).await
    }

    /// Records one sent letter: a fresh read followed by a write of the
    /// incremented count. Returns the new count.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError`] when either the read or the write fails.
    pub async fn record_sent(&self, account: &Account) -> Result<u64, BillingError> {
        let current = self.billing.read_usage(&account.customer_id).await?;
        let next = current.saturating_add(1);
        self.billing.write_usage(&account.customer_id, next).await?;
        Ok(next)
    }
}
