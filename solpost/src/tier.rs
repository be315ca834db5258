//! Service tiers, their static limit table, and resolved accounts.
//!
//! Tier limits are a lookup table keyed by tier name, never computed. Exactly
//! one limit set is active per account at a time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel account id shared by all unauthenticated callers.
pub const FREE_ACCOUNT_ID: &str = "free";

/// Monthly subscription price of the pro tier, in USD cents (display only).
pub const PRO_PRICE_CENTS: u32 = 1_499;

/// Monthly subscription price of the enterprise tier, in USD cents (display only).
pub const ENTERPRISE_PRICE_CENTS: u32 = 9_999;

/// A named service level determining quota and feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Unauthenticated or keyless callers.
    Free,
    /// Paid entry tier.
    Pro,
    /// Paid top tier with no letter cap.
    Enterprise,
}

impl Tier {
    /// Returns the static limit set for this tier.
    #[must_use]
    pub const fn limits(self) -> TierLimits {
        match self {
            Self::Free => TierLimits {
                monthly_letters: MonthlyAllowance::Limited(5),
                priority: false,
                custom_branding: false,
            },
            Self::Pro => TierLimits {
                monthly_letters: MonthlyAllowance::Limited(100),
                priority: true,
                custom_branding: false,
            },
            Self::Enterprise => TierLimits {
                monthly_letters: MonthlyAllowance::Unlimited,
                priority: true,
                custom_branding: true,
            },
        }
    }

    /// Maps a billing plan identifier to a tier.
    ///
    /// Plan ids other than the configured enterprise plan resolve to
    /// [`Tier::Pro`], the lowest paid tier: unrecognized plans fail open
    /// rather than denying an active subscriber.
    #[must_use]
    pub fn from_plan_id(plan_id: &str, enterprise_plan_id: &str) -> Self {
        if !enterprise_plan_id.is_empty() && plan_id == enterprise_plan_id {
            Self::Enterprise
        } else {
            Self::Pro
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        };
        f.write_str(name)
    }
}

/// Letters an account may send in the current billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyAllowance {
    /// At most this many letters per period.
    Limited(u32),
    /// No cap.
    Unlimited,
}

impl MonthlyAllowance {
    /// Letters left given the current usage; `None` means unlimited.
    #[must_use]
    pub const fn remaining(self, usage: u64) -> Option<u64> {
        match self {
            Self::Limited(max) => Some((max as u64).saturating_sub(usage)),
            Self::Unlimited => None,
        }
    }
}

/// The static limit set active for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimits {
    /// Letter cap for the current billing period.
    pub monthly_letters: MonthlyAllowance,
    /// Whether letters get priority fulfillment.
    pub priority: bool,
    /// Whether letters may carry custom branding.
    pub custom_branding: bool,
}

/// A resolved caller: billing account id plus the active tier.
///
/// Accounts are created by the billing backend out-of-band; this is a
/// read-only view re-read on every request, never cached across credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Billing account identifier, or [`FREE_ACCOUNT_ID`].
    pub customer_id: String,
    /// Active tier.
    pub tier: Tier,
    /// Limit set for the active tier.
    pub limits: TierLimits,
}

impl Account {
    /// The shared account used by all unauthenticated callers.
    #[must_use]
    pub fn free() -> Self {
        Self {
            customer_id: FREE_ACCOUNT_ID.to_owned(),
            tier: Tier::Free,
            limits: Tier::Free.limits(),
        }
    }
}
