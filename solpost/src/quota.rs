//! The quota gate: a pure comparison of limits against current usage.
//!
//! The usage read happens immediately before this check; the increment after
//! a successful fulfillment is a separate, later operation. Two concurrent
//! requests from one account can therefore both pass before either
//! increments; see the pipeline documentation for the accepted race.

use crate::tier::{MonthlyAllowance, TierLimits};

/// Decides whether one more letter may be sent under the given limits.
#[must_use]
pub const fn allow(limits: &TierLimits, usage: u64) -> bool {
    match limits.monthly_letters {
        MonthlyAllowance::Unlimited => true,
        MonthlyAllowance::Limited(max) => usage < max as u64,
    }
}
