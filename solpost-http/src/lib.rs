//! HTTP clients for the three external collaborators.
//!
//! Each client is a thin, stateless wrapper over a shared [`reqwest::Client`]
//! and is safe to reuse across concurrent requests. Errors are normalized to
//! the core contracts; none of the clients retry.
//!
//! # Modules
//!
//! - [`billing`] - Subscription lookup and usage counters
//! - [`mailer`] - Print-and-mail fulfillment submission
//! - [`rates`] - SOL/USD price feed

pub mod billing;
pub mod mailer;
pub mod rates;

pub use billing::HttpBillingClient;
pub use mailer::HttpMailer;
pub use rates::HttpRateFeed;
