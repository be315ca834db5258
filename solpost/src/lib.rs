//! Core letter dispatch pipeline for solpost.
//!
//! This crate contains the monetization-gated pipeline that turns a client
//! request into a Solana payment plus a physical-mail fulfillment call. It is
//! blockchain- and transport-agnostic: the Solana rail lives in
//! `solpost-svm`, the HTTP collaborator clients in `solpost-http`, and the
//! server binary in `solpost-service`.
//!
//! # Overview
//!
//! A dispatch request flows through a fixed sequence: credential resolution,
//! quota check, request validation, price quoting, on-chain payment
//! (build → sign → broadcast → confirm), independent payment verification,
//! fulfillment submission, and finally usage accounting. The
//! [`pipeline::Pipeline`] orchestrator owns that sequence and the
//! partial-failure policy between the payment and fulfillment steps.
//!
//! # Modules
//!
//! - [`billing`] - Billing collaborator contract, tier resolution, usage ledger
//! - [`credential`] - Bearer credential parsing and the free-tier sentinel
//! - [`error`] - The dispatch error taxonomy
//! - [`fulfillment`] - Fulfillment collaborator contract and letter payloads
//! - [`pipeline`] - The end-to-end orchestrator
//! - [`pricing`] - Pure fiat pricing and SOL conversion
//! - [`quota`] - The quota gate
//! - [`rail`] - Payment rail contract (execute, verify, wallet views)
//! - [`rates`] - Exchange-rate source contract
//! - [`request`] - Schema-validated letter requests
//! - [`tier`] - Service tiers, limits, and accounts

pub mod billing;
pub mod credential;
pub mod error;
pub mod fulfillment;
pub mod pipeline;
pub mod pricing;
pub mod quota;
pub mod rail;
pub mod rates;
pub mod request;
pub mod tier;

pub use error::DispatchError;
pub use pipeline::{DispatchOutcome, Pipeline, PipelineConfig};
