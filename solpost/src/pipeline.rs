//! The end-to-end dispatch orchestrator.
//!
//! One pipeline instance serves all requests; it owns no per-account state.
//! Each dispatch is a strictly sequential chain of blocking collaborator
//! calls: no step is skipped, reordered, or run concurrently with another.
//! Payment confirmation and verification complete strictly before the
//! fulfillment submission, and fulfillment success completes strictly before
//! the usage counter is advanced; that ordering bounds the financial
//! exposure to "payment succeeded, fulfillment or accounting failed" and
//! never the reverse.
//!
//! # Known race
//!
//! The quota check and the usage increment are two independent reads/writes
//! of the same counter with no lock: two concurrent requests from one
//! account can both pass the gate before either increments, allowing a
//! transient over-quota send. A billing backend offering an atomic
//! increment-with-limit can close the window behind the
//! [`BillingProvider`] contract; the core does not.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::billing::{BillingProvider, TierResolver, UsageLedger};
use crate::credential::Credential;
use crate::error::DispatchError;
use crate::fulfillment::{FulfillmentReceipt, LetterDispatcher, LetterSubmission};
use crate::pricing::{PricingTable, Quote};
use crate::quota;
use crate::rail::{PaymentRail, PaymentReceipt, RailError, WalletStatus};
use crate::rates::{RateSource, SolRate};
use crate::request::{LetterRequest, PrintOptions};
use crate::tier::{MonthlyAllowance, Tier};

/// Static pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fiat pricing table.
    pub pricing: PricingTable,
    /// Billing plan id that maps to the enterprise tier.
    pub enterprise_plan_id: String,
    /// Rate to substitute when the price feed is down; `None` makes feed
    /// outages fatal to the request.
    pub fallback_rate: Option<SolRate>,
    /// Whether quota checks and usage accounting run at all.
    pub metered: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pricing: PricingTable::default(),
            enterprise_plan_id: String::new(),
            fallback_rate: None,
            metered: true,
        }
    }
}

/// Usage counters echoed back after a metered dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    /// Letters sent this period, including this one.
    pub sent: u64,
    /// Letters left this period; `None` means unlimited.
    pub remaining: Option<u64>,
}

/// Combined success payload for a dispatched letter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    /// Fields returned by the mail service.
    pub fulfillment: FulfillmentReceipt,
    /// The confirmed payment.
    pub payment: PaymentReceipt,
    /// Fiat price charged.
    pub price_usd: Decimal,
    /// Tier the request was served under.
    pub tier: Tier,
    /// Usage counters; absent on unmetered pipelines or when the
    /// post-success usage write failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageSummary>,
}

/// Tier and usage view for the account-info operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Active tier.
    pub tier: Tier,
    /// Letters sent this period.
    pub usage: u64,
    /// Monthly cap; `None` means unlimited.
    pub limit: Option<u32>,
    /// Letters left; `None` means unlimited.
    pub remaining: Option<u64>,
    /// Priority fulfillment flag.
    pub priority: bool,
    /// Custom branding flag.
    pub custom_branding: bool,
}

/// Orchestrates the full payment-gated dispatch sequence.
pub struct Pipeline<B, R, P, D> {
    billing: B,
    rates: R,
    rail: P,
    dispatcher: D,
    config: PipelineConfig,
}

impl<B, R, P, D> std::fmt::Debug for Pipeline<B, R, P, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<B, R, P, D> Pipeline<B, R, P, D>
where
    B: BillingProvider,
    R: RateSource,
    P: PaymentRail,
    D: LetterDispatcher,
{
    /// Creates a pipeline over the four collaborators.
    pub const fn new(billing: B, rates: R, rail: P, dispatcher: D, config: PipelineConfig) -> Self {
        Self {
            billing,
            rates,
            rail,
            dispatcher,
            config,
        }
    }

    /// Computes a price quote.
    ///
    /// Pricing is not a billable action: no credential is required, and no
    /// billing or ledger I/O happens.
    ///
    /// # Errors
    ///
    /// [`DispatchError::PricingUnavailable`] when the rate feed fails and no
    /// fallback rate is configured.
    pub async fn quote(
        &self,
        country: &str,
        options: &PrintOptions,
    ) -> Result<Quote, DispatchError> {
        let rate = self.exchange_rate().await?;
        Ok(self.config.pricing.quote(country, options, rate))
    }

    /// Runs the full dispatch sequence for one letter.
    ///
    /// # Errors
    ///
    /// Any [`DispatchError`]; variants carrying a signature indicate the
    /// charge was already taken.
    pub async fn dispatch(
        &self,
        credential: &Credential,
        request: &LetterRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        // 1. Credential → account. Free credentials never touch billing.
        let account = TierResolver::new(&self.billing, &self.config.enterprise_plan_id)
            .resolve(credential)
            .await?;

        // 2. Quota gate, before any pricing or payment work.
        if self.config.metered {
            let current = UsageLedger::new(&self.billing)
                .current(&account)
                .await
                .map_err(|e| DispatchError::Billing(e.to_string()))?;
            if !quota::allow(&account.limits, current) {
                let limit = match account.limits.monthly_letters {
                    MonthlyAllowance::Limited(n) => n,
                    // Unlimited allowances never deny.
                    MonthlyAllowance::Unlimited => u32::MAX,
                };
                tracing::info!(
                    tier = %account.tier,
                    usage = current,
                    limit,
                    "quota exhausted, refusing dispatch"
                );
                return Err(DispatchError::QuotaExceeded {
                    tier: account.tier,
                    limit,
                });
            }
        }

        // 3. Payload shape, checked once.
        request.validate()?;

        // 4. Quote at the current (or fallback) rate.
        let rate = self.exchange_rate().await?;
        let quote = self
            .config
            .pricing
            .quote(&request.recipient.country, &request.options, rate);

        // 5. Balance check → build → sign → broadcast → confirm.
        let receipt = match self.rail.pay(quote.lamports).await {
            Ok(receipt) => receipt,
            Err(RailError::InvalidSigningKey) => return Err(DispatchError::InvalidSigningKey),
            Err(RailError::InsufficientFunds {
                required,
                available,
            }) => {
                return Err(DispatchError::InsufficientFunds {
                    required,
                    available,
                });
            }
            Err(e) => return Err(DispatchError::BroadcastFailed(e.to_string())),
        };

        // 6. Independent on-chain re-check. From here on the charge stands.
        if let Err(e) = self.rail.verify(&receipt.signature).await {
            tracing::error!(
                signature = %receipt.signature,
                lamports = receipt.lamports,
                error = %e,
                "payment confirmed but failed verification; manual reconciliation required"
            );
            return Err(DispatchError::PaymentFailed {
                signature: receipt.signature,
                lamports: receipt.lamports,
                reason: e.to_string(),
            });
        }

        // 7. Fulfillment, with payment proof attached.
        let submission = LetterSubmission {
            signature: receipt.signature.clone(),
            address: request.recipient.clone(),
            content: request.content.clone(),
            content_type: "text",
            price_usd: quote.total_usd,
            mail_config: request.options.into(),
        };
        let fulfillment = match self.dispatcher.submit(&submission).await {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::error!(
                    signature = %receipt.signature,
                    lamports = receipt.lamports,
                    error = %e,
                    "letter rejected after payment was taken; refund path is out-of-band"
                );
                return Err(DispatchError::FulfillmentRejected {
                    signature: receipt.signature,
                    lamports: receipt.lamports,
                    reason: e.to_string(),
                });
            }
        };

        // 8. Usage accounting. A failed write never undoes a delivered,
        // paid-for letter: log and move on.
        let usage = if self.config.metered {
            match UsageLedger::new(&self.billing).record_sent(&account).await {
                Ok(sent) => Some(UsageSummary {
                    sent,
                    remaining: account.limits.monthly_letters.remaining(sent),
                }),
                Err(e) => {
                    tracing::warn!(
                        customer = %account.customer_id,
                        error = %e,
                        "usage write failed after successful dispatch"
                    );
                    None
                }
            }
        } else {
            None
        };

        tracing::info!(
            letter_id = %fulfillment.letter_id,
            signature = %receipt.signature,
            tier = %account.tier,
            "letter dispatched"
        );
        Ok(DispatchOutcome {
            fulfillment,
            payment: receipt,
            price_usd: quote.total_usd,
            tier: account.tier,
            usage,
        })
    }

    /// Tier, usage, and limits for the presented credential.
    ///
    /// # Errors
    ///
    /// Credential resolution errors, or [`DispatchError::Billing`] when the
    /// usage counter cannot be read.
    pub async fn account_info(&self, credential: &Credential) -> Result<AccountInfo, DispatchError> {
        let account = TierResolver::new(&self.billing, &self.config.enterprise_plan_id)
            .resolve(credential)
            .await?;
        let usage = UsageLedger::new(&self.billing)
            .current(&account)
            .await
            .map_err(|e| DispatchError::Billing(e.to_string()))?;
        let limit = match account.limits.monthly_letters {
            MonthlyAllowance::Limited(n) => Some(n),
            MonthlyAllowance::Unlimited => None,
        };
        Ok(AccountInfo {
            tier: account.tier,
            usage,
            limit,
            remaining: account.limits.monthly_letters.remaining(usage),
            priority: account.limits.priority,
            custom_branding: account.limits.custom_branding,
        })
    }

    /// Payer wallet address and balance.
    ///
    /// # Errors
    ///
    /// Returns [`RailError`] when the ledger cannot be queried.
    pub async fn wallet(&self) -> Result<WalletStatus, RailError> {
        self.rail.wallet().await
    }

    /// Current rate, substituting the configured fallback on feed failure.
    async fn exchange_rate(&self) -> Result<SolRate, DispatchError> {
        match self.rates.current_rate().await {
            Ok(rate) => Ok(rate),
            Err(e) => match self.config.fallback_rate {
                Some(rate) => {
                    tracing::warn!(error = %e, "price feed unavailable, using fallback rate");
                    Ok(rate)
                }
                None => {
                    tracing::error!(error = %e, "price feed unavailable and no fallback configured");
                    Err(DispatchError::PricingUnavailable)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::{BillingError, BillingProvider, Subscription};
    use crate::credential::ApiKey;
    use crate::fulfillment::FulfillmentError;
    use crate::rates::{RateError, StaticRate};
    use crate::request::RecipientAddress;
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    fn log_call(log: &CallLog, name: &'static str) {
        log.lock().unwrap().push(name);
    }

    struct MockBilling {
        log: CallLog,
        subscription: Option<Subscription>,
        usage: Mutex<u64>,
        fail_writes: bool,
    }

    impl MockBilling {
        fn new(log: CallLog) -> Self {
            Self {
                log,
                subscription: None,
                usage: Mutex::new(0),
                fail_writes: false,
            }
        }
    }

    #[async_trait::async_trait]
    impl BillingProvider for &MockBilling {
        async fn active_subscription(
            &self,
            _account_ref: &str,
        ) -> Result<Option<Subscription>, BillingError> {
            log_call(&self.log, "billing.lookup");
            Ok(self.subscription.clone())
        }

        async fn read_usage(&self, _id: &str) -> Result<u64, BillingError> {
            log_call(&self.log, "billing.read");
            Ok(*self.usage.lock().unwrap())
        }

        async fn write_usage(&self, _id: &str, count: u64) -> Result<(), BillingError> {
            log_call(&self.log, "billing.write");
            if self.fail_writes {
                return Err(BillingError("metadata update failed".to_owned()));
            }
            *self.usage.lock().unwrap() = count;
            Ok(())
        }
    }

    #[derive(Clone, Copy)]
    enum PayBehavior {
        Succeed,
        Insufficient { required: u64, available: u64 },
        BroadcastFail,
    }

    #[derive(Clone, Copy)]
    enum VerifyBehavior {
        Pass,
        OnChainError,
    }

    struct MockRail {
        log: CallLog,
        pay: PayBehavior,
        verify: VerifyBehavior,
    }

    #[async_trait::async_trait]
    impl PaymentRail for MockRail {
        async fn pay(&self, lamports: u64) -> Result<PaymentReceipt, RailError> {
            log_call(&self.log, "rail.pay");
            match self.pay {
                PayBehavior::Succeed => Ok(PaymentReceipt {
                    signature: "5ig".to_owned(),
                    lamports,
                    payer: "payer111".to_owned(),
                    payee: "payee111".to_owned(),
                }),
                PayBehavior::Insufficient {
                    required,
                    available,
                } => Err(RailError::InsufficientFunds {
                    required,
                    available,
                }),
                PayBehavior::BroadcastFail => {
                    Err(RailError::Broadcast("blockhash expired".to_owned()))
                }
            }
        }

        async fn verify(&self, signature: &str) -> Result<(), RailError> {
            log_call(&self.log, "rail.verify");
            match self.verify {
                VerifyBehavior::Pass => Ok(()),
                VerifyBehavior::OnChainError => Err(RailError::OnChainFailure {
                    signature: signature.to_owned(),
                    reason: "custom program error: 0x1".to_owned(),
                }),
            }
        }

        async fn wallet(&self) -> Result<WalletStatus, RailError> {
            Ok(WalletStatus {
                address: "payer111".to_owned(),
                lamports: 1_000_000_000,
            })
        }
    }

    struct MockMailer {
        log: CallLog,
        accept: bool,
    }

    #[async_trait::async_trait]
    impl LetterDispatcher for MockMailer {
        async fn submit(
            &self,
            _submission: &LetterSubmission,
        ) -> Result<FulfillmentReceipt, FulfillmentError> {
            log_call(&self.log, "mail.submit");
            if self.accept {
                Ok(FulfillmentReceipt {
                    letter_id: "ltr_01".to_owned(),
                    tracking_number: Some("9400".to_owned()),
                    expected_delivery_date: Some("2025-07-01".to_owned()),
                    preview_url: None,
                })
            } else {
                Err(FulfillmentError::Rejected(
                    "address not deliverable".to_owned(),
                ))
            }
        }
    }

    struct FailingRates;

    #[async_trait::async_trait]
    impl RateSource for FailingRates {
        async fn current_rate(&self) -> Result<SolRate, RateError> {
            Err(RateError::Transport("connection refused".to_owned()))
        }
    }

    fn sol_rate(usd: i64) -> SolRate {
        SolRate::new(Decimal::from(usd)).unwrap()
    }

    fn request() -> LetterRequest {
        LetterRequest {
            content: "hello".to_owned(),
            recipient: RecipientAddress {
                name: "A. Reader".to_owned(),
                address_line1: "1 Main St".to_owned(),
                address_line2: None,
                city: "Springfield".to_owned(),
                state: "IL".to_owned(),
                zip_code: "62701".to_owned(),
                country: "US".to_owned(),
            },
            options: PrintOptions::default(),
        }
    }

    struct Harness {
        log: CallLog,
        billing: MockBilling,
        pay: PayBehavior,
        verify: VerifyBehavior,
        accept: bool,
        config: PipelineConfig,
    }

    impl Harness {
        fn new() -> Self {
            let log: CallLog = Arc::default();
            Self {
                billing: MockBilling::new(Arc::clone(&log)),
                log,
                pay: PayBehavior::Succeed,
                verify: VerifyBehavior::Pass,
                accept: true,
                config: PipelineConfig::default(),
            }
        }

        fn pipeline(&self) -> Pipeline<&'_ MockBilling, StaticRate, MockRail, MockMailer> {
            Pipeline::new(
                &self.billing,
                StaticRate(sol_rate(100)),
                MockRail {
                    log: Arc::clone(&self.log),
                    pay: self.pay,
                    verify: self.verify,
                },
                MockMailer {
                    log: Arc::clone(&self.log),
                    accept: self.accept,
                },
                self.config.clone(),
            )
        }

        fn calls(&self) -> Vec<&'static str> {
            self.log.lock().unwrap().clone()
        }
    }

    fn pro_subscription() -> Option<Subscription> {
        Some(Subscription {
            billing_account_id: "cus_abc".to_owned(),
            plan_id: "price_pro".to_owned(),
        })
    }

    fn pro_credential() -> Credential {
        Credential::Key(ApiKey::parse("skey_cus_abc_deadbeef99").unwrap())
    }

    #[tokio::test]
    async fn scenario_a_happy_path_increments_usage_once() {
        let harness = Harness::new();
        let outcome = harness
            .pipeline()
            .dispatch(&Credential::Free, &request())
            .await
            .unwrap();

        assert_eq!(outcome.fulfillment.letter_id, "ltr_01");
        assert_eq!(outcome.payment.signature, "5ig");
        assert_eq!(outcome.tier, Tier::Free);
        assert_eq!(
            outcome.usage,
            Some(UsageSummary {
                sent: 1,
                remaining: Some(4),
            })
        );
        assert_eq!(*harness.billing.usage.lock().unwrap(), 1);
        // Payment strictly before fulfillment, fulfillment strictly before
        // the usage write; the increment re-reads before writing.
        assert_eq!(
            harness.calls(),
            vec![
                "billing.read",
                "rail.pay",
                "rail.verify",
                "mail.submit",
                "billing.read",
                "billing.write",
            ]
        );
    }

    #[tokio::test]
    async fn scenario_b_insufficient_funds_stops_before_fulfillment() {
        let mut harness = Harness::new();
        harness.pay = PayBehavior::Insufficient {
            required: 20_005_000,
            available: 15_000_000,
        };
        let err = harness
            .pipeline()
            .dispatch(&Credential::Free, &request())
            .await
            .unwrap_err();

        assert_eq!(err.shortfall(), Some(5_005_000));
        let calls = harness.calls();
        assert!(!calls.contains(&"mail.submit"));
        assert!(!calls.contains(&"billing.write"));
    }

    #[tokio::test]
    async fn scenario_c_quota_exceeded_before_any_payment_work() {
        let mut harness = Harness::new();
        harness.billing.subscription = pro_subscription();
        *harness.billing.usage.lock().unwrap() = 100;

        let err = harness
            .pipeline()
            .dispatch(&pro_credential(), &request())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DispatchError::QuotaExceeded {
                tier: Tier::Pro,
                limit: 100,
            }
        ));
        assert_eq!(harness.calls(), vec!["billing.lookup", "billing.read"]);
    }

    #[tokio::test]
    async fn scenario_d_rejection_keeps_charge_and_skips_usage() {
        let mut harness = Harness::new();
        harness.accept = false;
        let err = harness
            .pipeline()
            .dispatch(&Credential::Free, &request())
            .await
            .unwrap_err();

        let DispatchError::FulfillmentRejected {
            signature,
            lamports,
            reason,
        } = err
        else {
            panic!("expected FulfillmentRejected, got {err:?}");
        };
        assert_eq!(signature, "5ig");
        assert_eq!(lamports, 15_000_000);
        assert!(reason.contains("address not deliverable"));
        assert!(!harness.calls().contains(&"billing.write"));
        assert_eq!(*harness.billing.usage.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn verification_failure_blocks_fulfillment_but_returns_signature() {
        let mut harness = Harness::new();
        harness.verify = VerifyBehavior::OnChainError;
        let err = harness
            .pipeline()
            .dispatch(&Credential::Free, &request())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::PaymentFailed { ref signature, .. } if signature == "5ig"));
        let calls = harness.calls();
        assert!(!calls.contains(&"mail.submit"));
        assert!(!calls.contains(&"billing.write"));
    }

    #[tokio::test]
    async fn broadcast_failure_carries_no_charge() {
        let mut harness = Harness::new();
        harness.pay = PayBehavior::BroadcastFail;
        let err = harness
            .pipeline()
            .dispatch(&Credential::Free, &request())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::BroadcastFailed(_)));
        assert_eq!(err.charged(), None);
    }

    #[tokio::test]
    async fn unmetered_pipeline_never_touches_the_ledger() {
        let mut harness = Harness::new();
        harness.config.metered = false;
        let outcome = harness
            .pipeline()
            .dispatch(&Credential::Free, &request())
            .await
            .unwrap();
        assert_eq!(outcome.usage, None);
        assert_eq!(
            harness.calls(),
            vec!["rail.pay", "rail.verify", "mail.submit"]
        );
    }

    #[tokio::test]
    async fn invalid_payload_aborts_before_pricing_and_payment() {
        let harness = Harness::new();
        let mut bad = request();
        bad.content = String::new();
        let err = harness
            .pipeline()
            .dispatch(&Credential::Free, &bad)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRequest(_)));
        assert!(!harness.calls().contains(&"rail.pay"));
    }

    #[tokio::test]
    async fn usage_write_failure_is_swallowed() {
        let mut harness = Harness::new();
        harness.billing.fail_writes = true;
        let outcome = harness
            .pipeline()
            .dispatch(&Credential::Free, &request())
            .await
            .unwrap();
        assert_eq!(outcome.usage, None);
        assert_eq!(outcome.fulfillment.letter_id, "ltr_01");
    }

    #[tokio::test]
    async fn quote_is_free_of_billing_and_ledger_io() {
        let harness = Harness::new();
        let pipeline = harness.pipeline();
        let a = pipeline.quote("US", &PrintOptions::default()).await.unwrap();
        let b = pipeline.quote("US", &PrintOptions::default()).await.unwrap();
        assert_eq!(a, b);
        assert!(harness.calls().is_empty());
    }

    #[tokio::test]
    async fn feed_outage_uses_fallback_rate_when_configured() {
        let log: CallLog = Arc::default();
        let billing = MockBilling::new(Arc::clone(&log));
        let config = PipelineConfig {
            fallback_rate: Some(sol_rate(100)),
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(
            &billing,
            FailingRates,
            MockRail {
                log: Arc::clone(&log),
                pay: PayBehavior::Succeed,
                verify: VerifyBehavior::Pass,
            },
            MockMailer { log, accept: true },
            config,
        );
        let quote = pipeline.quote("US", &PrintOptions::default()).await.unwrap();
        assert_eq!(quote.sol_price_usd, Decimal::from(100));
    }

    #[tokio::test]
    async fn feed_outage_without_fallback_is_fatal() {
        let log: CallLog = Arc::default();
        let billing = MockBilling::new(Arc::clone(&log));
        let pipeline = Pipeline::new(
            &billing,
            FailingRates,
            MockRail {
                log: Arc::clone(&log),
                pay: PayBehavior::Succeed,
                verify: VerifyBehavior::Pass,
            },
            MockMailer { log, accept: true },
            PipelineConfig::default(),
        );
        let err = pipeline
            .quote("US", &PrintOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::PricingUnavailable));
    }

    #[tokio::test]
    async fn account_info_reports_remaining_letters() {
        let harness = Harness::new();
        *harness.billing.usage.lock().unwrap() = 2;
        let info = harness
            .pipeline()
            .account_info(&Credential::Free)
            .await
            .unwrap();
        assert_eq!(
            info,
            AccountInfo {
                tier: Tier::Free,
                usage: 2,
                limit: Some(5),
                remaining: Some(3),
                priority: false,
                custom_branding: false,
            }
        );
    }

    /// The documented hazard: with the counter at limit-1, two requests that
    /// both read before either writes will both pass the gate.
    #[tokio::test]
    async fn concurrent_checks_can_both_pass_before_either_increment() {
        let log: CallLog = Arc::default();
        let mut billing = MockBilling::new(log);
        *billing.usage.get_mut().unwrap() = 4;
        let billing = &billing;
        let limits = Tier::Free.limits();
        let account = crate::tier::Account::free();

        let ledger = UsageLedger::new(&billing);
        let first_read = ledger.current(&account).await.unwrap();
        let second_read = ledger.current(&account).await.unwrap();
        assert!(quota::allow(&limits, first_read));
        assert!(quota::allow(&limits, second_read));

        ledger.record_sent(&account).await.unwrap();
        ledger.record_sent(&account).await.unwrap();
        // Both writes land: the counter overshoots the allowance of 5.
        assert_eq!(ledger.current(&account).await.unwrap(), 6);
    }
}
