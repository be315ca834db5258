//! Billing backend REST client.
//!
//! Implements [`BillingProvider`] against the subscription backend's REST
//! surface: active-subscription lookup by customer reference, and a
//! letters-sent counter stored as string metadata on the customer record.
//! Requests carry the backend secret as a bearer token.
//!
//! Usage reads are deliberately forgiving: a backend that cannot answer is
//! treated as "no letters sent yet" rather than blocking the caller, matching
//! the hosted service's historical behavior. Usage writes surface their
//! errors; the pipeline decides whether to swallow them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use solpost::billing::{BillingError, BillingProvider, Subscription};
use url::Url;

const USAGE_KEY: &str = "letters_sent_this_month";

#[derive(Debug, Deserialize)]
struct SubscriptionList {
    data: Vec<SubscriptionEntry>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionEntry {
    customer: String,
    price: String,
}

#[derive(Debug, Default, Deserialize)]
struct CustomerRecord {
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct MetadataPatch<'a> {
    metadata: HashMap<&'a str, String>,
}

/// REST client for the subscription billing backend.
#[derive(Debug, Clone)]
pub struct HttpBillingClient {
    http: reqwest::Client,
    base: Url,
    secret: String,
}

impl HttpBillingClient {
    /// Creates a client against the backend base URL.
    #[must_use]
    pub const fn new(http: reqwest::Client, base: Url, secret: String) -> Self {
        Self { http, base, secret }
    }

    fn endpoint(&self, path: &str) -> Result<Url, BillingError> {
        self.base
            .join(path)
            .map_err(|e| BillingError(format!("bad endpoint {path}: {e}")))
    }
}

#[async_trait::async_trait]
impl BillingProvider for HttpBillingClient {
    async fn active_subscription(
        &self,
        account_ref: &str,
    ) -> Result<Option<Subscription>, BillingError> {
        let url = self.endpoint("v1/subscriptions")?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.secret)
            .query(&[
                ("customer", account_ref),
                ("status", "active"),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| BillingError(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BillingError(format!(
                "subscription lookup answered {status}"
            )));
        }
        let list: SubscriptionList = response
            .json()
            .await
            .map_err(|e| BillingError(e.to_string()))?;
        Ok(list.data.into_iter().next().map(|entry| Subscription {
            billing_account_id: entry.customer,
            plan_id: entry.price,
        }))
    }

    async fn read_usage(&self, billing_account_id: &str) -> Result<u64, BillingError> {
        let url = self.endpoint(&format!("v1/customers/{billing_account_id}"))?;
        let record = match self.http.get(url).bearer_auth(&self.secret).send().await {
            Ok(response) if response.status().is_success() => {
                response.json::<CustomerRecord>().await.unwrap_or_default()
            }
            Ok(response) => {
                tracing::warn!(
                    status = %response.status(),
                    "usage read failed, assuming zero"
                );
                CustomerRecord::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "usage read failed, assuming zero");
                CustomerRecord::default()
            }
        };
        let count = record
            .metadata
            .get(USAGE_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        Ok(count)
    }

    async fn write_usage(&self, billing_account_id: &str, count: u64) -> Result<(), BillingError> {
        let url = self.endpoint(&format!("v1/customers/{billing_account_id}"))?;
        let patch = MetadataPatch {
            metadata: HashMap::from([(USAGE_KEY, count.to_string())]),
        };
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.secret)
            .json(&patch)
            .send()
            .await
            .map_err(|e| BillingError(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(BillingError(format!("usage write answered {status}")));
        }
        Ok(())
    }
}
