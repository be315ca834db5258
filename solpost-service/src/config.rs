//! Service configuration.
//!
//! Loaded from a TOML file with `$VAR` / `${VAR}` environment expansion in
//! string values, so secrets (the operator signing key, the billing secret)
//! stay out of the file on disk.
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to the configuration file (default: `config.toml`)
//! - `HOST` / `PORT` — Override the bind address
//! - `RUST_LOG` — Log level filter
//! - Whatever `$VAR` references the file itself makes

use std::net::IpAddr;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Bind address.
    pub host: IpAddr,
    /// Bind port.
    pub port: u16,
    /// Fiat pricing table.
    pub pricing: PricingConfig,
    /// Payment rail settings.
    pub payment: PaymentConfig,
    /// Exchange-rate feed settings.
    pub rates: RatesConfig,
    /// Billing backend settings.
    pub billing: BillingConfig,
    /// Fulfillment service settings.
    pub fulfillment: FulfillmentConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3001,
            pricing: PricingConfig::default(),
            payment: PaymentConfig::default(),
            rates: RatesConfig::default(),
            billing: BillingConfig::default(),
            fulfillment: FulfillmentConfig::default(),
        }
    }
}

/// Fiat pricing table, in USD.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Country priced at the domestic rate.
    pub home_country: String,
    /// Domestic base price.
    pub domestic_usd: Decimal,
    /// International base price.
    pub international_usd: Decimal,
    /// Color surcharge.
    pub color_usd: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            home_country: "US".to_owned(),
            domestic_usd: Decimal::new(150, 2),
            international_usd: Decimal::new(250, 2),
            color_usd: Decimal::new(50, 2),
        }
    }
}

/// Payment rail settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Payee wallet address, base58.
    pub payee: String,
    /// Cluster to pay on.
    pub network: String,
    /// RPC endpoint override; empty means the cluster's public default.
    pub rpc_url: String,
    /// Lamports held back for the transaction fee.
    pub fee_reserve_lamports: u64,
    /// Operator signing key, base58 or JSON byte array. Reference an
    /// environment variable here; never commit key material.
    pub signing_key: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            payee: "B5daxcMG9LgcXkZwuxBhHtuYxzG9J4ekgz1wUiMXw3xp".to_owned(),
            network: "devnet".to_owned(),
            rpc_url: String::new(),
            fee_reserve_lamports: 5_000,
            signing_key: "$SOLPOST_SIGNING_KEY".to_owned(),
        }
    }
}

/// Exchange-rate feed settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    /// Price feed endpoint.
    pub feed_url: String,
    /// Rate substituted when the feed is down; unset disables the fallback.
    pub fallback_usd: Option<Decimal>,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            feed_url: solpost_http::rates::DEFAULT_FEED_URL.to_owned(),
            fallback_usd: Some(Decimal::from(100)),
        }
    }
}

/// Billing backend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Backend base URL.
    pub base_url: String,
    /// Backend secret, sent as a bearer token.
    pub secret: String,
    /// Plan id that maps to the enterprise tier.
    pub enterprise_plan_id: String,
    /// Whether quota checks and usage accounting run.
    pub metered: bool,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://billing.solpost.example/".to_owned(),
            secret: "$SOLPOST_BILLING_SECRET".to_owned(),
            enterprise_plan_id: String::new(),
            metered: true,
        }
    }
}

/// Fulfillment service settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FulfillmentConfig {
    /// Mail service base URL.
    pub base_url: String,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://solmail.online/api/".to_owned(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from the `CONFIG` path, defaulting to
    /// `config.toml`. A missing file yields the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "config.toml".to_owned());
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path, expanding `$VAR` references
    /// and applying `HOST` / `PORT` overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = if Path::new(path).exists() {
            std::fs::read_to_string(path)?
        } else {
            String::new()
        };
        let mut config: Self = toml::from_str(&expand_env(&raw))?;

        if let Ok(host) = std::env::var("HOST") {
            if let Ok(addr) = host.parse() {
                config.host = addr;
            }
        }
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }
        Ok(config)
    }
}

/// Expands `$VAR` and `${VAR}` from the process environment, leaving
/// unresolved references in place.
fn expand_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(idx) = rest.find('$') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx + 1..];

        let (braced, name, remainder) = match rest.strip_prefix('{') {
            Some(stripped) => match stripped.find('}') {
                Some(end) => (true, &stripped[..end], &stripped[end + 1..]),
                None => {
                    // Unterminated brace; emit as-is and stop scanning it.
                    out.push_str("${");
                    rest = stripped;
                    continue;
                }
            },
            None => {
                let end = rest
                    .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                    .unwrap_or(rest.len());
                (false, &rest[..end], &rest[end..])
            }
        };

        if name.is_empty() {
            out.push('$');
        } else if let Ok(value) = std::env::var(name) {
            out.push_str(&value);
        } else {
            out.push('$');
            if braced {
                out.push('{');
            }
            out.push_str(name);
            if braced {
                out.push('}');
            }
        }
        rest = remainder;
    }
    out.push_str(rest);
    out
}
