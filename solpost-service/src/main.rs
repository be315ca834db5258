//! solpost HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Run with the default config (config.toml in the current directory)
//! cargo run -p solpost-service --release
//!
//! # Run with a custom config path
//! CONFIG=/path/to/config.toml cargo run -p solpost-service
//!
//! # Configure logging
//! RUST_LOG=info cargo run -p solpost-service
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to the TOML configuration file (default: `config.toml`)
//! - `HOST` / `PORT` — Override the bind address
//! - `RUST_LOG` — Log level filter (default: `info`)
//! - `SOLPOST_SIGNING_KEY` — Operator signing key (referenced from the
//!   default config; never logged)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_pubkey::Pubkey;
use solpost::pipeline::{Pipeline, PipelineConfig};
use solpost::pricing::PricingTable;
use solpost::rates::SolRate;
use solpost_http::{HttpBillingClient, HttpMailer, HttpRateFeed};
use solpost_svm::{Network, SolanaRail, decode_signing_key};
use tower_http::cors;
use tracing_subscriber::EnvFilter;
use url::Url;

use solpost_service::config::ServiceConfig;
use solpost_service::handlers::{AppState, service_router};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("service failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::load()?;
    let network: Network = config.payment.network.parse()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        network = %network,
        metered = config.billing.metered,
        "loaded configuration"
    );

    let http = reqwest::Client::new();

    let rates = HttpRateFeed::new(http.clone(), Url::parse(&config.rates.feed_url)?);
    let billing = HttpBillingClient::new(
        http.clone(),
        Url::parse(&config.billing.base_url)?,
        config.billing.secret.clone(),
    );
    let mailer = HttpMailer::new(http, Url::parse(&config.fulfillment.base_url)?);

    let signer = decode_signing_key(&config.payment.signing_key)?;
    let payee: Pubkey = config.payment.payee.parse()?;
    let rpc_url = if config.payment.rpc_url.is_empty() {
        network.default_rpc_url().to_owned()
    } else {
        config.payment.rpc_url.clone()
    };
    let rpc = RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed());
    let rail = SolanaRail::new(
        rpc,
        signer,
        payee,
        config.payment.fee_reserve_lamports,
        network,
    );

    let fallback_rate = config.rates.fallback_usd.and_then(SolRate::new);
    if config.rates.fallback_usd.is_some() && fallback_rate.is_none() {
        tracing::warn!("configured fallback rate is not positive; fallback disabled");
    }
    let pipeline_config = PipelineConfig {
        pricing: PricingTable {
            home_country: config.pricing.home_country.clone(),
            domestic_usd: config.pricing.domestic_usd,
            international_usd: config.pricing.international_usd,
            color_usd: config.pricing.color_usd,
        },
        enterprise_plan_id: config.billing.enterprise_plan_id.clone(),
        fallback_rate,
        metered: config.billing.metered,
    };
    let pipeline = Pipeline::new(
        billing.clone(),
        rates.clone(),
        rail,
        mailer.clone(),
        pipeline_config.clone(),
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        billing,
        rates,
        mailer,
        config: pipeline_config,
        payee,
        fee_reserve: config.payment.fee_reserve_lamports,
        network,
    };
    let router = service_router(state).layer(
        cors::CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(cors::Any),
    );

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install shutdown handler: {e}");
    }
}
