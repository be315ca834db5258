//! Axum route handlers.
//!
//! Thin transport over the pipeline: extract a credential, hand off, map the
//! error taxonomy. Two credential sources feed the same orchestrator: the
//! process-scoped operator wallet from the configuration, or a per-request
//! signing key supplied in the dispatch body (bring-your-own-wallet callers).
//!
//! The dispatch handler runs the pipeline on a detached task so a client
//! disconnect cannot cancel an in-flight payment: a broadcast transaction
//! is irrevocable, and confirmation, verification, and usage accounting must
//! finish even if nobody reads the answer.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Json, Router, routing};
use serde::Deserialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_pubkey::Pubkey;
use solpost::credential::Credential;
use solpost::pipeline::{AccountInfo, DispatchOutcome, Pipeline, PipelineConfig};
use solpost::pricing::Quote;
use solpost::request::{LetterRequest, PrintOptions};
use solpost_http::{HttpBillingClient, HttpMailer, HttpRateFeed};
use solpost_svm::{Network, SolanaRail, decode_signing_key};

use crate::error::ServiceError;

/// The pipeline paying from the process-scoped operator wallet.
pub type ServicePipeline =
    Pipeline<HttpBillingClient, HttpRateFeed, SolanaRail<RpcClient>, HttpMailer>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Prebuilt pipeline over the operator wallet.
    pub pipeline: Arc<ServicePipeline>,
    /// Collaborator clients, cloned into per-request pipelines for
    /// bring-your-own-wallet dispatches.
    pub billing: HttpBillingClient,
    /// Exchange-rate feed client.
    pub rates: HttpRateFeed,
    /// Fulfillment client.
    pub mailer: HttpMailer,
    /// Pipeline configuration shared by both credential sources.
    pub config: PipelineConfig,
    /// Payee wallet.
    pub payee: Pubkey,
    /// Fee reserve in lamports.
    pub fee_reserve: u64,
    /// Cluster used when a request names none.
    pub network: Network,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

/// Pulls the caller credential from `X-Api-Key` or `Authorization: Bearer`.
fn credential_from(headers: &HeaderMap) -> Result<Credential, ServiceError> {
    let raw = headers
        .get("x-api-key")
        .or_else(|| headers.get(axum::http::header::AUTHORIZATION))
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value));
    Credential::parse(raw).map_err(ServiceError::from)
}

/// `GET /health` — liveness probe.
pub async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "solpost" }))
}

/// Quote request parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuoteParams {
    /// Destination country code.
    country: Option<String>,
    /// Color printing.
    color: bool,
}

/// `POST /quote` — prices a letter. No credential required.
///
/// # Errors
///
/// 503 when the rate feed is down and no fallback is configured.
pub async fn post_quote(
    State(state): State<AppState>,
    Json(params): Json<QuoteParams>,
) -> Result<Json<Quote>, ServiceError> {
    let country = params.country.as_deref().unwrap_or("US");
    let options = PrintOptions {
        color: params.color,
        ..PrintOptions::default()
    };
    let quote = state.pipeline.quote(country, &options).await?;
    Ok(Json(quote))
}

/// Dispatch request body: the letter plus an optional caller wallet.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchBody {
    /// The letter to send.
    #[serde(flatten)]
    letter: LetterRequest,
    /// Caller signing key (base58 or JSON byte array). When present the
    /// payment is made from this wallet instead of the operator wallet.
    wallet_private_key: Option<String>,
    /// Cluster for a caller-wallet payment; defaults to the service cluster.
    network: Option<String>,
}

/// `POST /letters` — pays for and dispatches a letter.
///
/// # Errors
///
/// The full dispatch taxonomy; post-payment failures carry the transaction
/// signature.
pub async fn post_letters(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<DispatchBody>,
) -> Result<Json<DispatchOutcome>, ServiceError> {
    let credential = credential_from(&headers)?;
    let DispatchBody {
        letter,
        wallet_private_key,
        network,
    } = body;

    // Detached spawns: a dropped connection cannot cancel mid-payment.
    let outcome = match wallet_private_key {
        Some(raw_key) => {
            let signer =
                decode_signing_key(&raw_key).map_err(|_| solpost::DispatchError::InvalidSigningKey)?;
            let network = match network {
                Some(name) => name
                    .parse::<Network>()
                    .map_err(|e| solpost::DispatchError::InvalidRequest(e.to_string()))?,
                None => state.network,
            };
            let rpc = RpcClient::new_with_commitment(
                network.default_rpc_url().to_owned(),
                CommitmentConfig::confirmed(),
            );
            let rail = SolanaRail::new(rpc, signer, state.payee, state.fee_reserve, network);
            let pipeline = Pipeline::new(
                state.billing.clone(),
                state.rates.clone(),
                rail,
                state.mailer.clone(),
                state.config.clone(),
            );
            tokio::spawn(async move { pipeline.dispatch(&credential, &letter).await })
                .await
                .map_err(|e| ServiceError::Internal(e.to_string()))??
        }
        None => {
            let pipeline = Arc::clone(&state.pipeline);
            tokio::spawn(async move { pipeline.dispatch(&credential, &letter).await })
                .await
                .map_err(|e| ServiceError::Internal(e.to_string()))??
        }
    };
    Ok(Json(outcome))
}

/// `GET /account` — tier, usage, and limits for the presented credential.
///
/// # Errors
///
/// 401 for unknown credentials, 502 when billing cannot be read.
pub async fn get_account(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AccountInfo>, ServiceError> {
    let credential = credential_from(&headers)?;
    let info = state.pipeline.account_info(&credential).await?;
    Ok(Json(info))
}

/// `GET /wallet` — operator wallet address and balance.
///
/// # Errors
///
/// 502 when the ledger cannot be queried.
pub async fn get_wallet(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let status = state.pipeline.wallet().await.map_err(ServiceError::Wallet)?;
    Ok(Json(serde_json::json!({
        "address": status.address,
        "balanceLamports": status.lamports,
        "network": state.network.name(),
    })))
}

/// Builds the service router.
pub fn service_router(state: AppState) -> Router {
    Router::new()
        .route("/health", routing::get(get_health))
        .route("/quote", routing::post(post_quote))
        .route("/letters", routing::post(post_letters))
        .route("/account", routing::get(get_account))
        .route("/wallet", routing::get(get_wallet))
        .with_state(state)
}
