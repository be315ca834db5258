//! HTTP mapping of the dispatch error taxonomy.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use solpost::DispatchError;
use solpost::rail::RailError;

/// Errors surfaced by the service handlers.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A pipeline operation failed.
    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    /// A wallet view failed.
    #[error("{0}")]
    Wallet(#[from] RailError),

    /// The server lost a detached dispatch task.
    #[error("dispatch task failed: {0}")]
    Internal(String),
}

fn dispatch_status(error: &DispatchError) -> StatusCode {
    match error {
        DispatchError::InvalidCredential => StatusCode::UNAUTHORIZED,
        DispatchError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        DispatchError::InvalidRequest(_) | DispatchError::InvalidSigningKey => {
            StatusCode::BAD_REQUEST
        }
        DispatchError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
        DispatchError::PricingUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        DispatchError::BroadcastFailed(_)
        | DispatchError::PaymentFailed { .. }
        | DispatchError::FulfillmentRejected { .. }
        | DispatchError::Billing(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Error payload: machine-readable kind, human-readable message, and the
/// actionable context each kind promises (tier and limit, balance shortfall,
/// transaction signature for support).
fn dispatch_body(error: &DispatchError) -> serde_json::Value {
    let mut body = serde_json::json!({
        "kind": error.kind(),
        "error": error.to_string(),
    });
    match error {
        DispatchError::QuotaExceeded { tier, limit } => {
            body["tier"] = serde_json::json!(tier);
            body["limit"] = serde_json::json!(limit);
            body["upgrade"] = serde_json::json!(
                "Upgrade for a higher monthly allowance: https://solpost.example/pricing"
            );
        }
        DispatchError::InsufficientFunds {
            required,
            available,
        } => {
            body["requiredLamports"] = serde_json::json!(required);
            body["availableLamports"] = serde_json::json!(available);
            body["shortfallLamports"] = serde_json::json!(error.shortfall());
        }
        DispatchError::PaymentFailed {
            signature,
            lamports,
            ..
        }
        | DispatchError::FulfillmentRejected {
            signature,
            lamports,
            ..
        } => {
            body["signature"] = serde_json::json!(signature);
            body["lamports"] = serde_json::json!(lamports);
            body["support"] = serde_json::json!(
                "Payment was taken; quote this signature to support for a refund."
            );
        }
        _ => {}
    }
    body
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            Self::Dispatch(error) => {
                (dispatch_status(&error), Json(dispatch_body(&error))).into_response()
            }
            Self::Wallet(error) => (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "kind": "ledger_unavailable", "error": error.to_string() })),
            )
                .into_response(),
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "kind": "internal", "error": message })),
            )
                .into_response(),
        }
    }
}
