//! RPC error mapping.
//!
//! The governance taxonomy maps onto HTTP status codes here; the
//! `retryable` flag tells callers which failures are worth retrying
//! (quorum not yet met, upstream outages) versus terminal for the request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use zonegov_engine::GovernanceError;
use zonegov_verifier::VerifyError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("server error: {0}")]
    Server(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    retryable: bool,
}

impl RpcError {
    fn parts(&self) -> (StatusCode, &'static str, bool) {
        match self {
            RpcError::Governance(GovernanceError::Validation(_)) => {
                (StatusCode::BAD_REQUEST, "validation_error", false)
            }
            RpcError::Governance(GovernanceError::Conflict(_)) => {
                (StatusCode::CONFLICT, "conflict", false)
            }
            RpcError::Governance(GovernanceError::QuorumNotMet { .. }) => {
                (StatusCode::CONFLICT, "quorum_not_met", true)
            }
            // Callers treat this as success; the execute handler answers 200
            // before this mapping is ever reached. Kept as a conflict for
            // any other surface it might leak through.
            RpcError::Governance(GovernanceError::AlreadyExecuted(_)) => {
                (StatusCode::CONFLICT, "already_executed", false)
            }
            RpcError::Governance(GovernanceError::Upstream(_))
            | RpcError::Verify(VerifyError::Upstream(_)) => {
                (StatusCode::BAD_GATEWAY, "upstream_unavailable", true)
            }
            RpcError::Governance(GovernanceError::Store(_))
            | RpcError::Verify(VerifyError::Store(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error", false)
            }
            RpcError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", false),
            RpcError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request", false),
            RpcError::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error", false),
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let (status, error, retryable) = self.parts();
        let body = ErrorBody {
            error,
            message: self.to_string(),
            retryable,
        };
        (status, Json(body)).into_response()
    }
}
