//! Axum server for the governance API.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::info;

use zonegov_engine::{GovernanceEngine, GovernanceError};
use zonegov_store::ProposalFilter;
use zonegov_types::{MemberId, ProposalId, VoteChoice};
use zonegov_verifier::{DriftVerifier, HttpStateFetcher, VerifyOutcome};

use crate::error::RpcError;
use crate::handlers::{
    ExecuteRequest, ExecuteResponse, ListProposalsParams, ProposalDetail, ProposalSummary,
    ProposeRequest, ProposeResponse, RepublishResponse, VerifyParams, VerifyResponse, VoteRequest,
    VoteResponse,
};
use crate::metrics::ApiMetrics;

/// Shared state behind every handler.
pub struct AppState {
    pub engine: Arc<GovernanceEngine>,
    pub verifier: Arc<DriftVerifier>,
    pub metrics: Arc<ApiMetrics>,
}

/// The HTTP server, configured with a port and shared state.
pub struct RpcServer {
    pub port: u16,
    pub state: Arc<AppState>,
}

impl RpcServer {
    pub fn new(port: u16, state: Arc<AppState>) -> Self {
        Self { port, state }
    }

    /// Build the router. Public so tests and embedders can drive the API
    /// without binding a socket.
    pub fn router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/propose", post(propose))
            .route("/vote", post(vote))
            .route("/execute", post(execute))
            .route("/republish", post(republish))
            .route("/verify", get(verify))
            .route("/proposals", get(list_proposals))
            .route("/proposals/:id", get(get_proposal))
            .route("/health", get(health))
            .route("/metrics", get(metrics_text))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Start serving. Runs until the server is shut down.
    pub async fn start(&self) -> Result<(), RpcError> {
        let app = Self::router(self.state.clone());
        let addr = format!("0.0.0.0:{}", self.port);
        info!("governance API listening on {addr}");
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        axum::serve(listener, app)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}

async fn propose(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProposeRequest>,
) -> Result<impl IntoResponse, RpcError> {
    let record = state
        .engine
        .create_proposal(request.payload, request.quorum_threshold_percent)?;
    state.metrics.proposals_created.inc();
    Ok((
        StatusCode::CREATED,
        Json(ProposeResponse {
            proposal_id: record.id.as_u64(),
            status: record.status.to_string(),
        }),
    ))
}

async fn vote(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VoteRequest>,
) -> Result<impl IntoResponse, RpcError> {
    let choice = VoteChoice::parse(&request.choice).ok_or_else(|| {
        RpcError::InvalidRequest(format!(
            "choice must be \"approve\" or \"reject\", got {:?}",
            request.choice
        ))
    })?;
    let tally = state.engine.cast_vote(
        ProposalId::new(request.proposal_id),
        &MemberId::new(request.member_id),
        choice,
    )?;
    state.metrics.votes_cast.inc();
    Ok(Json(VoteResponse {
        proposal_id: tally.proposal_id.as_u64(),
        approval_weight: tally.approval_weight,
        quorum_percent: tally.quorum_threshold_percent,
        total_active_power: tally.total_active_power,
        executable: tally.executable,
    }))
}

async fn execute(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Response, RpcError> {
    let proposal_id = ProposalId::new(request.proposal_id);
    match state.engine.execute(proposal_id).await {
        Ok(record) => {
            state.metrics.proposals_executed.inc();
            let execution_ref = record
                .execution_ref
                .as_ref()
                .map(|r| r.as_str().to_string())
                .unwrap_or_default();
            Ok(Json(ExecuteResponse {
                proposal_id: record.id.as_u64(),
                status: record.status.to_string(),
                execution_ref,
                already_executed: false,
            })
            .into_response())
        }
        // Losing the race is success for an idempotent caller: answer 200
        // with the winner's stored ref.
        Err(GovernanceError::AlreadyExecuted(_)) => {
            let record = state
                .engine
                .get_proposal(proposal_id)?
                .ok_or_else(|| RpcError::NotFound(format!("proposal {proposal_id}")))?;
            let execution_ref = record
                .execution_ref
                .as_ref()
                .map(|r| r.as_str().to_string())
                .unwrap_or_default();
            Ok(Json(ExecuteResponse {
                proposal_id: record.id.as_u64(),
                status: record.status.to_string(),
                execution_ref,
                already_executed: true,
            })
            .into_response())
        }
        // Execution committed but publication failed: surface the stored
        // ref so the caller can republish without re-running governance.
        Err(GovernanceError::Upstream(message)) => {
            state.metrics.publication_failures.inc();
            let execution_ref = state
                .engine
                .get_proposal(proposal_id)?
                .and_then(|p| p.execution_ref.map(|r| r.as_str().to_string()));
            Ok((
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({
                    "error": "publication_failed",
                    "message": message,
                    "proposal_id": proposal_id.as_u64(),
                    "execution_ref": execution_ref,
                    "retryable": true,
                })),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

async fn republish(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExecuteRequest>,
) -> Result<impl IntoResponse, RpcError> {
    let event = state
        .engine
        .retry_publication(ProposalId::new(request.proposal_id))
        .await?;
    Ok(Json(RepublishResponse {
        proposal_id: event.proposal_id.as_u64(),
        execution_ref: event.execution_ref.as_str().to_string(),
        executed_at: event.executed_at.as_secs(),
    }))
}

async fn verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Result<impl IntoResponse, RpcError> {
    let outcome = match params.source_url {
        Some(url) => {
            state
                .verifier
                .verify_with(&HttpStateFetcher::new(url))
                .await?
        }
        None => state.verifier.verify().await?,
    };
    state.metrics.drift_checks.inc();
    let mismatches = match &outcome {
        VerifyOutcome::Drift(report) => report.mismatched_paths.len() as i64,
        _ => 0,
    };
    state.metrics.last_drift_mismatches.set(mismatches);
    Ok(Json(VerifyResponse::from(outcome)))
}

async fn list_proposals(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListProposalsParams>,
) -> Result<impl IntoResponse, RpcError> {
    let filter = match params.status.as_deref() {
        None | Some("all") => ProposalFilter::All,
        Some("pending") => ProposalFilter::Pending,
        Some("executed") => ProposalFilter::Executed,
        Some(other) => {
            return Err(RpcError::InvalidRequest(format!(
                "unknown status filter {other:?}"
            )))
        }
    };
    let proposals = state.engine.list_proposals(filter)?;
    let summaries: Vec<ProposalSummary> = proposals.iter().map(Into::into).collect();
    Ok(Json(summaries))
}

async fn get_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, RpcError> {
    let record = state
        .engine
        .get_proposal(ProposalId::new(id))?
        .ok_or_else(|| RpcError::NotFound(format!("proposal {id}")))?;
    Ok(Json(ProposalDetail::from(&record)))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn metrics_text(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.metrics.encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use zonegov_nullables::{NullGovernanceStore, NullPublicationSink, NullStateFetcher};

    fn test_state() -> Arc<AppState> {
        let store = Arc::new(NullGovernanceStore::new());
        let sink = Arc::new(NullPublicationSink::new());
        let engine = Arc::new(GovernanceEngine::new(
            store.clone(),
            sink,
            "example.org",
        ));
        let fetcher = Arc::new(NullStateFetcher::new(json!({})));
        let verifier = Arc::new(DriftVerifier::new(store, fetcher));
        Arc::new(AppState {
            engine,
            verifier,
            metrics: Arc::new(ApiMetrics::new()),
        })
    }

    fn payload() -> serde_json::Value {
        json!({
            "kind": "dns-zone",
            "domain": "example.org",
            "records": {"www": {"A": "203.0.113.7"}},
        })
    }

    fn seed_executable_proposal(state: &Arc<AppState>) -> u64 {
        state
            .engine
            .upsert_member(&MemberId::new("alice"), 100, true)
            .unwrap();
        let pid = state.engine.create_proposal(payload(), None).unwrap().id;
        state
            .engine
            .cast_vote(pid, &MemberId::new("alice"), VoteChoice::Approve)
            .unwrap();
        pid.as_u64()
    }

    #[tokio::test]
    async fn propose_returns_created() {
        let state = test_state();
        let response = propose(
            State(state.clone()),
            Json(ProposeRequest {
                payload: payload(),
                quorum_threshold_percent: None,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(state.metrics.proposals_created.get(), 1);
    }

    #[tokio::test]
    async fn propose_rejects_cross_domain_payload() {
        let state = test_state();
        let response = propose(
            State(state),
            Json(ProposeRequest {
                payload: json!({
                    "kind": "dns-zone",
                    "domain": "other.net",
                    "records": {"www": {"A": "203.0.113.7"}},
                }),
                quorum_threshold_percent: None,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn vote_rejects_unknown_choice() {
        let state = test_state();
        let pid = seed_executable_proposal(&state);
        let response = vote(
            State(state),
            Json(VoteRequest {
                proposal_id: pid,
                member_id: "alice".into(),
                choice: "abstain".into(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn execute_then_repeat_is_success_equivalent() {
        let state = test_state();
        let pid = seed_executable_proposal(&state);

        let first = execute(
            State(state.clone()),
            Json(ExecuteRequest { proposal_id: pid }),
        )
        .await
        .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = execute(
            State(state.clone()),
            Json(ExecuteRequest { proposal_id: pid }),
        )
        .await
        .unwrap();
        assert_eq!(second.status(), StatusCode::OK);

        // Only the winning call counts as an execution.
        assert_eq!(state.metrics.proposals_executed.get(), 1);
    }

    #[tokio::test]
    async fn execute_below_quorum_is_retryable_conflict() {
        let state = test_state();
        state
            .engine
            .upsert_member(&MemberId::new("alice"), 100, true)
            .unwrap();
        let pid = state
            .engine
            .create_proposal(payload(), None)
            .unwrap()
            .id
            .as_u64();

        let response = execute(State(state), Json(ExecuteRequest { proposal_id: pid }))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn verify_reports_no_executed_proposal() {
        let state = test_state();
        let response = verify(State(state.clone()), Query(VerifyParams::default()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.metrics.drift_checks.get(), 1);
    }

    #[tokio::test]
    async fn unknown_proposal_is_not_found() {
        let state = test_state();
        let response = get_proposal(State(state), Path(404)).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_rejects_unknown_status_filter() {
        let state = test_state();
        let response = list_proposals(
            State(state),
            Query(ListProposalsParams {
                status: Some("rejected".into()),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
