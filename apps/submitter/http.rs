use crate::analysis::{self, AnalysisDocument};
use crate::coordinator::ProposalCoordinator;
use crate::errors::SubmitError;
use crate::ipfs::IpfsFetcher;
use crate::proposal;
use crate::session::{InMemorySessionStore, SessionStore, StoredSubmission};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<ProposalCoordinator>,
    pub fetcher: IpfsFetcher,
    pub sessions: Arc<InMemorySessionStore>,
    pub gateway_base: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/proposals/prepare", post(prepare_proposal))
        .route("/proposals", post(create_proposal))
        .route("/proposals/retry", post(retry_proposal))
        .route("/proposals/status/{session_id}", get(session_status))
        .route("/membership", get(membership))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    pub image_content_id: String,
    pub analysis_content_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedResponse {
    pub success: bool,
    pub description: String,
    pub analysis: AnalysisDocument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub success: bool,
    pub proposal_id: String,
    pub tx_hash: String,
    pub block_number: u64,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_content_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_content_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub address: String,
    pub is_member: bool,
    pub minimum_stake: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        let status = match &self {
            SubmitError::Fetch(_) => StatusCode::BAD_GATEWAY,
            SubmitError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SubmitError::Membership(_) => StatusCode::FORBIDDEN,
            SubmitError::ChainCall { .. } => StatusCode::BAD_GATEWAY,
            SubmitError::EventNotFound => StatusCode::BAD_GATEWAY,
            SubmitError::UnknownSession(_) => StatusCode::NOT_FOUND,
        };

        let body = ErrorBody {
            error: self.to_string(),
            details: self.guidance().map(str::to_string),
        };

        (status, Json(body)).into_response()
    }
}

/// Fetch, validate and format without touching the chain. Lets a caller
/// inspect (or sign themselves) the description that would be submitted.
#[instrument(skip_all)]
async fn prepare_proposal(
    State(state): State<AppState>,
    Json(request): Json<ProposalRequest>,
) -> Result<Json<PreparedResponse>, SubmitError> {
    let raw = state
        .fetcher
        .fetch_analysis(&request.analysis_content_id)
        .await?;
    let doc = analysis::validate(&raw)?;
    let description = proposal::format_description(
        &doc,
        &request.image_content_id,
        &request.analysis_content_id,
        &state.gateway_base,
    );

    Ok(Json(PreparedResponse {
        success: true,
        description,
        analysis: doc,
    }))
}

#[instrument(skip_all)]
async fn create_proposal(
    State(state): State<AppState>,
    Json(request): Json<ProposalRequest>,
) -> Result<Json<CreatedResponse>, SubmitError> {
    if let Some(session_id) = &request.session_id {
        state
            .sessions
            .put(
                session_id,
                StoredSubmission {
                    image_cid: request.image_content_id.clone(),
                    analysis_cid: request.analysis_content_id.clone(),
                    stored_at: Utc::now(),
                },
            )
            .await;
    }

    let created = run_pipeline(
        &state,
        &request.image_content_id,
        &request.analysis_content_id,
    )
    .await?;

    // Success consumes the stored pair; a failure leaves it behind for
    // a retry.
    if let Some(session_id) = &request.session_id {
        state.sessions.remove(session_id).await;
    }

    Ok(Json(created))
}

#[instrument(skip_all)]
async fn retry_proposal(
    State(state): State<AppState>,
    Json(request): Json<RetryRequest>,
) -> Result<Json<CreatedResponse>, SubmitError> {
    let Some(stored) = state.sessions.get(&request.session_id).await else {
        return Err(SubmitError::UnknownSession(request.session_id));
    };

    let created = run_pipeline(&state, &stored.image_cid, &stored.analysis_cid).await?;
    state.sessions.remove(&request.session_id).await;

    Ok(Json(created))
}

#[instrument(skip_all)]
async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<SessionStatusResponse> {
    match state.sessions.get(&session_id).await {
        Some(stored) => Json(SessionStatusResponse {
            session_id,
            ready: true,
            image_content_id: Some(stored.image_cid),
            analysis_content_id: Some(stored.analysis_cid),
            stored_at: Some(stored.stored_at),
        }),
        None => Json(SessionStatusResponse {
            session_id,
            ready: false,
            image_content_id: None,
            analysis_content_id: None,
            stored_at: None,
        }),
    }
}

#[instrument(skip_all)]
async fn membership(
    State(state): State<AppState>,
) -> Result<Json<MembershipResponse>, SubmitError> {
    let status = state.coordinator.membership_status().await?;

    Ok(Json(MembershipResponse {
        address: status.address.to_string(),
        is_member: status.is_member,
        minimum_stake: status.minimum_stake.to_string(),
    }))
}

async fn run_pipeline(
    state: &AppState,
    image_cid: &str,
    analysis_cid: &str,
) -> Result<CreatedResponse, SubmitError> {
    let raw = state.fetcher.fetch_analysis(analysis_cid).await?;
    let doc = analysis::validate(&raw)?;

    // A fresh description (and submission token) on every attempt; the
    // contract rejects duplicate text.
    let description =
        proposal::format_description(&doc, image_cid, analysis_cid, &state.gateway_base);
    let submitted = state.coordinator.submit(&description).await?;

    Ok(CreatedResponse {
        success: true,
        proposal_id: submitted.proposal_id.to_string(),
        tx_hash: submitted.tx_hash.to_string(),
        block_number: submitted.block_number,
        message: "Proposal created successfully".to_string(),
    })
}
