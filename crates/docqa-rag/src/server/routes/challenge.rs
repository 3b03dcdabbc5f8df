//! Challenge mode endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{
    ChallengeProgress, ChallengeRequest, ChallengeResponse, EvaluationRequest, EvaluationResponse,
};

/// POST /api/v1/challenge - Generate questions over a document
pub async fn generate_challenge(
    State(state): State<AppState>,
    Json(request): Json<ChallengeRequest>,
) -> Result<Json<ChallengeResponse>> {
    if request.document_id.trim().is_empty() {
        return Err(Error::BadRequest("Document ID required".to_string()));
    }

    let response = state
        .assistant()
        .challenge(&request.document_id, request.num_questions)
        .await?;

    Ok(Json(response))
}

/// POST /api/v1/evaluate - Grade an answer to a challenge question
pub async fn evaluate_response(
    State(state): State<AppState>,
    Json(request): Json<EvaluationRequest>,
) -> Result<Json<EvaluationResponse>> {
    if request.user_answer.trim().is_empty() {
        return Err(Error::BadRequest("User answer required".to_string()));
    }

    let response = state
        .assistant()
        .evaluate(request.session_id, request.question_id, &request.user_answer)
        .await?;

    Ok(Json(response))
}

/// GET /api/v1/challenge/:session_id - Progress of a challenge session
pub async fn challenge_progress(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ChallengeProgress>> {
    Ok(Json(state.assistant().sessions().progress(session_id)?))
}
