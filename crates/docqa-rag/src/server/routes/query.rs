//! Ask, retrieve and summarize endpoints

use axum::{extract::State, Json};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{
    AskRequest, AskResponse, RetrieveRequest, RetrieveResponse, SummarizeRequest, SummaryResponse,
};

/// POST /api/v1/ask - Answer a question from the given documents
pub async fn ask_question(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    if request.question.trim().is_empty() || request.document_ids.is_empty() {
        return Err(Error::BadRequest(
            "Question and document IDs are required".to_string(),
        ));
    }

    tracing::info!(
        "Question over {} documents: \"{}\"",
        request.document_ids.len(),
        request.question
    );

    let response = state
        .assistant()
        .ask(&request.question, &request.document_ids, request.top_k)
        .await?;

    Ok(Json(response))
}

/// POST /api/v1/retrieve - Ranked chunks without generation
pub async fn retrieve_chunks(
    State(state): State<AppState>,
    Json(request): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>> {
    if request.query.trim().is_empty() || request.document_ids.is_empty() {
        return Err(Error::BadRequest(
            "Query and document IDs are required".to_string(),
        ));
    }

    let results = state
        .assistant()
        .context(&request.query, &request.document_ids, request.top_k)
        .await;

    Ok(Json(RetrieveResponse {
        query: request.query,
        results,
    }))
}

/// POST /api/v1/summarize - Summarize a stored document
pub async fn summarize_document(
    State(state): State<AppState>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummaryResponse>> {
    if request.document_id.trim().is_empty() {
        return Err(Error::BadRequest("Document ID required".to_string()));
    }

    let summary = state.assistant().summarize(&request.document_id).await?;
    state.set_summary(&request.document_id, &summary);

    Ok(Json(SummaryResponse { summary }))
}
