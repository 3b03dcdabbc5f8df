//! Document management endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{DocumentInfo, DocumentListResponse};

/// GET /api/v1/documents - List all documents
pub async fn list_documents(State(state): State<AppState>) -> Json<DocumentListResponse> {
    let documents: Vec<DocumentInfo> = state.documents().iter().map(DocumentInfo::from).collect();

    Json(DocumentListResponse {
        total_count: documents.len(),
        documents,
    })
}

/// GET /api/v1/documents/:id - Get document details
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentInfo>> {
    state
        .get_document(&id)
        .map(|doc| Json(DocumentInfo::from(&doc)))
        .ok_or_else(|| Error::NotFound(format!("Document {}", id)))
}

/// DELETE /api/v1/documents/:id - Delete a document and its chunks
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let in_store = state.store().delete(&id).await?;
    let in_registry = state.remove_document(&id).is_some();

    if !in_store && !in_registry {
        return Err(Error::NotFound(format!("Document {}", id)));
    }

    let sessions = state.assistant().sessions().remove_for_document(&id);
    tracing::info!("Deleted document {} ({} sessions closed)", id, sessions);

    Ok(Json(serde_json::json!({
        "success": true,
        "document_id": id,
    })))
}
