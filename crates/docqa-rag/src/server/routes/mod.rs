//! API routes for the document Q&A server

pub mod challenge;
pub mod documents;
pub mod query;
pub mod upload;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Ingestion - with larger body limit for file uploads
        .route(
            "/upload",
            post(upload::upload_document)
                .layer(DefaultBodyLimit::max(max_upload_size.saturating_add(MULTIPART_OVERHEAD))),
        )
        // Question answering
        .route("/ask", post(query::ask_question))
        .route("/retrieve", post(query::retrieve_chunks))
        .route("/summarize", post(query::summarize_document))
        // Challenge mode
        .route("/challenge", post(challenge::generate_challenge))
        .route("/challenge/:session_id", get(challenge::challenge_progress))
        .route("/evaluate", post(challenge::evaluate_response))
        // Document management
        .route("/documents", get(documents::list_documents))
        .route(
            "/documents/:id",
            get(documents::get_document).delete(documents::delete_document),
        )
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    let store = state.store();

    Json(serde_json::json!({
        "name": "docqa-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document Q&A with content-addressed ingestion and per-document retrieval",
        "endpoints": {
            "POST /api/v1/upload": "Upload a pdf, txt or docx file (multipart field 'file')",
            "POST /api/v1/ask": "Answer a question from selected documents",
            "POST /api/v1/retrieve": "Ranked chunks for a query, no generation",
            "POST /api/v1/summarize": "Bullet-point summary of a document",
            "POST /api/v1/challenge": "Generate comprehension questions",
            "GET /api/v1/challenge/:session_id": "Challenge session progress",
            "POST /api/v1/evaluate": "Grade an answer to a challenge question",
            "GET /api/v1/documents": "List all documents",
            "GET /api/v1/documents/:id": "Get document details",
            "DELETE /api/v1/documents/:id": "Delete a document"
        },
        "settings": {
            "chunk_size": config.chunking.chunk_size,
            "max_upload_size": config.server.max_upload_size,
            "distance": store.metric(),
            "embedder": store.embedder().name(),
            "llm_provider": state.assistant().llm().name(),
            "llm_model": state.assistant().llm().model(),
        },
        "collections": store.collections().len(),
    }))
}
