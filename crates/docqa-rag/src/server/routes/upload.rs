//! Document upload endpoint

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::error::{Error, Result};
use crate::ingestion::identify;
use crate::server::state::AppState;
use crate::types::{DocumentRecord, UploadResponse};

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(e.body_text())
    } else {
        Error::BadRequest(format!("Failed to read multipart body: {}", e.body_text()))
    }
}

/// POST /api/v1/upload - Ingest one file (multipart field `file`)
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();
    let max_size = state.config().server.max_upload_size;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::BadRequest("File field has no filename".to_string()))?;
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| Error::BadRequest("Missing multipart field 'file'".to_string()))?;

    if data.len() > max_size {
        return Err(Error::PayloadTooLarge(format!(
            "'{}' is {} bytes; limit is {} bytes",
            filename,
            data.len(),
            max_size
        )));
    }

    tracing::info!("Processing upload: {} ({} bytes)", filename, data.len());

    let file_size = data.len() as u64;
    let ingest_timeout = Duration::from_secs(state.config().processing.ingest_timeout_secs);
    let doc_id = identify(&data);
    let outcome = match timeout(ingest_timeout, state.pipeline().ingest(data.to_vec(), &filename)).await {
        Ok(result) => result?,
        Err(_) => {
            // The collection may already be on disk without a registry entry
            if state.get_document(&doc_id).is_none() {
                if let Err(e) = state.store().delete(&doc_id).await {
                    tracing::warn!("Failed to remove collection for timed-out {}: {}", doc_id, e);
                }
            }
            return Err(Error::Timeout(format!(
                "Ingestion of '{}' exceeded {}s",
                filename,
                ingest_timeout.as_secs()
            )));
        }
    };

    let mut record = DocumentRecord::new(
        outcome.doc_id.clone(),
        filename.clone(),
        outcome.file_type,
        file_size,
        outcome.chunks.len(),
    );

    // The document is usable even when the LLM is not
    let (summary, message) = match state.assistant().summarize(&outcome.doc_id).await {
        Ok(summary) => {
            record.summary = Some(summary.clone());
            (summary, "Document processed successfully".to_string())
        }
        Err(e) => {
            tracing::warn!("Summary for {} unavailable: {}", outcome.doc_id, e);
            (String::new(), format!("Document processed; summary unavailable: {}", e))
        }
    };

    state.add_document(record);

    tracing::info!(
        "Uploaded {} as {} ({} chunks) in {:?}",
        filename,
        outcome.doc_id,
        outcome.chunks.len(),
        start.elapsed()
    );

    Ok(Json(UploadResponse {
        document_id: outcome.doc_id,
        filename,
        chunk_count: outcome.chunks.len(),
        summary,
        success: true,
        message,
    }))
}
