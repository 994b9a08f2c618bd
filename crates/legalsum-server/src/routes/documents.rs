//! Document routes: metadata analysis and summarization of uploaded files.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use tracing::{info, warn};

use legalsum_chat::{LegalSummarizer, LlmBackend};
use legalsum_core::Error;
use legalsum_ingest::{read_document_bytes, ProcessedDocument};

use super::{bad_request, error_response, ApiError};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/documents/analyze", post(analyze))
        .route("/documents/summarize", post(summarize))
}

/// A `file` field plus the optional `maxLength` field of a multipart upload.
struct Upload {
    filename: String,
    bytes: Vec<u8>,
    max_length: Option<usize>,
}

/// POST /api/documents/analyze: metadata and normalized text, no LLM call.
async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let upload = read_upload(multipart).await?;
    let processed = process_upload(&state, &upload.filename, upload.bytes).await?;

    Ok(Json(serde_json::json!({
        "filename": upload.filename,
        "metadata": processed.metadata,
        "normalizedText": processed.normalized_text,
    })))
}

/// POST /api/documents/summarize: full pipeline, result recorded in history.
async fn summarize(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let upload = read_upload(multipart).await?;
    let max_length = upload.max_length.unwrap_or(state.config.default_max_length);

    let backend = LlmBackend::from_config(&state.llm_config.read()).map_err(|e| error_response(&e))?;
    let provider = backend.provider();
    let model = backend.model().to_string();

    let processed = process_upload(&state, &upload.filename, upload.bytes).await?;

    let summarizer = LegalSummarizer::new(Arc::new(backend));
    let summary = summarizer
        .generate_summary(
            &processed.normalized_text,
            Some(max_length),
            Some(&processed.metadata),
        )
        .await
        .map_err(|e| {
            warn!("Summarization of {} failed: {}", upload.filename, e);
            error_response(&e)
        })?;

    let (entry, added) = state.record_summary(&upload.filename, &summary, &processed.metadata);
    info!(
        "Summarized {} with {}/{} ({} chars{})",
        upload.filename,
        provider,
        model,
        summary.chars().count(),
        if added { "" } else { ", already in history" }
    );

    Ok(Json(serde_json::json!({
        "id": entry.id,
        "filename": upload.filename,
        "metadata": processed.metadata,
        "summary": summary,
        "duplicate": !added,
        "provider": provider.to_string(),
        "model": model,
    })))
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut file = None;
    let mut max_length = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(bad_request(format!("Invalid multipart body: {}", e))),
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = sanitize_filename(field.file_name().unwrap_or_default());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Read failed: {}", e)))?;
                file = Some((filename, bytes.to_vec()));
            }
            "maxLength" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Read failed: {}", e)))?;
                let value = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| bad_request(format!("Invalid maxLength: {}", raw)))?;
                max_length = Some(value);
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| bad_request("No file uploaded"))?;
    Ok(Upload {
        filename,
        bytes,
        max_length,
    })
}

/// Decode the upload and run extraction and normalization off the async runtime.
async fn process_upload(
    state: &Arc<AppState>,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<ProcessedDocument, ApiError> {
    let state = state.clone();
    let name = filename.to_string();

    let result = tokio::task::spawn_blocking(move || -> legalsum_core::Result<ProcessedDocument> {
        let text = read_document_bytes(&name, &bytes)?;
        if text.trim().is_empty() {
            return Err(Error::Decode(format!("No text could be extracted from {}", name)));
        }
        Ok(state.processor.process(&text))
    })
    .await;

    match result {
        Ok(Ok(processed)) => Ok(processed),
        Ok(Err(e)) => {
            warn!("Failed to process {}: {}", filename, e);
            Err(error_response(&e))
        }
        Err(e) => Err(error_response(&Error::Internal(format!(
            "Processing task failed: {}",
            e
        )))),
    }
}

/// Keep only the final path component, without characters unsafe in headers.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
