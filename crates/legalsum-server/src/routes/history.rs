//! Session history routes: list, clear, and download summaries and reports.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use legalsum_chat::report::{render_report, report_file_name, summary_file_name};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/history", get(list_history).delete(clear_history))
        .route("/history/{id}/summary", get(download_summary))
        .route("/history/{id}/report", get(download_report))
}

/// GET /api/history: summaries from this session, oldest first.
async fn list_history(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let entries = state.history();
    Json(serde_json::json!({
        "total": entries.len(),
        "entries": entries,
    }))
}

/// DELETE /api/history
async fn clear_history(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let cleared = state.clear_history();
    Json(serde_json::json!({ "cleared": cleared }))
}

fn entry_not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("History entry not found: {}", id) })),
    )
        .into_response()
}

fn text_attachment(file_name: String, body: String) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file_name);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// GET /api/history/:id/summary: the bare summary text.
async fn download_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.history_entry(&id) {
        Some(entry) => text_attachment(summary_file_name(&entry.filename), entry.summary),
        None => entry_not_found(&id),
    }
}

/// GET /api/history/:id/report: metadata plus summary.
async fn download_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(entry) = state.history_entry(&id) else {
        return entry_not_found(&id);
    };
    let report = render_report(&entry.filename, &entry.metadata, &entry.summary, entry.timestamp);
    text_attachment(report_file_name(&entry.filename), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use legalsum_ingest::DocumentMetadata;
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::routes::tests::{send, send_json};
    use crate::state::tests::test_state;

    fn state_with_entry() -> (tempfile::TempDir, Arc<AppState>, String) {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(test_state(dir.path()));
        let metadata = DocumentMetadata {
            parties: vec!["Acme Corp".into()],
            ..Default::default()
        };
        let (entry, _) = state.record_summary("lease.pdf", "## Summary\nA lease.", &metadata);
        (dir, state, entry.id)
    }

    #[tokio::test]
    async fn test_list_and_clear_history() {
        let (_dir, state, id) = state_with_entry();

        let request = Request::get("/api/history").body(Body::empty()).unwrap();
        let (status, body) = send_json(build_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["entries"][0]["id"], id.as_str());
        let entry = &body["entries"][0];
        assert_eq!(entry["filename"], "lease.pdf");
        assert_eq!(entry["summary"], "## Summary\nA lease.");
        assert_eq!(entry["metadata"]["parties"], serde_json::json!(["Acme Corp"]));
        assert!(entry["timestamp"].is_string());
        assert_eq!(entry["contentHash"].as_str().unwrap().len(), 64);

        let request = Request::delete("/api/history").body(Body::empty()).unwrap();
        let (_, body) = send_json(build_router(state.clone()), request).await;
        assert_eq!(body["cleared"], 1);
        assert!(state.history().is_empty());
    }

    #[tokio::test]
    async fn test_download_report() {
        let (_dir, state, id) = state_with_entry();

        let request = Request::get(format!("/api/history/{}/report", id))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(build_router(state), request).await;
        let text = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(text.starts_with("Document Summary Report\n"));
        assert!(text.contains("Original File: lease.pdf\n"));
        assert!(text.contains("\nParties:\n- Acme Corp\n"));
        assert!(text.ends_with("## Summary\nA lease."));
    }

    #[tokio::test]
    async fn test_download_summary() {
        let (_dir, state, id) = state_with_entry();

        let request = Request::get(format!("/api/history/{}/summary", id))
            .body(Body::empty())
            .unwrap();
        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"summary_lease.pdf.txt\""
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"## Summary\nA lease.");

        let request = Request::get("/api/history/nope/summary")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(build_router(state), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_report_for_unknown_entry() {
        let (_dir, state, _) = state_with_entry();

        let request = Request::get("/api/history/nope/report")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_json(build_router(state), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }
}
