//! HTTP surface for the ingestion service.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /documents?filename=...` – Accept a binary PDF payload, run the
//!   extract → chunk → embed → upsert pipeline, and return an ingestion
//!   summary (`filename`, `total_pages`, `total_chunks`).
//! - `GET /` – Service status and the target collection name.
//! - `GET /metrics` – Observe ingestion counters.
//!
//! Handlers are generic over [`IngestApi`] so tests can substitute a
//! recording stub for the real pipeline.

use crate::ingest::{IngestApi, IngestError};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Build the HTTP router exposing the ingestion API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: IngestApi + 'static,
{
    Router::new()
        .route("/", get(service_status::<S>))
        .route("/documents", post(ingest_document::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Query parameters for the `POST /documents` endpoint.
#[derive(Deserialize)]
struct IngestParams {
    /// Source filename persisted in each chunk's payload.
    filename: String,
}

/// Success response for the `POST /documents` endpoint.
#[derive(Serialize)]
struct IngestResponse {
    /// Source filename supplied with the upload.
    filename: String,
    /// Number of pages the extractor reported.
    total_pages: usize,
    /// Number of chunks embedded and upserted.
    total_chunks: usize,
}

/// Ingest a PDF document into the target collection.
async fn ingest_document<S>(
    State(service): State<Arc<S>>,
    Query(params): Query<IngestParams>,
    body: Bytes,
) -> Result<Json<IngestResponse>, AppError>
where
    S: IngestApi,
{
    let summary = service.ingest(&body, &params.filename).await?;
    tracing::info!(
        filename = %summary.filename,
        pages = summary.total_pages,
        chunks = summary.total_chunks,
        "Ingest request completed"
    );
    Ok(Json(IngestResponse {
        filename: summary.filename,
        total_pages: summary.total_pages,
        total_chunks: summary.total_chunks,
    }))
}

/// Response body for `GET /`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    collection: String,
    message: &'static str,
}

/// Report that the service is up and which collection it writes to.
async fn service_status<S>(State(service): State<Arc<S>>) -> Json<StatusResponse>
where
    S: IngestApi,
{
    Json(StatusResponse {
        status: "ok",
        collection: service.collection_name().to_string(),
        message: "Ready to ingest documents",
    })
}

/// Return a concise metrics snapshot with document, chunk, and page counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: IngestApi,
{
    Json(service.metrics_snapshot())
}

struct AppError(IngestError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            IngestError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            IngestError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            IngestError::Embedding(_) | IngestError::Store(_) => StatusCode::BAD_GATEWAY,
            IngestError::Chunking(_)
            | IngestError::Point(_)
            | IngestError::DimensionMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(inner: IngestError) -> Self {
        Self(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::create_router;
    use crate::ingest::{IngestApi, IngestError, IngestionSummary};
    use crate::metrics::MetricsSnapshot;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Clone, Debug)]
    struct IngestCall {
        bytes: Vec<u8>,
        filename: String,
    }

    struct StubIngestService {
        calls: Arc<Mutex<Vec<IngestCall>>>,
        fail_with_unsupported: bool,
    }

    impl StubIngestService {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                fail_with_unsupported: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                fail_with_unsupported: true,
            }
        }

        async fn recorded_calls(&self) -> Vec<IngestCall> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl IngestApi for StubIngestService {
        async fn ingest(
            &self,
            bytes: &[u8],
            filename: &str,
        ) -> Result<IngestionSummary, IngestError> {
            if self.fail_with_unsupported {
                return Err(IngestError::UnsupportedMediaType);
            }
            let mut guard = self.calls.lock().await;
            guard.push(IngestCall {
                bytes: bytes.to_vec(),
                filename: filename.to_string(),
            });
            Ok(IngestionSummary {
                filename: filename.to_string(),
                total_pages: 3,
                total_chunks: 7,
            })
        }

        fn collection_name(&self) -> &str {
            "rfp_documents"
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                documents_ingested: 1,
                chunks_ingested: 7,
                pages_extracted: 3,
            }
        }
    }

    #[tokio::test]
    async fn documents_route_returns_summary() {
        let service = Arc::new(StubIngestService::new());
        let app = create_router(service.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/documents?filename=proposal.pdf")
                    .header("content-type", "application/pdf")
                    .body(Body::from(&b"%PDF-1.7 fake"[..]))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["filename"], "proposal.pdf");
        assert_eq!(json["total_pages"], 3);
        assert_eq!(json["total_chunks"], 7);

        let calls = service.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].filename, "proposal.pdf");
        assert_eq!(calls[0].bytes, b"%PDF-1.7 fake");
    }

    #[tokio::test]
    async fn missing_filename_is_a_client_error() {
        let app = create_router(Arc::new(StubIngestService::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/documents")
                    .body(Body::from(&b"%PDF-1.7"[..]))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unsupported_payload_maps_to_415() {
        let app = create_router(Arc::new(StubIngestService::failing()));

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/documents?filename=notes.txt")
                    .body(Body::from(&b"plain text"[..]))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn status_route_reports_collection() {
        let app = create_router(Arc::new(StubIngestService::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["status"], "ok");
        assert_eq!(json["collection"], "rfp_documents");
    }

    #[tokio::test]
    async fn metrics_route_exposes_counters() {
        let app = create_router(Arc::new(StubIngestService::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["documents_ingested"], 1);
        assert_eq!(json["chunks_ingested"], 7);
        assert_eq!(json["pages_extracted"], 3);
    }
}
