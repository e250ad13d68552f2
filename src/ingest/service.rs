//! Ingestion orchestrator driving extract, chunk, embed, and upsert.

use crate::{
    config::Config,
    embedding::EmbeddingClient,
    extract::{TextExtractor, is_pdf},
    ingest::{
        chunking::chunk_text,
        point::build_point,
        types::{IngestError, IngestionSummary},
    },
    metrics::{IngestMetrics, MetricsSnapshot},
    qdrant::{Point, QdrantService},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Coordinates the full ingestion pipeline for one document at a time.
///
/// The service owns long-lived handles to the extractor, embedding client,
/// Qdrant transport, and metrics registry. Collaborators are injected so
/// tests can substitute fakes; construct the service once near process start
/// and share it through an `Arc`.
pub struct IngestionService {
    extractor: Box<dyn TextExtractor>,
    embedding_client: Box<dyn EmbeddingClient>,
    qdrant: Arc<QdrantService>,
    metrics: Arc<IngestMetrics>,
    collection_name: String,
    dimension: usize,
    chunk_size: usize,
    chunk_overlap: usize,
}

/// Abstraction over the ingestion pipeline used by the HTTP surface.
#[async_trait]
pub trait IngestApi: Send + Sync {
    /// Extract, chunk, embed, and upsert one document.
    async fn ingest(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<IngestionSummary, IngestError>;

    /// Name of the collection receiving documents.
    fn collection_name(&self) -> &str;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl IngestionService {
    /// Build a new ingestion service around the injected collaborators.
    pub fn new(
        config: &Config,
        extractor: Box<dyn TextExtractor>,
        embedding_client: Box<dyn EmbeddingClient>,
        qdrant: Arc<QdrantService>,
    ) -> Self {
        Self {
            extractor,
            embedding_client,
            qdrant,
            metrics: Arc::new(IngestMetrics::new()),
            collection_name: config.qdrant_collection_name.clone(),
            dimension: config.embedding_dimension,
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }

    /// Run the pipeline for one document: extract text, chunk it, embed every
    /// chunk sequentially, then issue a single batch upsert.
    ///
    /// Any failure aborts the whole document before the store is touched, so
    /// a half-processed document never leaves partial points behind. A
    /// document with no extractable text succeeds with `total_chunks = 0` and
    /// performs no upsert.
    pub async fn ingest(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<IngestionSummary, IngestError> {
        if !is_pdf(bytes) {
            return Err(IngestError::UnsupportedMediaType);
        }

        let document = self.extractor.extract(bytes)?;
        tracing::debug!(
            filename,
            pages = document.pages,
            characters = document.text.len(),
            "Document text extracted"
        );

        let mut points: Vec<Point> = Vec::new();
        if !document.text.trim().is_empty() {
            let chunks = chunk_text(&document.text, self.chunk_size, self.chunk_overlap)?;
            points.reserve(chunks.len());

            for chunk in &chunks {
                let vector = self.embedding_client.embed(&chunk.text).await?;
                if vector.len() != self.dimension {
                    return Err(IngestError::DimensionMismatch {
                        expected: self.dimension,
                        actual: vector.len(),
                    });
                }
                points.push(build_point(&chunk.text, vector, filename)?);
            }
        }

        let total_chunks = points.len();
        if !points.is_empty() {
            self.qdrant
                .upsert_points(&self.collection_name, points)
                .await?;
        }

        self.metrics
            .record_document(total_chunks as u64, document.pages as u64);
        tracing::info!(
            filename,
            collection = %self.collection_name,
            pages = document.pages,
            chunks = total_chunks,
            "Document ingested"
        );

        Ok(IngestionSummary {
            filename: filename.to_string(),
            total_pages: document.pages,
            total_chunks,
        })
    }
}

#[async_trait]
impl IngestApi for IngestionService {
    async fn ingest(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<IngestionSummary, IngestError> {
        IngestionService::ingest(self, bytes, filename).await
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
