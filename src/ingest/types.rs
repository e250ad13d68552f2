//! Core data types and error definitions for the ingestion pipeline.

use crate::embedding::EmbeddingError;
use crate::extract::ExtractionError;
use crate::qdrant::QdrantError;
use thiserror::Error;

/// Errors produced while segmenting text into chunks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    /// Chunk size of zero makes no forward progress.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap at or above the chunk size would stall the window.
    #[error("overlap {overlap} must be smaller than chunk size {chunk_size}")]
    OverlapTooLarge {
        /// Configured window size.
        chunk_size: usize,
        /// Configured overlap.
        overlap: usize,
    },
}

/// Errors produced while assembling a storable point.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointError {
    /// A point must carry a non-empty embedding vector.
    #[error("embedding vector must not be empty")]
    EmptyVector,
}

/// Errors emitted by the ingestion pipeline.
///
/// Any failure aborts the current document entirely; no partial batch is
/// written to the vector store.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The payload is not a PDF document.
    #[error("payload is not a PDF document")]
    UnsupportedMediaType,
    /// Text extraction failed on malformed input.
    #[error("failed to extract document text: {0}")]
    Extraction(#[from] ExtractionError),
    /// Chunking step rejected the configured window parameters.
    #[error("failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Embedding service call failed or timed out.
    #[error("failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingError),
    /// Returned embedding length disagrees with the collection dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the collection is configured for.
        expected: usize,
        /// Dimension of the vector the service returned.
        actual: usize,
    },
    /// Point assembly rejected its inputs.
    #[error("failed to build point: {0}")]
    Point(#[from] PointError),
    /// Vector store interaction failed during the batch upsert.
    #[error("Qdrant request failed: {0}")]
    Store(#[from] QdrantError),
}

/// Summary of a completed ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionSummary {
    /// Source filename supplied with the upload.
    pub filename: String,
    /// Number of pages the extractor reported.
    pub total_pages: usize,
    /// Number of chunks embedded and upserted.
    pub total_chunks: usize,
}
