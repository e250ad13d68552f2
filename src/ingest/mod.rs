//! Ingestion pipeline: chunking, point building, and orchestration.

pub mod chunking;
pub mod point;
mod service;
pub mod types;

pub use chunking::{Chunk, chunk_text};
pub use point::build_point;
pub use service::{IngestApi, IngestionService};
pub use types::{ChunkingError, IngestError, IngestionSummary, PointError};
