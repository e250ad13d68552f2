#![deny(missing_docs)]

//! Core library for the RFP ingestion service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and the Ollama-backed adapter.
pub mod embedding;
/// PDF text extraction seam.
pub mod extract;
/// Ingestion pipeline: chunking, point building, and orchestration.
pub mod ingest;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// Qdrant vector store integration.
pub mod qdrant;
