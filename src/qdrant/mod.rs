//! Qdrant vector store integration.

pub mod client;
pub mod provision;
pub mod types;

pub use client::QdrantService;
pub use provision::{CollectionProvisioner, ProvisionError};
pub use types::{CollectionParams, Distance, Point, QdrantError};
