//! Idempotent startup provisioning for the destination collection.

use crate::qdrant::client::QdrantService;
use crate::qdrant::types::{Distance, QdrantError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Errors raised while ensuring the destination collection is ready.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Qdrant interaction failed during the existence check or creation.
    #[error("Qdrant request failed: {0}")]
    Store(#[from] QdrantError),
    /// The collection already exists with a different vector size.
    #[error(
        "collection '{collection}' has vector size {actual}, but {expected} is configured"
    )]
    DimensionMismatch {
        /// Name of the offending collection.
        collection: String,
        /// Vector size this service is configured for.
        expected: u64,
        /// Vector size reported by Qdrant.
        actual: u64,
    },
}

/// Ensures the destination collection exists with the configured vector size
/// and metric before any ingestion runs.
///
/// The check is memoized so the collection round-trip happens at most once
/// per process lifetime under normal operation; repeated calls after a
/// failure retry the full sequence.
pub struct CollectionProvisioner {
    qdrant: Arc<QdrantService>,
    collection_name: String,
    dimension: u64,
    distance: Distance,
    ready: OnceCell<()>,
}

impl CollectionProvisioner {
    /// Build a provisioner for the given collection parameters.
    pub fn new(
        qdrant: Arc<QdrantService>,
        collection_name: impl Into<String>,
        dimension: u64,
        distance: Distance,
    ) -> Self {
        Self {
            qdrant,
            collection_name: collection_name.into(),
            dimension,
            distance,
            ready: OnceCell::new(),
        }
    }

    /// Name of the collection this provisioner manages.
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Ensure the collection exists, creating it when missing.
    ///
    /// When the collection already exists its reported vector size must match
    /// the configured dimension; a mismatch fails provisioning instead of
    /// corrupting the index at write time.
    pub async fn ensure_ready(&self) -> Result<(), ProvisionError> {
        self.ready
            .get_or_try_init(|| self.provision())
            .await
            .map(|_| ())
    }

    async fn provision(&self) -> Result<(), ProvisionError> {
        let collections = self.qdrant.list_collections().await?;
        if !collections.iter().any(|name| name == &self.collection_name) {
            tracing::info!(
                collection = %self.collection_name,
                vector_size = self.dimension,
                distance = self.distance.as_str(),
                "Creating collection"
            );
            self.qdrant
                .create_collection(&self.collection_name, self.dimension, self.distance)
                .await?;
            return Ok(());
        }

        // The existing collection's vector size must agree with ours, or every
        // upsert would fail (or worse, silently corrupt the index).
        if let Some(params) = self.qdrant.collection_params(&self.collection_name).await?
            && params.size != self.dimension
        {
            return Err(ProvisionError::DimensionMismatch {
                collection: self.collection_name.clone(),
                expected: self.dimension,
                actual: params.size,
            });
        }
        tracing::debug!(
            collection = %self.collection_name,
            vector_size = self.dimension,
            "Collection already present"
        );
        Ok(())
    }
}
