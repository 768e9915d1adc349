//! Vector index collaborator interface and the document store wrapper.
//!
//! The index engine itself (embedding, on-disk format, ANN search) lives
//! outside this crate; `VectorIndex` is the narrow seam it is reached
//! through. `DocumentStore` is the long-lived, read-only handle the
//! pipeline shares across queries.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::RagError;

/// Opaque token for an opened collection. Implementations key on the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionHandle(String);

impl CollectionHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Raw similarity-search hits, nested by query batch.
///
/// The batch dimension mirrors the engine's wire shape; this pipeline
/// always issues single-query batches, so only index 0 is populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryHits {
    pub documents: Vec<Vec<String>>,
    pub metadatas: Vec<Vec<BTreeMap<String, String>>>,
}

/// Abstract interface to the external vector index engine.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Open a named collection. A missing collection is `StoreUnavailable`.
    async fn open_collection(&self, name: &str) -> Result<CollectionHandle, RagError>;

    /// Similarity search: top `n` hits for `text`, most similar first.
    async fn query(
        &self,
        handle: &CollectionHandle,
        text: &str,
        n: usize,
    ) -> Result<QueryHits, RagError>;

    /// Number of documents in the collection.
    async fn count(&self, handle: &CollectionHandle) -> Result<usize, RagError>;

    /// Names of all collections the engine holds.
    async fn list_collections(&self) -> Result<Vec<String>, RagError>;
}

/// An opened collection: the handle plus the name it was opened under.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    handle: CollectionHandle,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Shared wrapper over the vector index collaborator.
///
/// Cloning is cheap; all clones talk to the same engine connection.
#[derive(Clone)]
pub struct DocumentStore {
    index: Arc<dyn VectorIndex>,
}

impl DocumentStore {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }

    pub async fn open(&self, name: &str) -> Result<Collection, RagError> {
        let handle = self.index.open_collection(name).await?;
        Ok(Collection {
            name: name.to_string(),
            handle,
        })
    }

    pub async fn search(
        &self,
        collection: &Collection,
        query: &str,
        n: usize,
    ) -> Result<QueryHits, RagError> {
        self.index.query(&collection.handle, query, n).await
    }

    pub async fn count(&self, collection: &Collection) -> Result<usize, RagError> {
        self.index.count(&collection.handle).await
    }

    pub async fn list_collections(&self) -> Result<Vec<String>, RagError> {
        self.index.list_collections().await
    }

    /// Human-readable open status for the collection, reported to the
    /// caller separately from the answer flow.
    pub async fn status(&self, name: &str) -> String {
        match self.open(name).await {
            Ok(collection) => match self.count(&collection).await {
                Ok(count) => {
                    format!("Loaded {} documents from collection '{}'.", count, name)
                }
                Err(err) => {
                    tracing::warn!("failed to count collection '{}': {}", name, err);
                    format!("Opened collection '{}', but its size could not be read.", name)
                }
            },
            Err(err) => {
                tracing::warn!("failed to open collection '{}': {}", name, err);
                format!("Collection '{}' was not found. Check the name.", name)
            }
        }
    }
}
