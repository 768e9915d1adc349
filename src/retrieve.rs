//! Similarity retrieval with designed degradation.
//!
//! The retriever never surfaces an error: when the collection is absent
//! or the query fails, it substitutes a single sentinel record so the
//! rest of the pipeline always has at least one document to work with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::RagConfig;
use crate::errors::RagError;
use crate::index::{Collection, DocumentStore};

/// Title given to documents whose metadata carries none.
pub const NO_TITLE: &str = "no title";

/// Title marking a sentinel record that stands in for a failed retrieval.
pub const SENTINEL_TITLE: &str = "error";

/// One retrieved document, immutable once constructed from a hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub content: String,
    pub title: String,
    /// Arbitrary string metadata. `date`, `location` and `damage_scale`
    /// are the keys the context builder recognizes.
    pub metadata: BTreeMap<String, String>,
}

impl DocumentRecord {
    /// Placeholder record standing in for "no usable result".
    pub fn sentinel(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            title: SENTINEL_TITLE.to_string(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.title == SENTINEL_TITLE
    }
}

/// A validated query: non-empty text plus an advisory result count.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub result_count: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Result<Self, RagError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RagError::Config("query text must not be empty".to_string()));
        }
        Ok(Self {
            text,
            result_count: RagConfig::default().result_count,
        })
    }

    pub fn with_result_count(mut self, result_count: usize) -> Self {
        self.result_count = result_count.max(1);
        self
    }
}

#[derive(Clone)]
pub struct Retriever {
    store: DocumentStore,
}

impl Retriever {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Fetch the `n` most similar documents, preserving the index's
    /// similarity order. Always returns at least one record: failures
    /// are mapped to a sentinel instead of propagated, because the
    /// caller must have something to build a context from.
    pub async fn retrieve(
        &self,
        query: &str,
        collection: Option<&Collection>,
        n: usize,
    ) -> Vec<DocumentRecord> {
        let Some(collection) = collection else {
            return vec![DocumentRecord::sentinel(
                "The collection could not be loaded. Check the collection name.",
            )];
        };

        match self.store.search(collection, query, n).await {
            Ok(hits) => {
                let documents = hits.documents.into_iter().next().unwrap_or_default();
                let mut metadatas = hits.metadatas.into_iter().next().unwrap_or_default();
                // Engines pad or omit trailing metadata entries; keep lengths aligned.
                metadatas.resize(documents.len(), BTreeMap::new());

                tracing::debug!(
                    "retrieved {} documents from '{}'",
                    documents.len(),
                    collection.name()
                );

                documents
                    .into_iter()
                    .zip(metadatas)
                    .map(|(content, metadata)| DocumentRecord {
                        title: metadata
                            .get("title")
                            .cloned()
                            .unwrap_or_else(|| NO_TITLE.to_string()),
                        content,
                        metadata,
                    })
                    .collect()
            }
            Err(err) => {
                tracing::warn!("search failed on '{}': {}", collection.name(), err);
                vec![DocumentRecord::sentinel(format!(
                    "An error occurred during search: {}",
                    err
                ))]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::index::{CollectionHandle, QueryHits, VectorIndex};

    struct ScriptedIndex {
        hits: QueryHits,
        fail_query: bool,
    }

    #[async_trait]
    impl VectorIndex for ScriptedIndex {
        async fn open_collection(&self, name: &str) -> Result<CollectionHandle, RagError> {
            Ok(CollectionHandle::new(name))
        }

        async fn query(
            &self,
            _handle: &CollectionHandle,
            _text: &str,
            _n: usize,
        ) -> Result<QueryHits, RagError> {
            if self.fail_query {
                Err(RagError::Retrieval("index timed out".to_string()))
            } else {
                Ok(self.hits.clone())
            }
        }

        async fn count(&self, _handle: &CollectionHandle) -> Result<usize, RagError> {
            Ok(self.hits.documents.first().map_or(0, Vec::len))
        }

        async fn list_collections(&self) -> Result<Vec<String>, RagError> {
            Ok(vec![])
        }
    }

    fn meta(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    async fn retriever_with(hits: QueryHits, fail_query: bool) -> (Retriever, Collection) {
        let store = DocumentStore::new(Arc::new(ScriptedIndex { hits, fail_query }));
        let collection = store.open("reports").await.unwrap();
        (Retriever::new(store), collection)
    }

    #[tokio::test]
    async fn maps_hits_in_order_with_title_default() {
        let hits = QueryHits {
            documents: vec![vec!["first".to_string(), "second".to_string()]],
            metadatas: vec![vec![
                meta(&[("title", "Fire report"), ("date", "2025-03-23")]),
                BTreeMap::new(),
            ]],
        };
        let (retriever, collection) = retriever_with(hits, false).await;

        let records = retriever.retrieve("fire", Some(&collection), 3).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Fire report");
        assert_eq!(records[0].content, "first");
        assert_eq!(records[0].metadata.get("date").unwrap(), "2025-03-23");
        assert_eq!(records[1].title, NO_TITLE);
        assert!(!records[0].is_sentinel());
    }

    #[tokio::test]
    async fn missing_collection_yields_single_sentinel() {
        let (retriever, _collection) = retriever_with(QueryHits::default(), false).await;

        let records = retriever.retrieve("fire", None, 3).await;
        assert_eq!(records.len(), 1);
        assert!(records[0].is_sentinel());
        assert_eq!(records[0].title, SENTINEL_TITLE);
        assert!(records[0].content.contains("collection"));
    }

    #[tokio::test]
    async fn query_failure_yields_sentinel_carrying_error_text() {
        let (retriever, collection) = retriever_with(QueryHits::default(), true).await;

        let records = retriever.retrieve("fire", Some(&collection), 3).await;
        assert_eq!(records.len(), 1);
        assert!(records[0].is_sentinel());
        assert!(records[0].content.contains("index timed out"));
    }

    #[tokio::test]
    async fn fewer_hits_than_requested_is_valid() {
        let hits = QueryHits {
            documents: vec![vec!["only one".to_string()]],
            metadatas: vec![vec![BTreeMap::new()]],
        };
        let (retriever, collection) = retriever_with(hits, false).await;

        let records = retriever.retrieve("fire", Some(&collection), 5).await;
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn search_query_rejects_empty_text() {
        assert!(SearchQuery::new("  ").is_err());
        let query = SearchQuery::new("what started the fire?").unwrap();
        assert_eq!(query.result_count, 3);
        assert_eq!(query.with_result_count(0).result_count, 1);
    }
}
