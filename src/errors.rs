use thiserror::Error;

/// Failure taxonomy for the RAG pipeline.
///
/// None of these cross the orchestrator boundary: the first two are
/// converted to sentinel documents by the retriever, the latter two to
/// user-visible text by the answer generator.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("collection not found: {0}")]
    StoreUnavailable(String),
    #[error("retrieval failed: {0}")]
    Retrieval(String),
    #[error("credential rejected: {0}")]
    Auth(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RagError {
    pub fn retrieval<E: std::fmt::Display>(err: E) -> Self {
        RagError::Retrieval(err.to_string())
    }

    pub fn generation<E: std::fmt::Display>(err: E) -> Self {
        RagError::Generation(err.to_string())
    }
}
