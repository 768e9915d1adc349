//! Emberline: retrieval-augmented question answering over a fixed
//! corpus of disaster documents.
//!
//! A question goes through four stages: similarity retrieval from a
//! vector index, context assembly under a per-document size cap,
//! prompt composition with the domain instructions, and answer
//! generation — LLM-backed when an API key is supplied, an excerpt
//! fallback otherwise. Every stage degrades to text instead of
//! erroring, so [`ChatOrchestrator::answer`] always returns something
//! displayable.
//!
//! The front end, the vector index engine, and the LLM provider are
//! collaborators: the last two are reached through the [`VectorIndex`]
//! and [`ChatCompletionApi`] traits, the first consumes this crate.

pub mod chat;
pub mod config;
pub mod context;
pub mod errors;
pub mod generate;
pub mod index;
pub mod logging;
pub mod prompt;
pub mod retrieve;

pub use chat::{ChatOrchestrator, ChatTranscript, Role, TranscriptMessage};
pub use config::RagConfig;
pub use context::ContextBuilder;
pub use errors::RagError;
pub use generate::{AnswerGenerator, ChatCompletionApi, GenerationRequest, OpenAiClient};
pub use index::{Collection, CollectionHandle, DocumentStore, QueryHits, VectorIndex};
pub use prompt::{Prompt, PromptComposer, EXAMPLE_QUESTIONS};
pub use retrieve::{DocumentRecord, Retriever, SearchQuery};
