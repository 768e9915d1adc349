//! Top-level orchestration and the session transcript type.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::RagConfig;
use crate::context::ContextBuilder;
use crate::generate::{AnswerGenerator, ChatCompletionApi, NO_DATA_MSG};
use crate::index::{Collection, DocumentStore};
use crate::prompt::PromptComposer;
use crate::retrieve::{Retriever, SearchQuery};

/// Entry point of the pipeline: retrieve, build context, compose the
/// prompt, generate. Every caller (free-text input, example-question
/// buttons) goes through [`ChatOrchestrator::answer`].
#[derive(Clone)]
pub struct ChatOrchestrator {
    retriever: Retriever,
    context: ContextBuilder,
    composer: PromptComposer,
    generator: AnswerGenerator,
    config: RagConfig,
}

impl ChatOrchestrator {
    pub fn new(store: DocumentStore, api: Arc<dyn ChatCompletionApi>, config: RagConfig) -> Self {
        Self {
            retriever: Retriever::new(store),
            context: ContextBuilder::from_config(&config),
            composer: PromptComposer::new(),
            generator: AnswerGenerator::new(api, config.clone()),
            config,
        }
    }

    /// Answer one question. Always returns display-ready text, no
    /// matter which collaborator is degraded; there are no retries at
    /// this layer. A blank question skips retrieval entirely.
    pub async fn answer(
        &self,
        query: &str,
        collection: Option<&Collection>,
        api_key: Option<&str>,
    ) -> String {
        match SearchQuery::new(query) {
            Ok(query) => {
                self.answer_query(
                    &query.with_result_count(self.config.result_count),
                    collection,
                    api_key,
                )
                .await
            }
            Err(err) => {
                tracing::debug!("rejected query: {}", err);
                NO_DATA_MSG.to_string()
            }
        }
    }

    pub async fn answer_query(
        &self,
        query: &SearchQuery,
        collection: Option<&Collection>,
        api_key: Option<&str>,
    ) -> String {
        let documents = self
            .retriever
            .retrieve(&query.text, collection, query.result_count)
            .await;
        let context = self.context.build(&documents);
        let prompt = self.composer.compose(&query.text, &context);

        self.generator
            .answer(&query.text, &documents, &prompt, api_key)
            .await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub content: String,
}

/// Append-only record of one chat session, owned by the front end.
/// Serializable so the UI layer can persist and replay it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatTranscript {
    messages: Vec<TranscriptMessage>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(TranscriptMessage {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(TranscriptMessage {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    pub fn messages(&self) -> &[TranscriptMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Wipe the session, the front end's "reset history" action.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_appends_in_order_and_clears() {
        let mut transcript = ChatTranscript::new();
        transcript.push_user("What caused the fire?");
        transcript.push_assistant("Dry winds and a downed power line.");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].role, Role::User);
        assert_eq!(transcript.messages()[1].role, Role::Assistant);

        transcript.clear();
        assert!(transcript.is_empty());
    }

    #[test]
    fn transcript_roles_serialize_lowercase() {
        let mut transcript = ChatTranscript::new();
        transcript.push_user("hi");

        let json = serde_json::to_string(&transcript).unwrap();
        assert!(json.contains("\"role\":\"user\""));
    }
}
