//! Answer generation: the LLM-backed strategy and the no-key fallback.
//!
//! Every failure path here ends in a display string. The orchestrator
//! and its caller never see a generation error as an error value.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::RagConfig;
use crate::context::truncate_chars;
use crate::errors::RagError;
use crate::prompt::Prompt;
use crate::retrieve::DocumentRecord;

/// Returned when `generate` is invoked without a key.
pub const NO_API_KEY_MSG: &str =
    "No OpenAI API key is configured. Enter an API key to enable analysis.";

/// Returned when the provider rejects the credential.
pub const AUTH_FAILED_MSG: &str =
    "OpenAI API key verification failed. Please check your API key.";

/// Returned by the fallback when only the retrieval-error sentinel came back.
pub const NO_DATA_MSG: &str = "No relevant data could be found.";

/// Closing line of every fallback answer.
pub const FALLBACK_FOOTER: &str = "Enter an OpenAI API key for a more detailed analysis.";

/// One complete generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Narrow seam to the external generation service.
///
/// Implementations surface every failure as a single error-text string:
/// `RagError::Auth` when the provider gives a structured credential
/// rejection, `RagError::Generation` for everything else. Final
/// classification happens above, in [`AnswerGenerator::generate`].
#[async_trait]
pub trait ChatCompletionApi: Send + Sync {
    async fn chat(&self, request: GenerationRequest, api_key: &str) -> Result<String, RagError>;
}

/// OpenAI-compatible `/v1/chat/completions` client.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    client: Client,
}

impl OpenAiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.api_base.clone())
    }
}

#[async_trait]
impl ChatCompletionApi for OpenAiClient {
    async fn chat(&self, request: GenerationRequest, api_key: &str) -> Result<String, RagError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let res = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(RagError::generation)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let message = format!("{}: {}", status, text);
            // 401/403 are structured enough to skip the text heuristic.
            return Err(if status.as_u16() == 401 || status.as_u16() == 403 {
                RagError::Auth(message)
            } else {
                RagError::Generation(message)
            });
        }

        let payload: Value = res.json().await.map_err(RagError::generation)?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(content)
    }
}

/// Best-effort credential-failure sniffing on provider error text.
///
/// Providers word auth failures inconsistently, so this matches loosely
/// and can misclassify; implementations with structured error codes
/// should pre-map them into text this recognizes.
pub fn is_auth_error(text: &str) -> bool {
    let lowered = text.to_lowercase();
    lowered.contains("auth") || lowered.contains("api key")
}

/// Produces the final answer text, choosing between the LLM strategy
/// and the excerpt fallback per call.
#[derive(Clone)]
pub struct AnswerGenerator {
    api: Arc<dyn ChatCompletionApi>,
    config: RagConfig,
}

impl AnswerGenerator {
    pub fn new(api: Arc<dyn ChatCompletionApi>, config: RagConfig) -> Self {
        Self { api, config }
    }

    /// Strategy selection, re-evaluated on every call: a non-empty key
    /// routes to the LLM, anything else to the fallback.
    pub async fn answer(
        &self,
        query: &str,
        documents: &[DocumentRecord],
        prompt: &Prompt,
        api_key: Option<&str>,
    ) -> String {
        match api_key {
            Some(key) if !key.is_empty() => self.generate(prompt, key).await,
            _ => self.generate_simple(query, documents),
        }
    }

    /// LLM-backed strategy: one blocking call, failures mapped to text.
    pub async fn generate(&self, prompt: &Prompt, api_key: &str) -> String {
        if api_key.is_empty() {
            return NO_API_KEY_MSG.to_string();
        }

        let request = GenerationRequest {
            system: prompt.system.clone(),
            user: prompt.user.clone(),
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        match self.api.chat(request, api_key).await {
            Ok(answer) => answer,
            Err(RagError::Auth(text)) => {
                tracing::warn!("credential rejected: {}", text);
                AUTH_FAILED_MSG.to_string()
            }
            Err(err) => {
                let text = err.to_string();
                tracing::warn!("generation failed: {}", text);
                if is_auth_error(&text) {
                    AUTH_FAILED_MSG.to_string()
                } else {
                    format!("An error occurred during analysis: {}", text)
                }
            }
        }
    }

    /// Fallback strategy: titles plus short excerpts, no model call.
    pub fn generate_simple(&self, query: &str, documents: &[DocumentRecord]) -> String {
        if documents.is_empty() || (documents.len() == 1 && documents[0].is_sentinel()) {
            return NO_DATA_MSG.to_string();
        }

        let mut answer = format!("Search results for '{}':\n\n", query);

        for (i, document) in documents.iter().enumerate() {
            answer.push_str(&format!("**Document {}:** {}\n", i + 1, document.title));
            answer.push_str(&truncate_chars(&document.content, self.config.excerpt_chars));
            answer.push_str("\n\n");
        }

        answer.push_str(FALLBACK_FOOTER);
        answer
    }
}
