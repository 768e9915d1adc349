use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::RagError;

/// Collection opened when the caller does not name one.
pub const DEFAULT_COLLECTION: &str = "disaster_reports";

/// Pipeline settings.
///
/// Defaults carry the tuned values of the production pipeline; a TOML
/// file and `EMBERLINE_*` environment variables can override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Collection to open in the vector index.
    pub collection: String,
    /// Documents requested per query. Advisory: the store may return fewer.
    pub result_count: usize,
    /// Per-document content cap (in characters) in the assembled context.
    pub context_doc_chars: usize,
    /// Content excerpt cap (in characters) in the no-key fallback answer.
    pub excerpt_chars: usize,
    /// Generation model identifier.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Base URL of the OpenAI-compatible generation service.
    pub api_base: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            result_count: 3,
            context_doc_chars: 800,
            excerpt_chars: 100,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.5,
            max_tokens: 800,
            api_base: "https://api.openai.com".to_string(),
        }
    }
}

impl RagConfig {
    /// Load from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, RagError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| RagError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&raw)
            .map_err(|e| RagError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Apply `EMBERLINE_*` environment overrides on top of the current values.
    ///
    /// Unparseable numeric values are ignored rather than fatal, so a
    /// stray variable cannot take the assistant down.
    pub fn apply_env(mut self) -> Self {
        if let Ok(val) = env::var("EMBERLINE_COLLECTION") {
            if !val.is_empty() {
                self.collection = val;
            }
        }
        if let Ok(val) = env::var("EMBERLINE_MODEL") {
            if !val.is_empty() {
                self.model = val;
            }
        }
        if let Ok(val) = env::var("EMBERLINE_API_BASE") {
            if !val.is_empty() {
                self.api_base = val;
            }
        }
        if let Some(val) = parse_env("EMBERLINE_RESULT_COUNT") {
            self.result_count = val;
        }
        if let Some(val) = parse_env("EMBERLINE_CONTEXT_DOC_CHARS") {
            self.context_doc_chars = val;
        }
        if let Some(val) = parse_env("EMBERLINE_EXCERPT_CHARS") {
            self.excerpt_chars = val;
        }
        self
    }

    /// File config (when present) with env overrides, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, RagError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.apply_env())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.parse().ok())
}
