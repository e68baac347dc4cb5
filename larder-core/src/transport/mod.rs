//! Transports carrying a rendered prompt to a generation backend.
//!
//! Two implementations exist: [`ModelTransport`] calls a model client with the output schema
//! enforced server-side, and [`RemoteTransport`] POSTs the raw input to a remote generation
//! service. Callers hold an `Arc<dyn GenerationTransport>` and never branch on which one it is.

mod model;
mod remote;

pub use model::ModelTransport;
pub use remote::RemoteTransport;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::ai::{self, AiError};
use crate::config::{ConfigError, LarderConfig, TransportKind};
use crate::prompts::{ASK_ABOUT_RECIPE_PROMPT_NAME, GENERATE_RECIPE_PROMPT_NAME};

/// Path of the recipe generation endpoint on the remote service.
pub const GENERATE_RECIPE_PATH: &str = "/generate-recipe";

/// Path of the answer endpoint on the remote service.
pub const ASK_ABOUT_RECIPE_PATH: &str = "/ask-about-recipe";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Model request failed: {0}")]
    Model(#[from] AiError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Which call is being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Generate,
    Answer,
}

impl PromptKind {
    pub fn prompt_name(&self) -> &'static str {
        match self {
            PromptKind::Generate => GENERATE_RECIPE_PROMPT_NAME,
            PromptKind::Answer => ASK_ABOUT_RECIPE_PROMPT_NAME,
        }
    }

    /// Endpoint path on the remote service.
    pub fn path(&self) -> &'static str {
        match self {
            PromptKind::Generate => GENERATE_RECIPE_PATH,
            PromptKind::Answer => ASK_ABOUT_RECIPE_PATH,
        }
    }
}

/// One request to a backend. Each transport uses the parts it needs.
#[derive(Debug, Clone)]
pub struct GenerationCall {
    pub kind: PromptKind,
    /// Rendered prompt text.
    pub prompt: String,
    /// Validated input payload, in its wire (camelCase) form.
    pub input: Value,
    /// JSON schema the output must satisfy.
    pub output_schema: Value,
}

/// A backend that turns a [`GenerationCall`] into raw JSON.
///
/// Returns `Value::Null` when the backend answered but produced no content. Schema
/// validation of the returned value is the caller's job.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn send(&self, call: &GenerationCall) -> Result<Value, TransportError>;

    /// Short name for logs ("model", "remote").
    fn name(&self) -> &'static str;
}

/// Build the transport selected by `config.transport`.
pub fn create_transport(
    config: &LarderConfig,
) -> Result<Arc<dyn GenerationTransport>, ConfigError> {
    match config.transport {
        TransportKind::Model => {
            let ai_config = config
                .ai
                .clone()
                .ok_or_else(|| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;
            Ok(Arc::new(ModelTransport::new(
                ai::create_client(ai_config),
                config.timeout,
            )))
        }
        TransportKind::Remote => {
            let transport = RemoteTransport::new(&config.remote_url, config.timeout).map_err(
                |e| ConfigError::Invalid {
                    var: "LARDER_REMOTE_URL".to_string(),
                    message: e.to_string(),
                },
            )?;
            Ok(Arc::new(transport))
        }
    }
}

/// Parse a JSON body, tolerating a Markdown code fence around it.
pub(crate) fn parse_json_body(body: &str) -> Result<Value, TransportError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(unfenced.trim()).map_err(|e| TransportError::MalformedBody(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_body() {
        assert_eq!(parse_json_body(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
        assert_eq!(
            parse_json_body("```json\n{\"a\": 1}\n```").unwrap(),
            json!({"a": 1})
        );
        assert_eq!(parse_json_body("  ").unwrap(), Value::Null);
        assert!(matches!(
            parse_json_body("Here is your recipe!"),
            Err(TransportError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_prompt_kind_paths() {
        assert_eq!(PromptKind::Generate.path(), "/generate-recipe");
        assert_eq!(PromptKind::Answer.path(), "/ask-about-recipe");
        assert_eq!(PromptKind::Answer.prompt_name(), "ask_about_recipe");
    }
}
