//! Model client speaking the OpenAI chat API (OpenRouter by default).

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::config::AiConfig;
use super::types::{ChatMessage, ChatRequest, ChatResponse, Role, Usage};

#[derive(Error, Debug)]
pub enum AiError {
    #[error("API error: {0}")]
    Api(String),
}

/// A chat model that turns a prompt into text.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Run one completion. `prompt_name` only labels log events.
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError>;

    fn model_name(&self) -> &str;
}

/// Spaces calls at least `interval` apart.
struct Throttle {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(at) = *last_call {
            let since = at.elapsed();
            if since < self.interval {
                tokio::time::sleep(self.interval - since).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

pub struct OpenRouterClient {
    client: Client<OpenAIConfig>,
    model: String,
    throttle: Throttle,
}

impl OpenRouterClient {
    pub fn new(config: AiConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            throttle: Throttle::new(Duration::from_millis(config.rate_limit_ms)),
            model: config.model,
        }
    }
}

fn wire_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, AiError> {
    let built = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.as_str())
            .build()
            .map(Into::into),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.as_str())
            .build()
            .map(Into::into),
    };
    built.map_err(|e| AiError::Api(format!("Invalid {:?} message: {}", message.role, e)))
}

/// Translate a [`ChatRequest`] into the API's request body. A response schema becomes a
/// strict `json_schema` response format.
fn build_completion_request(
    model: &str,
    request: ChatRequest,
) -> Result<CreateChatCompletionRequest, AiError> {
    let messages = request
        .messages
        .iter()
        .map(wire_message)
        .collect::<Result<Vec<_>, _>>()?;

    let mut args = CreateChatCompletionRequestArgs::default();
    args.model(model).messages(messages);

    if let Some(max_tokens) = request.max_tokens {
        args.max_completion_tokens(max_tokens);
    }
    if let Some(temperature) = request.temperature {
        args.temperature(temperature);
    }
    if let Some(schema) = request.response_schema {
        args.response_format(ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: None,
                name: schema.name,
                schema: Some(schema.schema),
                strict: Some(true),
            },
        });
    }

    args.build().map_err(|e| AiError::Api(e.to_string()))
}

#[async_trait]
impl AiClient for OpenRouterClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        let body = build_completion_request(&self.model, request)?;
        self.throttle.wait().await;

        let started = Instant::now();
        let response = self
            .client
            .chat()
            .create(body)
            .await
            .map_err(|e| AiError::Api(e.to_string()))?;

        let usage = response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();
        tracing::debug!(
            prompt_name,
            model = %self.model,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model completion finished"
        );

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(ChatResponse { content, usage })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
