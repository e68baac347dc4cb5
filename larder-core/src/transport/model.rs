//! Transport over a model client with server-side structured output.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use super::{parse_json_body, GenerationCall, GenerationTransport, PromptKind, TransportError};
use crate::ai::{AiClient, ChatMessage, ChatRequest, ResponseSchema};

pub struct ModelTransport {
    client: Arc<dyn AiClient>,
    timeout: Duration,
}

impl ModelTransport {
    pub fn new(client: Arc<dyn AiClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn chat_request(call: &GenerationCall) -> ChatRequest {
        let (max_tokens, temperature) = match call.kind {
            PromptKind::Generate => (2048, 0.9),
            PromptKind::Answer => (1024, 0.7),
        };

        ChatRequest {
            messages: vec![ChatMessage::user(call.prompt.clone())],
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
            response_schema: Some(ResponseSchema {
                name: call.kind.prompt_name().to_string(),
                schema: call.output_schema.clone(),
            }),
        }
    }
}

#[async_trait]
impl GenerationTransport for ModelTransport {
    async fn send(&self, call: &GenerationCall) -> Result<Value, TransportError> {
        let prompt_name = call.kind.prompt_name();
        let request = Self::chat_request(call);

        tracing::debug!(
            prompt_name,
            model = self.client.model_name(),
            "Sending prompt to model"
        );

        let response = tokio::time::timeout(self.timeout, self.client.complete(prompt_name, request))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))??;

        parse_json_body(&response.content)
    }

    fn name(&self) -> &'static str {
        "model"
    }
}
