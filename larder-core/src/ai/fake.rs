//! Fake AI client for testing.
//!
//! Returns deterministic responses based on prompt matching, so the whole generation
//! pipeline can run without network access or API costs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use super::client::{AiClient, AiError};
use super::types::{ChatRequest, ChatResponse, Usage};

/// A fake AI client for testing.
///
/// Responses are matched by checking if the last message contains a registered substring.
/// If no match is found, returns the default response or an error.
#[derive(Debug, Default)]
pub struct FakeAiClient {
    /// Map of prompt substring -> response
    responses: RwLock<HashMap<String, String>>,
    /// Response when no pattern matches
    default_response: Option<String>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl FakeAiClient {
    /// Create a new FakeAiClient with no registered responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a FakeAiClient that returns `response` for prompts containing a substring.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let client = Self::new();
        client.add_response(prompt_contains, response);
        client
    }

    /// Add a response for prompts containing a specific substring.
    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(prompt_contains.to_string(), response.to_string());
    }

    /// Set the default response when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Canned responses for both prompts, used by `LARDER_AI_PROVIDER=fake`.
    pub fn with_kitchen_responses() -> Self {
        let client = Self::new();

        client.add_response(
            "professional chef",
            r#"{
                "recipeName": "Pantry Frittata",
                "ingredients": ["2 eggs", "1 handful spinach", "pinch of salt"],
                "instructions": [
                    "Whisk the eggs with the salt.",
                    "Wilt the spinach in a hot oiled pan.",
                    "Pour in the eggs and cook until just set."
                ],
                "recommendations": ["Serve warm with toast."]
            }"#,
        );

        client.add_response(
            "cooking assistant",
            r#"{"answer": "Absolutely. A little grated cheese folded in before cooking makes it extra rich."}"#,
        );

        client
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl AiClient for FakeAiClient {
    async fn complete(
        &self,
        _prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let prompt = request
            .messages
            .last()
            .map(|m| m.content.to_lowercase())
            .unwrap_or_default();
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(request);

        let matched = {
            let responses = self.responses.read().unwrap_or_else(|e| e.into_inner());
            responses
                .iter()
                .find(|(pattern, _)| prompt.contains(&pattern.to_lowercase()))
                .map(|(_, response)| response.clone())
        };

        match matched.or_else(|| self.default_response.clone()) {
            Some(content) => Ok(ChatResponse {
                content,
                usage: Usage::default(),
            }),
            None => Err(AiError::Api(format!(
                "FakeAiClient: no response configured for prompt (first 100 chars): {}",
                prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ChatMessage;

    fn request(prompt: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::user(prompt)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fake_client_matching() {
        let client = FakeAiClient::with_response("hello", "world");
        let result = client.complete("test", request("Say HELLO")).await.unwrap();
        assert_eq!(result.content, "world");
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_fake_client_no_match() {
        let client = FakeAiClient::new();
        let result = client.complete("test", request("random prompt")).await;
        assert!(result.is_err());
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_fake_client_default_response() {
        let client = FakeAiClient::new().with_default_response("default");
        let result = client.complete("test", request("random")).await.unwrap();
        assert_eq!(result.content, "default");
    }

    #[tokio::test]
    async fn test_records_last_request() {
        let client = FakeAiClient::new().with_default_response("{}");
        client.complete("test", request("first")).await.unwrap();
        client.complete("test", request("second")).await.unwrap();
        let last = client.last_request().unwrap();
        assert_eq!(last.messages[0].content, "second");
    }
}
