//! AI client module for LLM integration via OpenRouter.
//!
//! This module provides:
//! - `AiClient` trait for abstracting AI providers
//! - `OpenRouterClient`, the network implementation (structured output, rate limiting)
//! - `FakeAiClient`, a scripted implementation for tests and offline runs
//! - Configuration via environment variables
//!
//! # Example
//!
//! ```ignore
//! use larder_core::ai::{AiClient, AiConfig, ChatMessage, ChatRequest, OpenRouterClient};
//!
//! let client = OpenRouterClient::new(AiConfig::from_env()?);
//!
//! let request = ChatRequest {
//!     messages: vec![ChatMessage::user("Hello!")],
//!     ..Default::default()
//! };
//!
//! let response = client.complete("test", request).await?;
//! println!("Response: {}", response.content);
//! ```

mod client;
mod config;
mod fake;
mod types;

pub use client::{AiClient, AiError, OpenRouterClient};
pub use config::{AiConfig, AiProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use fake::FakeAiClient;
pub use types::{ChatMessage, ChatRequest, ChatResponse, ResponseSchema, Role, Usage};

use std::sync::Arc;

/// Build the client selected by `config.provider`.
pub fn create_client(config: AiConfig) -> Arc<dyn AiClient> {
    match config.provider {
        AiProvider::OpenRouter => Arc::new(OpenRouterClient::new(config)),
        AiProvider::Fake => Arc::new(FakeAiClient::with_kitchen_responses()),
    }
}
