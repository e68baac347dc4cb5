//! AI configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::config::ConfigError;

/// Default OpenRouter base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model to use.
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";

/// Default rate limit between requests in milliseconds.
pub const DEFAULT_RATE_LIMIT_MS: u64 = 500;

/// Which model client backs the model transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiProvider {
    #[default]
    OpenRouter,
    /// Scripted client, no network. See [`super::FakeAiClient`].
    Fake,
}

impl FromStr for AiProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openrouter" => Ok(AiProvider::OpenRouter),
            "fake" => Ok(AiProvider::Fake),
            other => Err(ConfigError::Invalid {
                var: "LARDER_AI_PROVIDER".to_string(),
                message: format!("unknown provider: {other}"),
            }),
        }
    }
}

/// AI client configuration.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: AiProvider,
    /// API key for OpenRouter. Empty for the fake provider.
    pub api_key: String,
    /// Model name (e.g., "google/gemini-2.0-flash-001", "openai/gpt-4o-mini").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Milliseconds to wait between requests.
    pub rate_limit_ms: u64,
}

impl AiConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `LARDER_AI_PROVIDER`: "openrouter" (default) or "fake"
    /// - `LARDER_AI_MODEL`: Model name (default: "google/gemini-2.0-flash-001")
    /// - `LARDER_AI_BASE_URL`: API base URL (default: "https://openrouter.ai/api/v1")
    /// - `LARDER_AI_RATE_LIMIT_MS`: Rate limit in ms (default: 500)
    ///
    /// Required for the openrouter provider:
    /// - `OPENROUTER_API_KEY`
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = match env::var("LARDER_AI_PROVIDER") {
            Ok(value) => value.parse()?,
            Err(_) => AiProvider::default(),
        };

        let api_key = match provider {
            AiProvider::OpenRouter => env::var("OPENROUTER_API_KEY")
                .map_err(|_| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?,
            AiProvider::Fake => String::new(),
        };

        let model = env::var("LARDER_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let base_url =
            env::var("LARDER_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let rate_limit_ms = env::var("LARDER_AI_RATE_LIMIT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_MS);

        Ok(Self {
            provider,
            api_key,
            model,
            base_url,
            rate_limit_ms,
        })
    }
}
