//! Application configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::ai::AiConfig;
use crate::quota::DEFAULT_QUESTION_LIMIT;
use crate::schema::OutputForm;

/// Default base URL of the remote generation service.
pub const DEFAULT_REMOTE_URL: &str = "https://localhost:5000";

/// Default base URL of the account backend.
pub const DEFAULT_ACCOUNT_URL: &str = "https://ia-hackathon-backend.vercel.app";

/// Default transport timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {var}: {message}")]
    Invalid { var: String, message: String },
}

/// Which transport carries generation calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// Structured-output call through the model client.
    #[default]
    Model,
    /// HTTP POST to a remote generation service.
    Remote,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "model" => Ok(TransportKind::Model),
            "remote" => Ok(TransportKind::Remote),
            other => Err(ConfigError::Invalid {
                var: "LARDER_TRANSPORT".to_string(),
                message: format!("unknown transport: {other}"),
            }),
        }
    }
}

/// Everything needed to build an invoker and sessions.
#[derive(Debug, Clone)]
pub struct LarderConfig {
    pub transport: TransportKind,
    /// Model client settings. Only loaded for the model transport.
    pub ai: Option<AiConfig>,
    pub remote_url: String,
    pub timeout: Duration,
    pub output_form: OutputForm,
    pub question_limit: usize,
    pub account_url: String,
}

impl LarderConfig {
    /// Load configuration from environment variables.
    ///
    /// - `LARDER_TRANSPORT`: "model" (default) or "remote"
    /// - `LARDER_REMOTE_URL`: remote service base URL (default: "https://localhost:5000")
    /// - `LARDER_TIMEOUT_SECS`: transport timeout (default: 60)
    /// - `LARDER_OUTPUT_FORM`: "long" (default) or "short"
    /// - `LARDER_QUESTION_LIMIT`: free questions per recipe (default: 5)
    /// - `LARDER_ACCOUNT_URL`: account backend base URL
    ///
    /// Model transport settings are read by [`AiConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let transport = match env::var("LARDER_TRANSPORT") {
            Ok(value) => value.parse()?,
            Err(_) => TransportKind::default(),
        };
        Self::from_env_with_transport(transport)
    }

    /// Like [`LarderConfig::from_env`] with the transport chosen by the caller.
    pub fn from_env_with_transport(transport: TransportKind) -> Result<Self, ConfigError> {
        let ai = match transport {
            TransportKind::Model => Some(AiConfig::from_env()?),
            TransportKind::Remote => None,
        };

        let remote_url =
            env::var("LARDER_REMOTE_URL").unwrap_or_else(|_| DEFAULT_REMOTE_URL.to_string());

        let timeout = Duration::from_secs(parse_var("LARDER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?);

        let output_form = match env::var("LARDER_OUTPUT_FORM") {
            Ok(value) => value.parse().map_err(|message| ConfigError::Invalid {
                var: "LARDER_OUTPUT_FORM".to_string(),
                message,
            })?,
            Err(_) => OutputForm::default(),
        };

        let question_limit = parse_var("LARDER_QUESTION_LIMIT", DEFAULT_QUESTION_LIMIT)?;

        let account_url =
            env::var("LARDER_ACCOUNT_URL").unwrap_or_else(|_| DEFAULT_ACCOUNT_URL.to_string());

        Ok(Self {
            transport,
            ai,
            remote_url,
            timeout,
            output_form,
            question_limit,
            account_url,
        })
    }
}

fn parse_var<T: FromStr>(var: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: var.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kind_from_str() {
        assert_eq!("model".parse::<TransportKind>().unwrap(), TransportKind::Model);
        assert_eq!("Remote".parse::<TransportKind>().unwrap(), TransportKind::Remote);
        let err = "carrier-pigeon".parse::<TransportKind>().unwrap_err();
        assert!(err.to_string().contains("LARDER_TRANSPORT"));
    }
}
