//! Transport over HTTP to a remote generation service.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{parse_json_body, GenerationCall, GenerationTransport, TransportError};

/// POSTs the validated input to `{base_url}{path}` and expects output-shaped JSON back.
pub struct RemoteTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RemoteTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Http(e)
        }
    }
}

#[async_trait]
impl GenerationTransport for RemoteTransport {
    async fn send(&self, call: &GenerationCall) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, call.kind.path());
        tracing::debug!(url = %url, "POSTing to generation service");

        let response = self
            .client
            .post(&url)
            .json(&call.input)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Err(TransportError::MalformedBody("empty body".to_string()));
        }
        parse_json_body(&body)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
