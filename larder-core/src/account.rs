//! Client for the account backend (`/login`, `/register`).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Account backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Body sent to `/login` and `/register`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Reply from the account backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountResponse {
    #[serde(default)]
    pub message: String,
    #[serde(skip)]
    pub ok: bool,
}

pub struct AccountClient {
    client: reqwest::Client,
    base_url: String,
}

impl AccountClient {
    pub fn new(base_url: &str) -> Result<Self, AccountError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AccountResponse, AccountError> {
        let request = AccountRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: None,
            last_name: None,
        };
        self.post("/login", &request).await
    }

    pub async fn register(&self, request: &AccountRequest) -> Result<AccountResponse, AccountError> {
        self.post("/register", request).await
    }

    /// `ok` mirrors the HTTP status. Rejections that carry a `{message}` body come back as
    /// `ok: false` rather than an error.
    async fn post(
        &self,
        path: &str,
        request: &AccountRequest,
    ) -> Result<AccountResponse, AccountError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Calling account backend");

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<AccountResponse>(&body) {
            Ok(mut parsed) => {
                parsed.ok = status.is_success();
                Ok(parsed)
            }
            Err(_) => Err(AccountError::Status {
                status: status.as_u16(),
                body,
            }),
        }
    }
}
