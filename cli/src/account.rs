use anyhow::{Context, Result};
use larder_core::account::{AccountClient, AccountRequest, AccountResponse};

pub async fn login(base_url: &str, email: &str, password: &str) -> Result<()> {
    let client = AccountClient::new(base_url)?;
    let response = client
        .login(email, password)
        .await
        .context("Login request failed")?;
    report(response)
}

pub async fn register(
    base_url: &str,
    email: String,
    password: String,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<()> {
    let client = AccountClient::new(base_url)?;
    let request = AccountRequest {
        email,
        password,
        first_name,
        last_name,
    };
    let response = client
        .register(&request)
        .await
        .context("Registration request failed")?;
    report(response)
}

fn report(response: AccountResponse) -> Result<()> {
    if response.ok {
        println!("{}", response.message);
        Ok(())
    } else {
        anyhow::bail!("{}", response.message)
    }
}
