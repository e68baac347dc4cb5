//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use larder_core::transport::{GenerationCall, GenerationTransport, TransportError};
use larder_core::{GenerationInvoker, OutputForm, RecipeGenerationResult};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Transport returning a fixed value and remembering every call.
pub struct StaticTransport {
    response: Value,
    pub calls: Mutex<Vec<GenerationCall>>,
}

impl StaticTransport {
    pub fn new(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> String {
        self.calls.lock().unwrap().last().unwrap().prompt.clone()
    }
}

#[async_trait]
impl GenerationTransport for StaticTransport {
    async fn send(&self, call: &GenerationCall) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(call.clone());
        Ok(self.response.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Transport that always fails.
pub struct FailingTransport;

#[async_trait]
impl GenerationTransport for FailingTransport {
    async fn send(&self, _call: &GenerationCall) -> Result<Value, TransportError> {
        Err(TransportError::Status {
            status: 503,
            body: "upstream unavailable".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Transport that never answers within a test's patience.
pub struct StalledTransport;

#[async_trait]
impl GenerationTransport for StalledTransport {
    async fn send(&self, _call: &GenerationCall) -> Result<Value, TransportError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(json!({"answer": "too late"}))
    }

    fn name(&self) -> &'static str {
        "stalled"
    }
}

pub fn invoker(transport: Arc<dyn GenerationTransport>) -> GenerationInvoker {
    GenerationInvoker::new(transport, OutputForm::Long)
}

pub fn long_form_recipe() -> Value {
    json!({
        "recipeName": "Spinach Frittata",
        "ingredients": ["2 eggs", "1 cup spinach"],
        "instructions": ["Whisk the eggs.", "Add spinach.", "Bake for 15 minutes."],
        "recommendations": ["Serve with a green salad."]
    })
}

pub fn recipe() -> RecipeGenerationResult {
    RecipeGenerationResult {
        recipe_name: "Spinach Frittata".to_string(),
        ingredients: vec!["2 eggs".to_string(), "1 cup spinach".to_string()],
        instructions: vec![
            "Whisk the eggs.".to_string(),
            "Add spinach.".to_string(),
            "Bake for 15 minutes.".to_string(),
        ],
        recommendations: vec!["Serve with a green salad.".to_string()],
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_server(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
