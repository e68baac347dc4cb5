//! HTTP service exposing the generation calls, compatible with [`crate::transport::RemoteTransport`].

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::generation::{GenerationError, GenerationInvoker};
use crate::schema::{validate_answer_input, validate_generation_input, SchemaViolation};
use crate::transport::{ASK_ABOUT_RECIPE_PATH, GENERATE_RECIPE_PATH};
use crate::types::RecipeGenerationResult;

type AppState = Arc<GenerationInvoker>;

/// Router serving `POST /generate-recipe` and `POST /ask-about-recipe`.
pub fn router(invoker: GenerationInvoker) -> Router {
    Router::new()
        .route(GENERATE_RECIPE_PATH, post(generate_recipe))
        .route(ASK_ABOUT_RECIPE_PATH, post(ask_about_recipe))
        .with_state(Arc::new(invoker))
}

/// Unreadable bodies are input violations on the payload root.
fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ServiceError> {
    body.map(|Json(payload)| payload).map_err(|rejection| {
        ServiceError(GenerationError::InvalidInput(SchemaViolation::new(
            "$",
            rejection.body_text(),
        )))
    })
}

async fn generate_recipe(
    State(invoker): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RecipeGenerationResult>, ServiceError> {
    let payload = json_body(body)?;
    let request = validate_generation_input(&payload).map_err(GenerationError::InvalidInput)?;
    let recipe = invoker.generate_from_request(&request).await?;
    Ok(Json(recipe))
}

async fn ask_about_recipe(
    State(invoker): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ServiceError> {
    let payload = json_body(body)?;
    let request = validate_answer_input(&payload).map_err(GenerationError::InvalidInput)?;
    let answer = invoker.answer(&request).await?;
    Ok(Json(json!({ "answer": answer })))
}

struct ServiceError(GenerationError);

impl From<GenerationError> for ServiceError {
    fn from(e: GenerationError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match &self.0 {
            GenerationError::InvalidInput(violation) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": self.0.user_message(),
                    "field": violation.field,
                    "reason": violation.reason,
                })),
            )
                .into_response(),
            other => {
                tracing::error!(error = %other, "Generation request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": other.user_message() })),
                )
                    .into_response()
            }
        }
    }
}
