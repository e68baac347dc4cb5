//! Generation invoker: validate, render, dispatch, validate again.

use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ConfigError, LarderConfig};
use crate::prompts::{render, PromptBindings};
use crate::schema::{
    answer_json_schema, is_empty_answer, is_empty_recipe, recipe_json_schema, validate_answer,
    validate_answer_input, validate_ingredients, validate_recipe, OutputForm, SchemaViolation,
};
use crate::transport::{
    create_transport, GenerationCall, GenerationTransport, PromptKind, TransportError,
};
use crate::types::{AnswerRequest, RawIngredient, RecipeGenerationRequest, RecipeGenerationResult};

/// Shown when recipe generation fails for any reason other than bad input.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate recipe. Please try again.";

/// Shown when every submitted ingredient name was blank.
pub const NO_INGREDIENTS_MESSAGE: &str = "Please add at least one ingredient.";

/// Shown for any other input violation.
pub const INVALID_INPUT_MESSAGE: &str = "Please check your ingredients and try again.";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Invalid input: {0}")]
    InvalidInput(SchemaViolation),

    #[error("Response did not match the output schema: {0}")]
    OutputSchemaViolation(SchemaViolation),

    #[error("The model produced no usable output")]
    EmptyGeneration,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl GenerationError {
    /// Message suitable for showing to the person who submitted the request.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::InvalidInput(violation) if violation.is_missing_ingredients() => {
                NO_INGREDIENTS_MESSAGE
            }
            GenerationError::InvalidInput(_) => INVALID_INPUT_MESSAGE,
            _ => GENERATION_FAILED_MESSAGE,
        }
    }

    /// Whether submitting the same request again could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GenerationError::InvalidInput(_))
    }
}

/// Typed input to [`GenerationInvoker::invoke`].
#[derive(Debug, Clone)]
pub enum Bindings {
    Generate(Vec<RawIngredient>),
    Answer(AnswerRequest),
}

impl Bindings {
    pub fn kind(&self) -> PromptKind {
        match self {
            Bindings::Generate(_) => PromptKind::Generate,
            Bindings::Answer(_) => PromptKind::Answer,
        }
    }
}

/// Output of a successful [`GenerationInvoker::invoke`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedOutput {
    Recipe(RecipeGenerationResult),
    Answer(String),
}

/// Runs prompts through a transport and hands back schema-checked results.
#[derive(Clone)]
pub struct GenerationInvoker {
    transport: Arc<dyn GenerationTransport>,
    form: OutputForm,
}

impl GenerationInvoker {
    pub fn new(transport: Arc<dyn GenerationTransport>, form: OutputForm) -> Self {
        Self { transport, form }
    }

    /// Build the invoker with the transport selected by `config`.
    pub fn from_config(config: &LarderConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(create_transport(config)?, config.output_form))
    }

    pub fn output_form(&self) -> OutputForm {
        self.form
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    pub async fn invoke(&self, bindings: Bindings) -> Result<ValidatedOutput, GenerationError> {
        match bindings {
            Bindings::Generate(raw) => self.generate_recipe(&raw).await.map(ValidatedOutput::Recipe),
            Bindings::Answer(request) => self.answer(&request).await.map(ValidatedOutput::Answer),
        }
    }

    /// Validate raw form input and generate a recipe from it.
    pub async fn generate_recipe(
        &self,
        raw: &[RawIngredient],
    ) -> Result<RecipeGenerationResult, GenerationError> {
        let request = validate_ingredients(raw).map_err(GenerationError::InvalidInput)?;
        self.generate_from_request(&request).await
    }

    /// Generate a recipe from an already validated request.
    pub async fn generate_from_request(
        &self,
        request: &RecipeGenerationRequest,
    ) -> Result<RecipeGenerationResult, GenerationError> {
        let call = GenerationCall {
            kind: PromptKind::Generate,
            prompt: render(PromptBindings::Generate {
                request,
                form: self.form,
            }),
            input: json!({ "ingredients": request.ingredients() }),
            output_schema: recipe_json_schema(self.form),
        };

        let raw = self.dispatch(&call).await?;

        if is_empty_recipe(&raw) {
            tracing::warn!(transport = self.transport.name(), "Empty recipe generation");
            return Err(GenerationError::EmptyGeneration);
        }

        let output = validate_recipe(&raw).map_err(|violation| {
            tracing::warn!(
                transport = self.transport.name(),
                field = %violation.field,
                reason = %violation.reason,
                "Generated recipe failed schema validation"
            );
            GenerationError::OutputSchemaViolation(violation)
        })?;

        Ok(output.into_canonical(request))
    }

    /// Answer a question about a recipe.
    pub async fn answer(&self, request: &AnswerRequest) -> Result<String, GenerationError> {
        let input = json!({
            "recipeName": request.recipe_name,
            "instructions": request.instructions,
            "question": request.question,
        });
        let request = validate_answer_input(&input).map_err(GenerationError::InvalidInput)?;

        let call = GenerationCall {
            kind: PromptKind::Answer,
            prompt: render(PromptBindings::Answer(&request)),
            input,
            output_schema: answer_json_schema(),
        };

        let raw = self.dispatch(&call).await?;

        if is_empty_answer(&raw) {
            tracing::warn!(transport = self.transport.name(), "Empty answer generation");
            return Err(GenerationError::EmptyGeneration);
        }

        validate_answer(&raw).map_err(|violation| {
            tracing::warn!(
                transport = self.transport.name(),
                field = %violation.field,
                reason = %violation.reason,
                "Answer failed schema validation"
            );
            GenerationError::OutputSchemaViolation(violation)
        })
    }

    async fn dispatch(&self, call: &GenerationCall) -> Result<Value, GenerationError> {
        tracing::debug!(
            transport = self.transport.name(),
            prompt_name = call.kind.prompt_name(),
            prompt_len = call.prompt.len(),
            "Dispatching generation call"
        );

        self.transport.send(call).await.map_err(|e| {
            tracing::warn!(
                transport = self.transport.name(),
                prompt_name = call.kind.prompt_name(),
                error = %e,
                "Generation transport failed"
            );
            GenerationError::Transport(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FakeAiClient;
    use crate::transport::ModelTransport;
    use std::time::Duration;

    fn invoker(client: FakeAiClient, form: OutputForm) -> GenerationInvoker {
        let transport = ModelTransport::new(Arc::new(client), Duration::from_secs(5));
        GenerationInvoker::new(Arc::new(transport), form)
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_transport() {
        let client = Arc::new(FakeAiClient::new().with_default_response("{}"));
        let transport = ModelTransport::new(client.clone(), Duration::from_secs(5));
        let invoker = GenerationInvoker::new(Arc::new(transport), OutputForm::Long);

        let err = invoker
            .generate_recipe(&[RawIngredient::new("", Some("1 cup"))])
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::InvalidInput(_)));
        assert_eq!(err.user_message(), NO_INGREDIENTS_MESSAGE);
        assert!(!err.is_retryable());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_object_is_empty_generation() {
        let invoker = invoker(FakeAiClient::new().with_default_response("{}"), OutputForm::Long);
        let err = invoker
            .generate_recipe(&[RawIngredient::new("egg", Some("2"))])
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyGeneration));
        assert_eq!(err.user_message(), GENERATION_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_partial_recipe_is_schema_violation() {
        let invoker = invoker(
            FakeAiClient::new()
                .with_default_response(r#"{"recipeName": "Eggs", "instructions": ["Fry"]}"#),
            OutputForm::Long,
        );
        let err = invoker
            .generate_recipe(&[RawIngredient::new("egg", Some("2"))])
            .await
            .unwrap_err();
        let GenerationError::OutputSchemaViolation(violation) = err else {
            panic!("expected schema violation, got {err:?}");
        };
        assert_eq!(violation.field, "ingredients");
    }

    #[tokio::test]
    async fn test_short_form_is_adapted() {
        let invoker = invoker(
            FakeAiClient::new().with_default_response(
                r#"{"recipeName": "Egg Toast", "instructions": "1. Toast bread.\n2. Top with egg."}"#,
            ),
            OutputForm::Short,
        );
        let recipe = invoker
            .generate_recipe(&[RawIngredient::new("egg", Some("2"))])
            .await
            .unwrap();
        assert_eq!(recipe.ingredients, vec!["egg: 2"]);
        assert_eq!(recipe.instructions, vec!["Toast bread.", "Top with egg."]);
    }

    #[tokio::test]
    async fn test_invoke_answer() {
        let invoker = invoker(
            FakeAiClient::with_response("cooking assistant", r#"{"answer": "Use butter."}"#),
            OutputForm::Long,
        );
        let output = invoker
            .invoke(Bindings::Answer(AnswerRequest {
                recipe_name: "Eggs".to_string(),
                instructions: "1. Fry".to_string(),
                question: "Oil or butter?".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(output, ValidatedOutput::Answer("Use butter.".to_string()));
    }

    #[tokio::test]
    async fn test_blank_answer_is_empty_generation() {
        let invoker = invoker(
            FakeAiClient::new().with_default_response(r#"{"answer": ""}"#),
            OutputForm::Long,
        );
        let err = invoker
            .answer(&AnswerRequest {
                recipe_name: "Eggs".to_string(),
                instructions: "1. Fry".to_string(),
                question: "Why?".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyGeneration));
    }

    #[test]
    fn test_bindings_kind() {
        assert_eq!(Bindings::Generate(vec![]).kind(), PromptKind::Generate);
    }
}
