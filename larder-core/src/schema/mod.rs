//! Structural validation for everything that crosses the model boundary.
//!
//! Each shape has a dedicated validator returning a typed value or a [`SchemaViolation`]
//! naming the offending field. Validation is structural only: presence, JSON type and
//! length bounds. Whether a recipe makes culinary sense is not checked.

mod input;
mod output;

pub use input::{
    validate_answer_input, validate_generation_input, validate_ingredients, MAX_NAME_CHARS,
    MAX_QUANTITY_CHARS,
};
pub use output::{
    answer_json_schema, is_empty_answer, is_empty_recipe, recipe_json_schema,
    split_instruction_steps, validate_answer, validate_recipe, OutputForm, RecipeOutput,
    ShortFormRecipe,
};

use serde_json::Value;
use thiserror::Error;

use crate::types::{AnswerRequest, RecipeGenerationRequest};

/// A payload did not match its shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {reason}")]
pub struct SchemaViolation {
    /// Path of the offending field, e.g. `ingredients[2].name`. `$` is the payload root.
    pub field: String,
    /// The constraint that was violated, e.g. `must be a string`.
    pub reason: String,
}

impl SchemaViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for the violation raised when every ingredient name was blank.
    pub fn is_missing_ingredients(&self) -> bool {
        self.field == "ingredients" && self.reason == input::NO_INGREDIENTS_REASON
    }
}

/// Named structural contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    GenerationInput,
    AnswerInput,
    RecipeOutput,
    AnswerOutput,
}

/// A payload that passed validation, tagged by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated {
    GenerationInput(RecipeGenerationRequest),
    AnswerInput(AnswerRequest),
    Recipe(RecipeOutput),
    Answer(String),
}

/// Validate `payload` against `shape`.
pub fn validate(shape: Shape, payload: &Value) -> Result<Validated, SchemaViolation> {
    match shape {
        Shape::GenerationInput => validate_generation_input(payload).map(Validated::GenerationInput),
        Shape::AnswerInput => validate_answer_input(payload).map(Validated::AnswerInput),
        Shape::RecipeOutput => validate_recipe(payload).map(Validated::Recipe),
        Shape::AnswerOutput => validate_answer(payload).map(Validated::Answer),
    }
}

/// Fetch a required string field, reporting `field` on absence or type mismatch.
pub(crate) fn required_str<'a>(
    object: &'a serde_json::Map<String, Value>,
    key: &str,
    field: &str,
) -> Result<&'a str, SchemaViolation> {
    match object.get(key) {
        None | Some(Value::Null) => Err(SchemaViolation::new(field, "is required")),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(SchemaViolation::new(field, "must be a string")),
    }
}

pub(crate) fn as_object<'a>(
    payload: &'a Value,
    field: &str,
) -> Result<&'a serde_json::Map<String, Value>, SchemaViolation> {
    payload
        .as_object()
        .ok_or_else(|| SchemaViolation::new(field, "must be an object"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_dispatches_by_shape() {
        let answer = validate(Shape::AnswerOutput, &json!({"answer": "Yes"})).unwrap();
        assert_eq!(answer, Validated::Answer("Yes".to_string()));

        let err = validate(Shape::GenerationInput, &json!({"ingredients": []})).unwrap_err();
        assert!(err.is_missing_ingredients());
    }

    #[test]
    fn test_violation_display_names_field() {
        let err = SchemaViolation::new("ingredients[0].name", "must be a string");
        assert_eq!(err.to_string(), "ingredients[0].name must be a string");
    }
}
