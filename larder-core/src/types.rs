use serde::{Deserialize, Serialize};

use crate::schema::{validate_ingredients, SchemaViolation};

/// Quantity used when the user leaves the quantity field empty.
pub const DEFAULT_QUANTITY: &str = "some";

/// An ingredient as submitted by the user, before validation.
///
/// Blank names are allowed here; they are filtered out when the request is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIngredient {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

impl RawIngredient {
    pub fn new(name: impl Into<String>, quantity: Option<&str>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.map(str::to_string),
        }
    }

    /// Parse the CLI shorthand `name:quantity` (quantity optional).
    pub fn parse_shorthand(input: &str) -> Self {
        match input.split_once(':') {
            Some((name, quantity)) => Self::new(name.trim(), Some(quantity.trim())),
            None => Self::new(input.trim(), None),
        }
    }
}

/// A validated ingredient: trimmed, non-blank name and a quantity that is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: String,
}

/// Validated input to recipe generation. Always holds at least one ingredient.
///
/// Deserializing goes through [`validate_ingredients`], so a request read from JSON obeys
/// the same rules as one built from form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGenerationInput")]
pub struct RecipeGenerationRequest {
    pub(crate) ingredients: Vec<Ingredient>,
}

#[derive(Deserialize)]
struct RawGenerationInput {
    ingredients: Vec<RawIngredient>,
}

impl TryFrom<RawGenerationInput> for RecipeGenerationRequest {
    type Error = SchemaViolation;

    fn try_from(input: RawGenerationInput) -> Result<Self, Self::Error> {
        validate_ingredients(&input.ingredients)
    }
}

impl RecipeGenerationRequest {
    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }
}

/// A generated recipe in its canonical (long) form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeGenerationResult {
    pub recipe_name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub recommendations: Vec<String>,
}

impl RecipeGenerationResult {
    /// Instructions as a single numbered block, the form embedded in answer prompts.
    pub fn instructions_text(&self) -> String {
        self.instructions
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Input to the answer call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub recipe_name: String,
    pub instructions: String,
    pub question: String,
}

impl AnswerRequest {
    pub fn for_recipe(recipe: &RecipeGenerationResult, question: impl Into<String>) -> Self {
        Self {
            recipe_name: recipe.recipe_name.clone(),
            instructions: recipe.instructions_text(),
            question: question.into(),
        }
    }
}

/// Who said a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One entry in a conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}
