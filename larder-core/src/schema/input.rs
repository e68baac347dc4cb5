//! Input shapes: the ingredient form and the answer call.

use serde_json::Value;

use super::{as_object, required_str, SchemaViolation};
use crate::types::{
    AnswerRequest, Ingredient, RawIngredient, RecipeGenerationRequest, DEFAULT_QUANTITY,
};

/// Maximum ingredient name length, in characters.
pub const MAX_NAME_CHARS: usize = 50;

/// Maximum quantity length, in characters.
pub const MAX_QUANTITY_CHARS: usize = 30;

pub(super) const NO_INGREDIENTS_REASON: &str = "must have at least one ingredient";

/// Filter blank ingredients, apply bounds and default quantities.
///
/// Field paths use the index in `raw`, so a violation points at what the user typed even
/// when earlier blank rows were dropped.
pub fn validate_ingredients(
    raw: &[RawIngredient],
) -> Result<RecipeGenerationRequest, SchemaViolation> {
    let mut ingredients = Vec::with_capacity(raw.len());

    for (index, item) in raw.iter().enumerate() {
        let name = item.name.trim();
        if name.is_empty() {
            continue;
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(SchemaViolation::new(
                format!("ingredients[{index}].name"),
                format!("must be at most {MAX_NAME_CHARS} characters"),
            ));
        }

        let quantity = item
            .quantity
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(DEFAULT_QUANTITY);
        if quantity.chars().count() > MAX_QUANTITY_CHARS {
            return Err(SchemaViolation::new(
                format!("ingredients[{index}].quantity"),
                format!("must be at most {MAX_QUANTITY_CHARS} characters"),
            ));
        }

        ingredients.push(Ingredient {
            name: name.to_string(),
            quantity: quantity.to_string(),
        });
    }

    if ingredients.is_empty() {
        return Err(SchemaViolation::new("ingredients", NO_INGREDIENTS_REASON));
    }

    Ok(RecipeGenerationRequest { ingredients })
}

/// Validate a JSON generation input `{ingredients: [{name, quantity?}]}`.
pub fn validate_generation_input(
    payload: &Value,
) -> Result<RecipeGenerationRequest, SchemaViolation> {
    let object = as_object(payload, "$")?;
    let items = match object.get("ingredients") {
        None | Some(Value::Null) => return Err(SchemaViolation::new("ingredients", "is required")),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(SchemaViolation::new("ingredients", "must be an array")),
    };

    let mut raw = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let entry = as_object(item, &format!("ingredients[{index}]"))?;

        let name = match entry.get("name") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(SchemaViolation::new(
                    format!("ingredients[{index}].name"),
                    "must be a string",
                ))
            }
        };
        let quantity = match entry.get("quantity") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(SchemaViolation::new(
                    format!("ingredients[{index}].quantity"),
                    "must be a string",
                ))
            }
        };

        raw.push(RawIngredient { name, quantity });
    }

    validate_ingredients(&raw)
}

/// Validate a JSON answer input `{recipeName, instructions, question}`.
pub fn validate_answer_input(payload: &Value) -> Result<AnswerRequest, SchemaViolation> {
    let object = as_object(payload, "$")?;

    let recipe_name = required_str(object, "recipeName", "recipeName")?.trim();
    if recipe_name.is_empty() {
        return Err(SchemaViolation::new("recipeName", "must not be blank"));
    }
    let instructions = required_str(object, "instructions", "instructions")?;
    let question = required_str(object, "question", "question")?;
    if question.trim().is_empty() {
        return Err(SchemaViolation::new("question", "must not be blank"));
    }

    Ok(AnswerRequest {
        recipe_name: recipe_name.to_string(),
        instructions: instructions.to_string(),
        question: question.to_string(),
    })
}
