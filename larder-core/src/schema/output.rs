//! Output shapes: generated recipes (long and short form) and chat answers.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

use super::{as_object, required_str, SchemaViolation};
use crate::types::{RecipeGenerationRequest, RecipeGenerationResult};

/// Which recipe shape the model is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputForm {
    /// `{recipeName, ingredients[], instructions[], recommendations[]}`
    #[default]
    Long,
    /// `{recipeName, instructions}` with free-text instructions.
    Short,
}

impl OutputForm {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputForm::Long => "long",
            OutputForm::Short => "short",
        }
    }
}

impl fmt::Display for OutputForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "long" => Ok(OutputForm::Long),
            "short" => Ok(OutputForm::Short),
            other => Err(format!("unknown output form: {other}")),
        }
    }
}

/// Legacy short-form recipe. Converted to the canonical form with [`ShortFormRecipe::into_canonical`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortFormRecipe {
    pub recipe_name: String,
    pub instructions: String,
}

impl ShortFormRecipe {
    /// Map onto the long form.
    ///
    /// The short form carries no ingredient list, so the request's ingredients are echoed as
    /// `name: quantity` lines. Recommendations are left empty.
    pub fn into_canonical(self, request: &RecipeGenerationRequest) -> RecipeGenerationResult {
        RecipeGenerationResult {
            recipe_name: self.recipe_name,
            ingredients: request
                .ingredients()
                .iter()
                .map(|i| format!("{}: {}", i.name, i.quantity))
                .collect(),
            instructions: split_instruction_steps(&self.instructions),
            recommendations: Vec::new(),
        }
    }
}

/// A recipe that passed validation, in whichever form the backend produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeOutput {
    Long(RecipeGenerationResult),
    Short(ShortFormRecipe),
}

impl RecipeOutput {
    pub fn into_canonical(self, request: &RecipeGenerationRequest) -> RecipeGenerationResult {
        match self {
            RecipeOutput::Long(recipe) => recipe,
            RecipeOutput::Short(short) => short.into_canonical(request),
        }
    }
}

/// True when the backend produced nothing usable for a recipe: no object, or neither a
/// name nor any instructions.
pub fn is_empty_recipe(payload: &Value) -> bool {
    let Some(object) = payload.as_object() else {
        return payload.is_null() || payload.as_str().is_some_and(|s| s.trim().is_empty());
    };

    let name_blank = match object.get("recipeName") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    };
    let instructions_blank = match object.get("instructions") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(steps)) => steps
            .iter()
            .all(|s| s.as_str().is_some_and(|s| s.trim().is_empty())),
        Some(_) => false,
    };

    name_blank && instructions_blank
}

/// True when an answer payload has no answer text at all.
pub fn is_empty_answer(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(object) => match object.get("answer") {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        },
        _ => false,
    }
}

/// Validate a generated recipe. String fields are trimmed and blank list entries dropped.
pub fn validate_recipe(payload: &Value) -> Result<RecipeOutput, SchemaViolation> {
    let object = as_object(payload, "$")?;

    let recipe_name = required_str(object, "recipeName", "recipeName")?.trim();
    if recipe_name.is_empty() {
        return Err(SchemaViolation::new("recipeName", "must not be blank"));
    }

    match object.get("instructions") {
        None | Some(Value::Null) => Err(SchemaViolation::new("instructions", "is required")),
        Some(Value::String(text)) => {
            if split_instruction_steps(text).is_empty() {
                return Err(SchemaViolation::new("instructions", "must not be blank"));
            }
            Ok(RecipeOutput::Short(ShortFormRecipe {
                recipe_name: recipe_name.to_string(),
                instructions: text.trim().to_string(),
            }))
        }
        Some(Value::Array(_)) => {
            let instructions = string_list(object, "instructions")?;
            if instructions.is_empty() {
                return Err(SchemaViolation::new(
                    "instructions",
                    "must contain at least one step",
                ));
            }
            Ok(RecipeOutput::Long(RecipeGenerationResult {
                recipe_name: recipe_name.to_string(),
                ingredients: string_list(object, "ingredients")?,
                instructions,
                recommendations: string_list(object, "recommendations")?,
            }))
        }
        Some(_) => Err(SchemaViolation::new(
            "instructions",
            "must be a string or an array of strings",
        )),
    }
}

/// Validate an answer payload `{answer}`.
pub fn validate_answer(payload: &Value) -> Result<String, SchemaViolation> {
    let object = as_object(payload, "$")?;
    let answer = required_str(object, "answer", "answer")?.trim();
    if answer.is_empty() {
        return Err(SchemaViolation::new("answer", "must not be blank"));
    }
    Ok(answer.to_string())
}

fn string_list(object: &Map<String, Value>, key: &str) -> Result<Vec<String>, SchemaViolation> {
    let items = match object.get(key) {
        None | Some(Value::Null) => return Err(SchemaViolation::new(key, "is required")),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(SchemaViolation::new(key, "must be an array of strings")),
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let text = item
            .as_str()
            .ok_or_else(|| SchemaViolation::new(format!("{key}[{index}]"), "must be a string"))?
            .trim();
        if !text.is_empty() {
            out.push(text.to_string());
        }
    }
    Ok(out)
}

/// Split free-text instructions into steps.
///
/// A step starts at every line beginning with `N.`, with the number stripped. Unnumbered
/// lines continue the current step. Text without any numbered line gives one step per
/// non-blank line.
pub fn split_instruction_steps(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if !lines.iter().any(|l| numbered_prefix_len(l).is_some()) {
        return lines.into_iter().map(str::to_string).collect();
    }

    let mut steps: Vec<String> = Vec::new();
    for line in lines {
        match numbered_prefix_len(line) {
            Some(len) => steps.push(line[len..].trim_start().to_string()),
            None => match steps.last_mut() {
                Some(step) => {
                    step.push(' ');
                    step.push_str(line);
                }
                None => steps.push(line.to_string()),
            },
        }
    }
    steps.retain(|s| !s.is_empty());
    steps
}

/// Byte length of a leading `123.` marker, if present. The dot must end the line or be
/// followed by whitespace, so decimals like `1.5 cups` are not markers.
fn numbered_prefix_len(line: &str) -> Option<usize> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    match rest.chars().next() {
        None => Some(digits + 1),
        Some(c) if c.is_whitespace() => Some(digits + 1),
        Some(_) => None,
    }
}

/// JSON schema sent with structured-output requests for recipes.
pub fn recipe_json_schema(form: OutputForm) -> Value {
    let string_array = json!({"type": "array", "items": {"type": "string"}});
    match form {
        OutputForm::Long => json!({
            "type": "object",
            "properties": {
                "recipeName": {"type": "string", "description": "The name of the generated recipe."},
                "ingredients": string_array,
                "instructions": string_array,
                "recommendations": string_array,
            },
            "required": ["recipeName", "ingredients", "instructions", "recommendations"],
            "additionalProperties": false,
        }),
        OutputForm::Short => json!({
            "type": "object",
            "properties": {
                "recipeName": {"type": "string", "description": "The name of the generated recipe."},
                "instructions": {"type": "string", "description": "The detailed instructions for preparing the recipe."},
            },
            "required": ["recipeName", "instructions"],
            "additionalProperties": false,
        }),
    }
}

/// JSON schema sent with structured-output requests for answers.
pub fn answer_json_schema() -> Value {
    json!({
        "type": "object",
        "properties": {"answer": {"type": "string"}},
        "required": ["answer"],
        "additionalProperties": false,
    })
}
