//! Recipe generation prompt.

use crate::schema::OutputForm;
use crate::types::RecipeGenerationRequest;

/// Prompt name used in logs and request metadata.
pub const GENERATE_RECIPE_PROMPT_NAME: &str = "generate_recipe";

/// Render the generation prompt, one `- name: quantity` line per ingredient.
pub fn render_generate_recipe_prompt(request: &RecipeGenerationRequest, form: OutputForm) -> String {
    let ingredient_lines: String = request
        .ingredients()
        .iter()
        .map(|i| format!("- {}: {}\n", i.name, i.quantity))
        .collect();

    match form {
        OutputForm::Short => format!(
            r#"You are a professional chef. Generate a recipe based on the ingredients and quantities provided by the user.

Ingredients:
{ingredient_lines}
Recipe Name: (Suggest a creative and appropriate name for the recipe.)
Instructions: (Provide detailed, step-by-step instructions for preparing the recipe.)

Respond with JSON only, no other text: {{"recipeName": "...", "instructions": "1. ...\n2. ..."}}"#
        ),
        OutputForm::Long => format!(
            r#"You are a professional chef. Generate a recipe based on the ingredients and quantities provided by the user.

Ingredients:
{ingredient_lines}
Recipe Name: (Suggest a creative and appropriate name for the recipe.)
Ingredients List: (List every ingredient the recipe uses, with amounts.)
Instructions: (Provide detailed, step-by-step instructions for preparing the recipe, one step per entry.)
Recommendations: (Offer serving suggestions, substitutions or storage tips.)

Respond with JSON only, no other text: {{"recipeName": "...", "ingredients": ["..."], "instructions": ["..."], "recommendations": ["..."]}}"#
        ),
    }
}
