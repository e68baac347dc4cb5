//! Prompt templates for recipe generation and recipe Q&A.

pub mod ask_about_recipe;
pub mod generate_recipe;

pub use ask_about_recipe::{render_ask_about_recipe_prompt, ASK_ABOUT_RECIPE_PROMPT_NAME};
pub use generate_recipe::{render_generate_recipe_prompt, GENERATE_RECIPE_PROMPT_NAME};

use crate::schema::OutputForm;
use crate::types::{AnswerRequest, RecipeGenerationRequest};

/// Values bound into a template.
#[derive(Debug, Clone, Copy)]
pub enum PromptBindings<'a> {
    Generate {
        request: &'a RecipeGenerationRequest,
        form: OutputForm,
    },
    Answer(&'a AnswerRequest),
}

/// Render the template selected by `bindings`.
pub fn render(bindings: PromptBindings<'_>) -> String {
    match bindings {
        PromptBindings::Generate { request, form } => render_generate_recipe_prompt(request, form),
        PromptBindings::Answer(request) => render_ask_about_recipe_prompt(request),
    }
}
