//! Follow-up question prompt.

use crate::types::AnswerRequest;

/// Prompt name used in logs and request metadata.
pub const ASK_ABOUT_RECIPE_PROMPT_NAME: &str = "ask_about_recipe";

/// Render the Q&A prompt. The question is embedded verbatim.
pub fn render_ask_about_recipe_prompt(request: &AnswerRequest) -> String {
    format!(
        r#"You are a friendly and imaginative cooking assistant with a flair for creativity and culinary storytelling. The user has a question about the following recipe.

Recipe Name: {recipe_name}

Instructions:
{instructions}

User's question: {question}

Answer the question in a helpful, engaging, and creative way. Feel free to include fun facts, comparisons, or vivid descriptions. Use your culinary knowledge and imagination to make the answer delightful and informative. If relevant, include nutritional insights or cooking tips that enhance the user's understanding and enjoyment of the recipe.

Respond with JSON only, no other text: {{"answer": "..."}}"#,
        recipe_name = request.recipe_name,
        instructions = request.instructions,
        question = request.question,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_prompt() {
        let long_question = format!("Can I swap the butter? {}", "really ".repeat(200));
        let request = AnswerRequest {
            recipe_name: "Garden Frittata".to_string(),
            instructions: "1. Whisk eggs\n2. Bake".to_string(),
            question: long_question.clone(),
        };
        let prompt = render_ask_about_recipe_prompt(&request);

        assert!(prompt.contains("Recipe Name: Garden Frittata"));
        assert!(prompt.contains("1. Whisk eggs\n2. Bake"));
        assert!(prompt.contains(&long_question));
        assert!(prompt.contains("cooking assistant"));
    }
}
