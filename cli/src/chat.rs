use std::time::Duration;

use anyhow::Result;
use larder_core::{
    ChatError, GenerationInvoker, LarderConfig, QuotaPolicy, RawIngredient, RecipeAssistant,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Generate a recipe, then answer one question per stdin line until EOF.
pub async fn run(
    config: &LarderConfig,
    ingredients: &[RawIngredient],
    premium: bool,
    timeout: Duration,
) -> Result<()> {
    let invoker = GenerationInvoker::from_config(config)?;
    let assistant = RecipeAssistant::new(invoker, QuotaPolicy::new(config.question_limit));
    assistant.set_premium(premium).await;

    let recipe = match assistant.generate(ingredients).await {
        Ok(recipe) => recipe,
        Err(e) => {
            tracing::error!(error = %e, "Recipe generation failed");
            anyhow::bail!(e.user_message());
        }
    };
    crate::print_recipe(&recipe);
    print_remaining(assistant.remaining_questions().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match assistant.ask_with_timeout(&line, timeout).await {
            Ok(outcome) => {
                println!("\n{}\n", outcome.text());
                print_remaining(assistant.remaining_questions().await);
            }
            Err(e @ ChatError::QuotaExceeded { .. }) => {
                println!("{}", e.user_message());
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Question not answered");
                println!("{}", e.user_message());
            }
        }
    }

    Ok(())
}

fn print_remaining(remaining: Option<usize>) {
    match remaining {
        Some(0) => println!("(no free questions left)"),
        Some(n) => println!("({} free question{} left)", n, if n == 1 { "" } else { "s" }),
        None => {}
    }
}
