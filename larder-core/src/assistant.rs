//! The generate-then-chat flow behind one user's screen.

use std::time::Duration;

use tokio::sync::Mutex;

use crate::generation::{GenerationError, GenerationInvoker};
use crate::quota::QuotaPolicy;
use crate::session::{AskOutcome, ChatError, ConversationSession};
use crate::types::{ChatTurn, RawIngredient, RecipeGenerationResult};

struct AssistantState {
    session: Option<ConversationSession>,
    premium: bool,
}

/// Owns the current recipe's session. Every operation holds the lock for its whole
/// duration, so at most one generation or question is in flight at a time.
pub struct RecipeAssistant {
    invoker: GenerationInvoker,
    policy: QuotaPolicy,
    state: Mutex<AssistantState>,
}

impl RecipeAssistant {
    pub fn new(invoker: GenerationInvoker, policy: QuotaPolicy) -> Self {
        Self {
            invoker,
            policy,
            state: Mutex::new(AssistantState {
                session: None,
                premium: false,
            }),
        }
    }

    pub fn invoker(&self) -> &GenerationInvoker {
        &self.invoker
    }

    /// Generate a recipe and start a fresh conversation about it.
    ///
    /// The previous session is discarded before the call, so a failed generation leaves
    /// no recipe to chat about.
    pub async fn generate(
        &self,
        ingredients: &[RawIngredient],
    ) -> Result<RecipeGenerationResult, GenerationError> {
        let mut state = self.state.lock().await;
        state.session = None;

        let recipe = self.invoker.generate_recipe(ingredients).await?;
        let session = ConversationSession::start(recipe.clone())
            .with_premium(state.premium)
            .with_policy(self.policy);
        state.session = Some(session);
        Ok(recipe)
    }

    pub async fn ask(&self, question: &str) -> Result<AskOutcome, ChatError> {
        let mut state = self.state.lock().await;
        let session = state.session.as_mut().ok_or(ChatError::NoRecipe)?;
        session.ask(&self.invoker, question).await
    }

    pub async fn ask_with_timeout(
        &self,
        question: &str,
        timeout: Duration,
    ) -> Result<AskOutcome, ChatError> {
        let mut state = self.state.lock().await;
        let session = state.session.as_mut().ok_or(ChatError::NoRecipe)?;
        session.ask_with_timeout(&self.invoker, question, timeout).await
    }

    /// Grant or revoke premium for the current and all later sessions.
    pub async fn set_premium(&self, premium: bool) {
        let mut state = self.state.lock().await;
        state.premium = premium;
        if let Some(session) = state.session.as_mut() {
            session.set_premium(premium);
        }
    }

    /// Snapshot of the current transcript. Empty when no recipe exists.
    pub async fn transcript(&self) -> Vec<ChatTurn> {
        let state = self.state.lock().await;
        state
            .session
            .as_ref()
            .map(|s| s.turns().to_vec())
            .unwrap_or_default()
    }

    pub async fn remaining_questions(&self) -> Option<usize> {
        let state = self.state.lock().await;
        match &state.session {
            Some(session) => session.remaining_questions(),
            None if state.premium => None,
            None => Some(self.policy.limit()),
        }
    }
}
