//! Per-recipe conversation with a question quota.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::generation::{GenerationError, GenerationInvoker};
use crate::quota::QuotaPolicy;
use crate::schema::SchemaViolation;
use crate::types::{AnswerRequest, ChatTurn, RecipeGenerationResult, Speaker};

/// Assistant turn appended when an answer could not be produced.
pub const CHAT_FALLBACK_MESSAGE: &str = "Sorry, I couldn't find an answer.";

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Question limit of {limit} reached for this recipe")]
    QuotaExceeded { limit: usize },

    #[error("Invalid question: {0}")]
    InvalidQuestion(SchemaViolation),

    #[error("No answer within {0:?}")]
    TimedOut(Duration),

    #[error("No recipe has been generated yet")]
    NoRecipe,
}

impl ChatError {
    pub fn user_message(&self) -> String {
        match self {
            ChatError::QuotaExceeded { limit } => format!(
                "You've used all {limit} free questions for this recipe. \
                 Upgrade to premium to keep chatting."
            ),
            ChatError::InvalidQuestion(_) => "Please enter a question.".to_string(),
            ChatError::TimedOut(_) => {
                "The assistant took too long to answer. Please try again.".to_string()
            }
            ChatError::NoRecipe => "Generate a recipe first, then ask about it.".to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ChatError::TimedOut(_))
    }
}

/// Result of an accepted question. Both variants have appended a User/Assistant pair.
#[derive(Debug)]
pub enum AskOutcome {
    Answered(String),
    /// The invoker failed; the transcript holds [`CHAT_FALLBACK_MESSAGE`] instead.
    Fallback(GenerationError),
}

impl AskOutcome {
    /// Text of the assistant turn that was appended.
    pub fn text(&self) -> &str {
        match self {
            AskOutcome::Answered(answer) => answer,
            AskOutcome::Fallback(_) => CHAT_FALLBACK_MESSAGE,
        }
    }

    pub fn error(&self) -> Option<&GenerationError> {
        match self {
            AskOutcome::Answered(_) => None,
            AskOutcome::Fallback(e) => Some(e),
        }
    }
}

/// Where a session sits with respect to its quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Active,
    Exhausted,
    Unlimited,
}

/// Chat history about one generated recipe.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: Uuid,
    recipe: Arc<RecipeGenerationResult>,
    turns: Vec<ChatTurn>,
    premium: bool,
    policy: QuotaPolicy,
}

impl ConversationSession {
    /// Start an empty, non-premium session about `recipe`.
    pub fn start(recipe: impl Into<Arc<RecipeGenerationResult>>) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            recipe: recipe.into(),
            turns: Vec::new(),
            premium: false,
            policy: QuotaPolicy::default(),
        };
        tracing::debug!(
            session_id = %session.id,
            recipe_name = %session.recipe.recipe_name,
            "Conversation session started"
        );
        session
    }

    pub fn with_premium(mut self, premium: bool) -> Self {
        self.premium = premium;
        self
    }

    pub fn with_policy(mut self, policy: QuotaPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn recipe(&self) -> &RecipeGenerationResult {
        &self.recipe
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_premium(&self) -> bool {
        self.premium
    }

    /// Grant or revoke premium. Takes effect on the next question.
    pub fn set_premium(&mut self, premium: bool) {
        self.premium = premium;
    }

    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    pub fn user_turn_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.speaker == Speaker::User)
            .count()
    }

    /// Questions left before the quota bites, `None` when premium.
    pub fn remaining_questions(&self) -> Option<usize> {
        self.policy.remaining(self)
    }

    pub fn state(&self) -> SessionState {
        if self.premium {
            SessionState::Unlimited
        } else if self.turns.is_empty() {
            SessionState::Empty
        } else if self.policy.allow(self) {
            SessionState::Active
        } else {
            SessionState::Exhausted
        }
    }

    /// Ask a question about the recipe.
    ///
    /// Rejected questions (quota, blank text) leave the transcript untouched. Accepted
    /// questions always append a User turn followed by an Assistant turn; if the invoker
    /// fails, the Assistant turn is [`CHAT_FALLBACK_MESSAGE`] and the failure is returned in
    /// [`AskOutcome::Fallback`]. The transcript is only written after the invoker returns,
    /// so dropping the future mid-call leaves the session as it was.
    pub async fn ask(
        &mut self,
        invoker: &GenerationInvoker,
        question: &str,
    ) -> Result<AskOutcome, ChatError> {
        if !self.policy.allow(self) {
            tracing::info!(
                session_id = %self.id,
                limit = self.policy.limit(),
                "Question rejected, quota exhausted"
            );
            return Err(ChatError::QuotaExceeded {
                limit: self.policy.limit(),
            });
        }

        if question.trim().is_empty() {
            return Err(ChatError::InvalidQuestion(SchemaViolation::new(
                "question",
                "must not be blank",
            )));
        }

        let request = AnswerRequest::for_recipe(&self.recipe, question);
        let result = invoker.answer(&request).await;

        self.turns.push(ChatTurn::user(question));
        let outcome = match result {
            Ok(answer) => AskOutcome::Answered(answer),
            Err(e) => {
                tracing::warn!(
                    session_id = %self.id,
                    error = %e,
                    "Answer failed, appending fallback"
                );
                AskOutcome::Fallback(e)
            }
        };
        self.turns.push(ChatTurn::assistant(outcome.text()));

        Ok(outcome)
    }

    /// [`ConversationSession::ask`] bounded by `timeout`. On timeout nothing is appended.
    pub async fn ask_with_timeout(
        &mut self,
        invoker: &GenerationInvoker,
        question: &str,
        timeout: Duration,
    ) -> Result<AskOutcome, ChatError> {
        let session_id = self.id;
        match tokio::time::timeout(timeout, self.ask(invoker, question)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(%session_id, ?timeout, "Question timed out");
                Err(ChatError::TimedOut(timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> RecipeGenerationResult {
        RecipeGenerationResult {
            recipe_name: "Toast".to_string(),
            ingredients: vec!["bread".to_string()],
            instructions: vec!["Toast the bread".to_string()],
            recommendations: vec![],
        }
    }

    #[test]
    fn test_start_is_empty() {
        let session = ConversationSession::start(recipe());
        assert!(session.turns().is_empty());
        assert!(!session.is_premium());
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.recipe().recipe_name, "Toast");
    }

    #[test]
    fn test_premium_from_any_state() {
        let mut session = ConversationSession::start(recipe()).with_policy(QuotaPolicy::new(0));
        assert_eq!(session.state(), SessionState::Empty);
        session.set_premium(true);
        assert_eq!(session.state(), SessionState::Unlimited);
        assert_eq!(session.remaining_questions(), None);
    }

    #[test]
    fn test_quota_message() {
        let err = ChatError::QuotaExceeded { limit: 5 };
        assert!(err.user_message().contains("5 free questions"));
        assert!(!err.is_retryable());
        assert!(ChatError::TimedOut(Duration::from_secs(1)).is_retryable());
    }
}
