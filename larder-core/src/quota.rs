//! Free-question quota for recipe chats.

use crate::session::ConversationSession;

/// Questions a non-premium session may ask about one recipe.
pub const DEFAULT_QUESTION_LIMIT: usize = 5;

/// Decides whether a session may ask another question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    limit: usize,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_QUESTION_LIMIT)
    }
}

impl QuotaPolicy {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Premium sessions always pass. Others pass while fewer than `limit` questions were
    /// accepted, counted before the new one is appended.
    pub fn allow(&self, session: &ConversationSession) -> bool {
        session.is_premium() || session.user_turn_count() < self.limit
    }

    /// Questions left, or `None` when unlimited.
    pub fn remaining(&self, session: &ConversationSession) -> Option<usize> {
        if session.is_premium() {
            None
        } else {
            Some(self.limit.saturating_sub(session.user_turn_count()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecipeGenerationResult;

    fn session() -> ConversationSession {
        ConversationSession::start(RecipeGenerationResult {
            recipe_name: "Toast".to_string(),
            ingredients: vec![],
            instructions: vec!["Toast the bread".to_string()],
            recommendations: vec![],
        })
    }

    #[test]
    fn test_fresh_session_is_allowed() {
        let policy = QuotaPolicy::default();
        let session = session();
        assert!(policy.allow(&session));
        assert_eq!(policy.remaining(&session), Some(5));
    }

    #[test]
    fn test_zero_limit_blocks_unless_premium() {
        let policy = QuotaPolicy::new(0);
        let mut session = session();
        assert!(!policy.allow(&session));

        session.set_premium(true);
        assert!(policy.allow(&session));
        assert_eq!(policy.remaining(&session), None);
    }
}
