//! Quota and transcript behaviour of conversation sessions.

mod common;

use common::{invoker, long_form_recipe, recipe, FailingTransport, StalledTransport, StaticTransport};
use larder_core::ai::FakeAiClient;
use larder_core::{
    AskOutcome, ChatError, ChatTurn, ConversationSession, GenerationError, GenerationInvoker,
    ModelTransport, OutputForm, QuotaPolicy, RawIngredient, RecipeAssistant, SessionState,
    Speaker, CHAT_FALLBACK_MESSAGE,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn answering() -> GenerationInvoker {
    invoker(StaticTransport::new(json!({"answer": "Yes, add cheese."})))
}

#[tokio::test]
async fn accepted_question_appends_user_and_assistant_turns() {
    let invoker = answering();
    let mut session = ConversationSession::start(recipe());

    let outcome = session.ask(&invoker, "Can I add cheese?").await.unwrap();

    assert!(matches!(outcome, AskOutcome::Answered(ref a) if a == "Yes, add cheese."));
    assert_eq!(
        session.turns(),
        &[
            ChatTurn::user("Can I add cheese?"),
            ChatTurn::assistant("Yes, add cheese.")
        ]
    );
    assert_eq!(session.state(), SessionState::Active);
}

#[tokio::test]
async fn answer_prompt_embeds_recipe_and_question() {
    let transport = StaticTransport::new(json!({"answer": "Sure."}));
    let invoker = invoker(transport.clone());
    let mut session = ConversationSession::start(recipe());

    session.ask(&invoker, "How long does it keep?").await.unwrap();

    let call = transport.calls.lock().unwrap()[0].clone();
    assert!(call.prompt.contains("Recipe Name: Spinach Frittata"));
    assert!(call.prompt.contains("1. Whisk the eggs.\n2. Add spinach.\n3. Bake for 15 minutes."));
    assert!(call.prompt.contains("User's question: How long does it keep?"));
    assert_eq!(call.input["recipeName"], "Spinach Frittata");
    assert_eq!(call.input["question"], "How long does it keep?");
}

#[tokio::test]
async fn sixth_question_is_rejected_without_premium() {
    let transport = StaticTransport::new(json!({"answer": "Sure."}));
    let invoker = invoker(transport.clone());
    let mut session = ConversationSession::start(recipe());

    for i in 0..5 {
        session.ask(&invoker, &format!("Question {i}")).await.unwrap();
    }
    assert_eq!(session.user_turn_count(), 5);
    assert_eq!(session.turns().len(), 10);
    assert_eq!(session.state(), SessionState::Exhausted);
    assert_eq!(session.remaining_questions(), Some(0));

    let err = session.ask(&invoker, "One more?").await.unwrap_err();
    assert!(matches!(err, ChatError::QuotaExceeded { limit: 5 }));
    assert_eq!(session.turns().len(), 10);
    assert_eq!(transport.call_count(), 5);
}

#[tokio::test]
async fn premium_unlocks_exhausted_session() {
    let invoker = answering();
    let mut session = ConversationSession::start(recipe());
    for i in 0..5 {
        session.ask(&invoker, &format!("Question {i}")).await.unwrap();
    }
    assert!(session.ask(&invoker, "Blocked?").await.is_err());

    session.set_premium(true);
    assert_eq!(session.state(), SessionState::Unlimited);

    for i in 0..3 {
        session.ask(&invoker, &format!("Extra {i}")).await.unwrap();
    }
    assert_eq!(session.user_turn_count(), 8);
    assert_eq!(session.turns().len(), 16);
}

#[tokio::test]
async fn premium_session_is_never_limited() {
    let invoker = answering();
    let mut session = ConversationSession::start(recipe()).with_premium(true);
    for i in 0..7 {
        session.ask(&invoker, &format!("Question {i}")).await.unwrap();
    }
    assert_eq!(session.user_turn_count(), 7);
}

#[tokio::test]
async fn failing_invoker_appends_fallback_pair() {
    let invoker = invoker(Arc::new(FailingTransport));
    let mut session = ConversationSession::start(recipe());

    let outcome = session.ask(&invoker, "Any tips?").await.unwrap();

    assert!(matches!(
        outcome.error(),
        Some(GenerationError::Transport(_))
    ));
    assert_eq!(outcome.text(), CHAT_FALLBACK_MESSAGE);
    assert_eq!(session.turns().len(), 2);
    assert_eq!(session.turns()[0], ChatTurn::user("Any tips?"));
    assert_eq!(session.turns()[1].speaker, Speaker::Assistant);
    assert_eq!(session.turns()[1].text, CHAT_FALLBACK_MESSAGE);
}

#[tokio::test]
async fn malformed_answer_appends_fallback_pair() {
    let invoker = invoker(StaticTransport::new(json!({"answer": ["not", "a", "string"]})));
    let mut session = ConversationSession::start(recipe());

    let outcome = session.ask(&invoker, "Any tips?").await.unwrap();
    assert!(matches!(
        outcome,
        AskOutcome::Fallback(GenerationError::OutputSchemaViolation(_))
    ));
    assert_eq!(session.turns().len(), 2);
}

#[tokio::test]
async fn failed_answers_count_towards_quota() {
    let invoker = invoker(Arc::new(FailingTransport));
    let mut session = ConversationSession::start(recipe()).with_policy(QuotaPolicy::new(2));

    session.ask(&invoker, "One").await.unwrap();
    session.ask(&invoker, "Two").await.unwrap();
    assert!(matches!(
        session.ask(&invoker, "Three").await,
        Err(ChatError::QuotaExceeded { limit: 2 })
    ));
}

#[tokio::test]
async fn blank_question_is_rejected_without_mutation() {
    let transport = StaticTransport::new(json!({"answer": "Sure."}));
    let invoker = invoker(transport.clone());
    let mut session = ConversationSession::start(recipe());

    let err = session.ask(&invoker, "   ").await.unwrap_err();
    assert!(matches!(err, ChatError::InvalidQuestion(_)));
    assert!(session.turns().is_empty());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn timed_out_question_leaves_transcript_untouched() {
    let invoker = invoker(Arc::new(StalledTransport));
    let mut session = ConversationSession::start(recipe());

    let err = session
        .ask_with_timeout(&invoker, "Still there?", Duration::from_millis(50))
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::TimedOut(_)));
    assert!(err.is_retryable());
    assert!(session.turns().is_empty());
    assert_eq!(session.state(), SessionState::Empty);
}

#[tokio::test]
async fn assistant_resets_session_on_new_recipe() {
    let client = Arc::new(FakeAiClient::with_kitchen_responses());
    let transport = ModelTransport::new(client.clone(), Duration::from_secs(5));
    let assistant = RecipeAssistant::new(
        GenerationInvoker::new(Arc::new(transport), OutputForm::Long),
        QuotaPolicy::default(),
    );

    assert!(matches!(
        assistant.ask("Before any recipe?").await,
        Err(ChatError::NoRecipe)
    ));

    let ingredients = vec![RawIngredient::new("egg", Some("2"))];
    let recipe = assistant.generate(&ingredients).await.unwrap();
    assert_eq!(recipe.recipe_name, "Pantry Frittata");

    let outcome = assistant.ask("Can I add cheese?").await.unwrap();
    assert!(outcome.text().contains("cheese"));
    assert_eq!(assistant.transcript().await.len(), 2);
    assert_eq!(assistant.remaining_questions().await, Some(4));

    assistant.generate(&ingredients).await.unwrap();
    assert!(assistant.transcript().await.is_empty());
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn assistant_premium_carries_into_new_sessions() {
    let invoker = invoker(StaticTransport::new(long_form_recipe()));
    let assistant = RecipeAssistant::new(invoker, QuotaPolicy::new(0));

    assistant.set_premium(true).await;
    assistant
        .generate(&[RawIngredient::new("egg", None)])
        .await
        .unwrap();
    assert_eq!(assistant.remaining_questions().await, None);

    assistant.set_premium(false).await;
    assert!(matches!(
        assistant.ask("Anything?").await,
        Err(ChatError::QuotaExceeded { limit: 0 })
    ));
}

#[tokio::test]
async fn failed_generation_clears_previous_session() {
    let assistant = RecipeAssistant::new(invoker(Arc::new(FailingTransport)), QuotaPolicy::default());
    let err = assistant
        .generate(&[RawIngredient::new("egg", None)])
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Failed to generate recipe. Please try again.");
    assert!(matches!(
        assistant.ask("Hello?").await,
        Err(ChatError::NoRecipe)
    ));
}
