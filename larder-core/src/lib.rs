pub mod account;
pub mod ai;
pub mod assistant;
pub mod config;
pub mod generation;
pub mod notify;
pub mod prompts;
pub mod quota;
pub mod schema;
pub mod service;
pub mod session;
pub mod transport;
pub mod types;

pub use assistant::RecipeAssistant;
pub use config::{ConfigError, LarderConfig, TransportKind};
pub use generation::{
    Bindings, GenerationError, GenerationInvoker, ValidatedOutput, GENERATION_FAILED_MESSAGE,
    NO_INGREDIENTS_MESSAGE,
};
pub use quota::{QuotaPolicy, DEFAULT_QUESTION_LIMIT};
pub use schema::{OutputForm, SchemaViolation};
pub use session::{AskOutcome, ChatError, ConversationSession, SessionState, CHAT_FALLBACK_MESSAGE};
pub use transport::{
    GenerationTransport, ModelTransport, PromptKind, RemoteTransport, TransportError,
};
pub use types::{
    AnswerRequest, ChatTurn, Ingredient, RawIngredient, RecipeGenerationRequest,
    RecipeGenerationResult, Speaker,
};
