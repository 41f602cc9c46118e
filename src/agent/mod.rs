mod agent_error;
pub mod gemini;
pub mod sql_agent;

pub use agent_error::AgentError;
pub use gemini::GeminiClient;
pub use sql_agent::LlmSqlAgent;

/// Anything that turns a natural-language question into an answer by
/// querying the restaurants database.
pub trait SqlAgent: Send + Sync {
    fn ask(&self, question: &str) -> Result<String, AgentError>;
}

/// A single-turn text completion model.
pub trait ChatModel: Send + Sync {
    /// Whether a credential is available. Checked before any work is done.
    fn has_credential(&self) -> bool;

    fn generate(&self, system: &str, user: &str) -> Result<String, AgentError>;
}
