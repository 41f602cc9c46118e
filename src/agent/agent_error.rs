use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum AgentError {
    /// No API key was configured for the model provider.
    MissingCredential,
    /// The provider could not be reached or returned something unusable.
    Provider(String),
    /// No generated query could be executed.
    Query(String),
    Db(String),
    EmptyAnswer,
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::MissingCredential => write!(f, "GOOGLE_API_KEY is not configured"),
            AgentError::Provider(msg) => write!(f, "Model provider error: {msg}"),
            AgentError::Query(msg) => write!(f, "Query failed: {msg}"),
            AgentError::Db(msg) => write!(f, "Database error: {msg}"),
            AgentError::EmptyAnswer => write!(f, "The model returned an empty answer"),
        }
    }
}

impl Error for AgentError {}
