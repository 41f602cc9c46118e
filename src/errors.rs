use astra::Response;
// errors.rs
use std::fmt;

/// Errors originating from either the server logic
/// (routing, bad input) or downstream layers (DB, agent).
#[derive(Debug)]
pub enum ServerError {
    NotFound,
    BadRequest(String),
    DbError(String),
    /// The service is missing something it needs to answer, e.g. the API key.
    Configuration(String),
    /// The agent failed; the message is for the log only.
    AgentFailure(String),
    InternalError,
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Configuration(_) => 503,
            ServerError::DbError(_) | ServerError::AgentFailure(_) | ServerError::InternalError => {
                500
            }
        }
    }

    /// Short machine-readable error kind for JSON bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::NotFound => "not_found",
            ServerError::BadRequest(_) => "bad_request",
            ServerError::DbError(_) => "database",
            ServerError::Configuration(_) => "configuration",
            ServerError::AgentFailure(_) => "agent_failure",
            ServerError::InternalError => "internal",
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound => write!(f, "Not Found"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::DbError(msg) => write!(f, "Database Error: {msg}"),
            ServerError::Configuration(msg) => write!(f, "Configuration Error: {msg}"),
            ServerError::AgentFailure(msg) => write!(f, "Agent Error: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
        }
    }
}

impl std::error::Error for ServerError {}
