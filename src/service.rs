// service.rs
use crate::agent::{AgentError, GeminiClient, LlmSqlAgent, SqlAgent};
use crate::config::{Config, ANSWER_LANGUAGE_INSTRUCTION};
use crate::db::connection::Database;
use crate::errors::ServerError;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, info};

/// Everything a request handler needs, built once at startup and shared by
/// reference for the life of the process.
pub struct AppService {
    db: Database,
    agent: Box<dyn SqlAgent>,
    answered: AtomicU64,
    failed: AtomicU64,
}

impl AppService {
    pub fn new(db: Database, agent: Box<dyn SqlAgent>) -> Self {
        Self {
            db,
            agent,
            answered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Gemini-backed agent over the configured database. A missing API key is
    /// not an error here; questions will report it instead.
    pub fn from_config(cfg: &Config) -> Result<Self, AgentError> {
        let db = Database::new(&cfg.database_path);
        let model = GeminiClient::from_config(cfg)?;
        info!("Using model endpoint {}", model.endpoint());
        let agent = LlmSqlAgent::new(db.clone(), model);

        if cfg.google_api_key.is_none() {
            tracing::warn!("GOOGLE_API_KEY is not set; questions will fail until it is configured");
        }

        Ok(Self::new(db, Box::new(agent)))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Answer one question. Empty questions never reach the agent.
    pub fn answer(&self, question: &str) -> Result<String, ServerError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ServerError::BadRequest(
                "The question cannot be empty.".to_string(),
            ));
        }
        info!("Question received: {question}");

        let prompt = format!("{question}\n\n{ANSWER_LANGUAGE_INSTRUCTION}");
        match self.agent.ask(&prompt) {
            Ok(answer) => {
                self.answered.fetch_add(1, Ordering::Relaxed);
                Ok(answer)
            }
            Err(AgentError::MissingCredential) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                error!("Cannot answer: GOOGLE_API_KEY is not configured");
                Err(ServerError::Configuration(
                    "The Google API key is not configured on the server.".to_string(),
                ))
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                error!("Agent execution failed: {e}");
                Err(ServerError::AgentFailure(e.to_string()))
            }
        }
    }

    /// (answered, failed) since startup.
    pub fn stats(&self) -> (u64, u64) {
        (
            self.answered.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
        )
    }

    pub fn shutdown(&self) {
        let (answered, failed) = self.stats();
        info!(
            answered,
            failed,
            "Service shutting down (database: {})",
            self.db.path().display()
        );
    }
}
