//! Runtime configuration and tunable constants.
//!
//! Values come from the process environment (optionally seeded from a `.env`
//! file) and can be overridden per invocation by CLI flags in `main`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Storage
// ============================================================================

/// Name of the single table the ETL replaces and the agent queries.
pub const RESTAURANTS_TABLE: &str = "restaurants";

pub const DEFAULT_DATABASE_PATH: &str = "restaurants.db";

pub const DEFAULT_DATA_DIR: &str = "data";

// ============================================================================
// HTTP server
// ============================================================================

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

pub const DEFAULT_MAX_WORKERS: usize = 8;

// ============================================================================
// Model provider
// ============================================================================

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// A hung provider call blocks one server worker for at most this long.
pub const LLM_TIMEOUT: Duration = Duration::from_secs(120);

/// Appended to every question so answers come back in one language.
pub const ANSWER_LANGUAGE_INSTRUCTION: &str =
    "Responde siempre en español, de forma clara y concisa.";

// ============================================================================
// Agent
// ============================================================================

/// Queries the agent may try (first attempt plus corrections) per question.
pub const MAX_SQL_ATTEMPTS: usize = 3;

/// Rows handed back to the model when it answers from a query result.
pub const MAX_RESULT_ROWS: usize = 50;

/// Rows shown to the model next to the table definition.
pub const SAMPLE_ROWS: usize = 3;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub data_dir: PathBuf,
    pub bind_addr: String,
    pub max_workers: usize,
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
            google_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load `.env` (if any) and read the environment on top of the defaults.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {e}");
            }
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let max_workers = match get("MAX_WORKERS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(
                        "MAX_WORKERS={raw} is not a positive number, using {DEFAULT_MAX_WORKERS}"
                    );
                    DEFAULT_MAX_WORKERS
                }
            },
            None => defaults.max_workers,
        };

        Self {
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            data_dir: get("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_workers,
            google_api_key: get("GOOGLE_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
        }
    }
}
