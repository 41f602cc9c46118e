// agent/gemini.rs
use crate::agent::{AgentError, ChatModel};
use crate::config::{Config, LLM_TIMEOUT};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: String,
}

/// Blocking client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    api_key: Option<String>,
    endpoint: Url,
    temperature: f64,
    client: Client,
}

impl GeminiClient {
    /// The key may be absent; that is reported when a question arrives.
    pub fn new(api_key: Option<String>, base_url: &str, model: &str) -> Result<Self, AgentError> {
        let endpoint = Url::parse(&format!(
            "{}/{}:generateContent",
            base_url.trim_end_matches('/'),
            model.trim()
        ))
        .map_err(|e| AgentError::Provider(format!("Invalid model endpoint: {e}")))?;

        let client = Client::builder()
            .timeout(LLM_TIMEOUT)
            .build()
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        Ok(Self {
            api_key,
            endpoint,
            // SQL generation should be as deterministic as the model allows.
            temperature: 0.0,
            client,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, AgentError> {
        Self::new(
            cfg.google_api_key.clone(),
            &cfg.gemini_base_url,
            &cfg.gemini_model,
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ChatModel for GeminiClient {
    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn generate(&self, system: &str, user: &str) -> Result<String, AgentError> {
        let api_key = self.api_key.as_deref().ok_or(AgentError::MissingCredential)?;

        let body = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: system }],
            },
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart { text: user }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .map_err(|e| AgentError::Provider(format!("Request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_else(|_| "(no body)".to_string());
            return Err(AgentError::Provider(format!("Gemini API error: {status} - {text}")));
        }

        let parsed: GeminiResponse = resp
            .json()
            .map_err(|e| AgentError::Provider(format!("Unreadable response: {e}")))?;

        extract_text(parsed)
    }
}

fn extract_text(resp: GeminiResponse) -> Result<String, AgentError> {
    let content = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| AgentError::Provider("Response had no candidates".to_string()))?;

    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    Ok(text)
}
