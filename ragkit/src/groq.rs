//! Groq answer generator using the OpenAI-compatible chat completions API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};
use crate::generator::{AnswerGenerator, DEFAULT_SYSTEM_PROMPT, NO_CONTEXT_ANSWER, grounding_prompt};

/// The Groq chat completions endpoint.
const GROQ_CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// The default chat model.
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// An [`AnswerGenerator`] backed by the Groq chat completions API.
///
/// # Configuration
///
/// - `model` – defaults to `llama-3.1-8b-instant`.
/// - `api_key` – from the constructor or the `GROQ_API_KEY` environment
///   variable. A missing key is fatal at construction, not at query time.
/// - `temperature` / `max_tokens` – default to 0.1 / 256.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::groq::GroqClient;
///
/// let client = GroqClient::from_env()?.with_model("llama-3.3-70b-versatile");
/// let answer = client.generate("What is chunking?", &context).await;
/// ```
pub struct GroqClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: Option<String>,
}

impl GroqClient {
    /// Create a new client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ConfigError(
                "Groq API key is required. Set GROQ_API_KEY or pass a key.".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.into(),
            temperature: 0.1,
            max_tokens: 256,
            system_prompt: None,
        })
    }

    /// Create a new client using the `GROQ_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the variable is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| {
            RagError::ConfigError(
                "Groq API key is required. Set GROQ_API_KEY or pass a key.".to_string(),
            )
        })?;
        Self::new(api_key)
    }

    /// Set the chat model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum tokens in a generated answer.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Replace the default grounding system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Send a single chat completion request and return the answer text.
    ///
    /// One attempt, no retries, no streaming.
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "requesting chat completion");

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(GROQ_CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Groq", error = %e, "request failed");
                RagError::GenerationError {
                    provider: "Groq".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "Groq", %status, "API error");
            return Err(RagError::GenerationError {
                provider: "Groq".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let completion: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "Groq", error = %e, "failed to parse response");
            RagError::GenerationError {
                provider: "Groq".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| RagError::GenerationError {
                provider: "Groq".into(),
                message: "API returned no choices".into(),
            })
    }
}

// ── Chat API request/response types ────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── AnswerGenerator implementation ─────────────────────────────────

#[async_trait]
impl AnswerGenerator for GroqClient {
    async fn generate(&self, question: &str, context: &str) -> String {
        if context.trim().is_empty() {
            return NO_CONTEXT_ANSWER.to_string();
        }

        let system_prompt = self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let prompt = grounding_prompt(system_prompt, context, question);

        match self.complete(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(provider = "Groq", error = %e, "generation failed");
                format!("Error generating response: {e}")
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
