//! Completion-model client for answering queries over the assembled book.
//!
//! Thin wrapper around an OpenAI-compatible chat-completions endpoint: the
//! book text goes into the system message (truncated to a character budget),
//! the user's question into the user message. The model's reasoning behavior
//! is an external concern; this crate only owns the wire contract.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use bookdesk_shared::{BookdeskError, CompletionConfig, Result};

/// Character budget for the book context sent with each query.
const MAX_CONTEXT_CHARS: usize = 400_000;

/// Request timeout for completion calls, in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 120;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

/// Response body from `POST /chat/completions`.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for an OpenAI-compatible completions API.
#[derive(Debug)]
pub struct CompletionClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    /// Create a client with explicit credentials.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| BookdeskError::Completion(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Create a client from config, reading the API key from the configured
    /// environment variable (the key itself is never stored in config).
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        let api_key = match std::env::var(&config.api_key_env) {
            Ok(val) if !val.is_empty() => val,
            _ => {
                return Err(BookdeskError::config(format!(
                    "completion API key not found. Set the {} environment variable.",
                    config.api_key_env
                )));
            }
        };

        Self::new(&config.base_url, api_key, &config.model)
    }

    /// Answer `query` using `context` as the grounding text.
    #[instrument(skip_all, fields(model = %self.model, query_len = query.len()))]
    pub async fn ask(&self, context: &str, query: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: build_system_prompt(context),
                },
                ChatMessage {
                    role: "user".into(),
                    content: query.to_string(),
                },
            ],
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, "sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BookdeskError::Completion(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(BookdeskError::Completion(format!("HTTP {status}: {snippet}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BookdeskError::Completion(format!("invalid response body: {e}")))?;

        if let Some(usage) = &parsed.usage {
            info!(
                tokens_in = usage.prompt_tokens,
                tokens_out = usage.completion_tokens,
                "completion finished"
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| BookdeskError::Completion("response contained no choices".into()))
    }
}

/// Build the system message carrying the (truncated) book text.
fn build_system_prompt(context: &str) -> String {
    format!(
        "You answer questions about the following book. \
         Base every answer on the book text below.\n\n{}",
        truncate_content(context, MAX_CONTEXT_CHARS)
    )
}

/// Truncate content to approximately `max_chars` characters, respecting
/// char boundaries.
fn truncate_content(content: &str, max_chars: usize) -> String {
    if content.len() <= max_chars {
        return content.to_string();
    }

    let mut end = max_chars;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}\n\n[... content truncated for the model's context window ...]",
        &content[..end]
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
