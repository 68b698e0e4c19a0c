//! OpenAI-compatible chat completions.

use tracing::{debug, instrument};
use tubedigest_shared::{Result, TubeDigestError};

/// One message in a chat conversation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A complete chat-completion request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Client for an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl ChatClient {
    pub fn new(client: reqwest::Client, api_base: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Send a chat request and return the first choice's content.
    ///
    /// An empty or missing response body is an error here; callers rely on
    /// the returned text carrying the model's actual output.
    #[instrument(skip_all, fields(model = %request.model, messages = request.messages.len()))]
    pub async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| TubeDigestError::Inference(format!("chat request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = detail.trim();
            return Err(TubeDigestError::Inference(if detail.is_empty() {
                format!("chat completion returned HTTP {status}")
            } else {
                format!("chat completion returned HTTP {status}: {detail}")
            }));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| TubeDigestError::Inference(format!("chat response: {e}")))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(TubeDigestError::Inference(
                "model returned an empty response".to_string(),
            ));
        }

        debug!(chars = content.len(), "chat completion received");
        Ok(content)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, serde::Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, serde::Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
