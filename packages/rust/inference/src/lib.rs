//! Chat-completion client, prompt loading, and token accounting.
//!
//! The transform stage talks to any OpenAI-compatible chat endpoint through
//! [`ChatClient`]. Prompts come from user-editable Markdown fragments on
//! disk, and token counts fall back to a labelled approximation when no
//! tokenizer is known for the configured model.

use std::time::Duration;

use tubedigest_shared::{Result, TubeDigestError};

pub mod chat;
pub mod prompts;
pub mod tokens;

pub use chat::{ChatClient, ChatMessage, ChatRequest};
pub use prompts::{PromptSet, load_prompts};
pub use tokens::{CountMethod, TokenCount, count_tokens};

/// Build the HTTP client for the inference endpoint.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("tubedigest/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| TubeDigestError::Inference(format!("failed to build HTTP client: {e}")))
}
