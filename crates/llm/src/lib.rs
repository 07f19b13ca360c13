//! LLM client — chat completions for query expansion and sibling agents.
//!
//! `LlmClient` picks a backend from settings: the OpenAI-compatible HTTP
//! client, or a stub that answers deterministically without a network.
//! Callers depend on the `TextGenerator` trait so tests can swap in fakes.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use renter_aid_config::{LlmMode, LlmSettings};
use tracing::debug;

pub use client::{LlmError, OpenAiClient};
pub use types::ChatMessage;

/// Reply the stub gives to any prompt it has no canned answer for.
pub const STUB_REPLY: &str = r#"{"message": "stub response"}"#;

/// Text-in/text-out chat service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete a role-tagged conversation. Returns the assistant's text.
    async fn chat(&self, messages: &[ChatMessage], temperature: f32) -> Result<String, LlmError>;
}

#[derive(Debug)]
enum Backend {
    Http(OpenAiClient),
    Stub,
}

/// Chat client selected by `LlmMode`.
#[derive(Debug)]
pub struct LlmClient {
    backend: Backend,
}

impl LlmClient {
    /// Build a client from provider settings.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        let backend = match settings.mode {
            LlmMode::Http => Backend::Http(OpenAiClient::new(
                settings.api_key.clone(),
                &settings.base_url,
                &settings.model,
                settings.max_tokens,
                Duration::from_secs(settings.request_timeout_secs),
            )?),
            LlmMode::Stub => Backend::Stub,
        };
        Ok(Self { backend })
    }

    pub fn mode(&self) -> LlmMode {
        match self.backend {
            Backend::Http(_) => LlmMode::Http,
            Backend::Stub => LlmMode::Stub,
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn chat(&self, messages: &[ChatMessage], temperature: f32) -> Result<String, LlmError> {
        match &self.backend {
            Backend::Http(client) => client.chat(messages, temperature).await,
            Backend::Stub => {
                debug!("stub chat: {} messages", messages.len());
                Ok(STUB_REPLY.to_string())
            }
        }
    }
}
