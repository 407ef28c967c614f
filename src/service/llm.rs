//! Shared LLM plumbing used across services
//!
//! Model calls are hidden behind [`CompletionBackend`] so pipeline stages can
//! be constructed with a stub in tests, and so the providers (Anthropic for
//! extraction/evaluation, OpenAI for rule synthesis) stay interchangeable.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::{anthropic, openai};
use serde::de::DeserializeOwned;

/// Error type for model completion calls
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CompletionError {
    #[error("Failed to create model client: {0}")]
    ClientInit(String),

    #[error("Model request failed: {0}")]
    RequestFailed(String),
}

/// A single-shot, text-in/text-out model call
///
/// One synchronous round trip per invocation; no retries, no backoff. The
/// `system` instruction is fixed per pipeline stage, the `prompt` carries the
/// per-request payload.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, CompletionError>;
}

/// Outcome of parsing a model response as structured JSON
///
/// Callers branch on the variant instead of catching a parse error; malformed
/// model output is an expected condition, not an exception.
#[derive(Debug)]
pub enum ParsedResponse<T> {
    /// Response was well-formed JSON matching the expected shape
    Valid(T),
    /// Response was not valid JSON, or did not match the expected shape
    Malformed(String),
}

/// Parse a raw model response strictly as JSON
///
/// No fence stripping, no partial parse, no retry: the response either
/// deserializes as a whole or is reported as malformed.
pub fn parse_json_response<T: DeserializeOwned>(raw: &str) -> ParsedResponse<T> {
    match serde_json::from_str(raw) {
        Ok(value) => ParsedResponse::Valid(value),
        Err(e) => ParsedResponse::Malformed(e.to_string()),
    }
}

/// Anthropic-backed completion used by the extraction and evaluation stages
pub struct AnthropicCompletion {
    client: anthropic::Client,
    model: String,
    max_tokens: u64,
}

impl AnthropicCompletion {
    /// Create a new Anthropic completion backend with the provided API key
    pub fn new(api_key: &str, model: &str, max_tokens: u64) -> Result<Self, CompletionError> {
        let client = anthropic::ClientBuilder::new(api_key).build();

        Ok(Self {
            client,
            model: model.to_string(),
            max_tokens,
        })
    }
}

#[async_trait]
impl CompletionBackend for AnthropicCompletion {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, CompletionError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system)
            .temperature(0.0)
            .max_tokens(self.max_tokens)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| CompletionError::RequestFailed(e.to_string()))
    }
}

/// OpenAI-backed completion used by the rule synthesis stage
pub struct OpenAiCompletion {
    client: openai::Client,
    model: String,
}

impl OpenAiCompletion {
    /// Create a new OpenAI completion backend with the provided API key
    pub fn new(api_key: &str, model: &str) -> Result<Self, CompletionError> {
        let client = openai::Client::new(api_key);

        Ok(Self {
            client,
            model: model.to_string(),
        })
    }

    /// Get a reference to the underlying OpenAI client
    ///
    /// Used at startup to build the embedding model for the rule index.
    pub fn openai_client(&self) -> &openai::Client {
        &self.client
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompletion {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, CompletionError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system)
            .temperature(0.0)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| CompletionError::RequestFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtractedProcedures;

    #[test]
    fn test_parse_valid_response() {
        let raw = r#"{"procedures": [{"techniques": "T1059.001", "description": "PowerShell download"}]}"#;

        match parse_json_response::<ExtractedProcedures>(raw) {
            ParsedResponse::Valid(extracted) => assert_eq!(extracted.procedures.len(), 1),
            ParsedResponse::Malformed(reason) => panic!("expected valid parse: {reason}"),
        }
    }

    #[test]
    fn test_parse_malformed_response() {
        let raw = "Sure! Here is the JSON you asked for: {\"procedures\": [";

        assert!(matches!(
            parse_json_response::<ExtractedProcedures>(raw),
            ParsedResponse::Malformed(_)
        ));
    }

    #[test]
    fn test_parse_empty_object() {
        match parse_json_response::<ExtractedProcedures>("{}") {
            ParsedResponse::Valid(extracted) => assert!(extracted.procedures.is_empty()),
            ParsedResponse::Malformed(reason) => panic!("expected valid parse: {reason}"),
        }
    }
}
