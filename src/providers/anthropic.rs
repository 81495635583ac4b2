//! Anthropic Messages API client for vision transcription.
//!
//! One page per request: a user turn carrying an `Image N:` label, the
//! base64 page image, and the fixed transcription instruction. Sampling is
//! deterministic (`temperature: 0`) — the transcript should be faithful to
//! the page, not creative. Response `content` is a list of blocks; the text
//! of every `"text"` block is concatenated, and a response with no text
//! blocks is a valid non-text result, not an error.

use crate::config::RunConfig;
use crate::error::NarrationError;
use crate::pipeline::encode::EncodedPage;
use crate::prompts::{page_label, SYSTEM_PROMPT, TRANSCRIBE_INSTRUCTION};
use crate::providers::{TranscriptionError, TranscriptionProvider};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Environment variable holding the transcription credential.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Messages API transcription client.
pub struct AnthropicTranscriber {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: usize,
}

impl AnthropicTranscriber {
    /// Build a client with an explicit key and the config's model settings.
    pub fn new(api_key: impl Into<String>, config: &RunConfig) -> Result<Self, NarrationError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            NarrationError::ProviderClientFailed {
                provider: "anthropic".to_string(),
                detail: e.to_string(),
            }
        })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: config.transcription_model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Build a client from the `ANTHROPIC_API_KEY` environment variable.
    ///
    /// A missing or empty key is the fatal-at-startup condition: without it
    /// not a single page can be transcribed.
    pub fn from_env(config: &RunConfig) -> Result<Self, NarrationError> {
        let key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(NarrationError::MissingTranscriptionKey {
                env_var: API_KEY_ENV,
            })?;
        Self::new(key, config)
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[async_trait]
impl TranscriptionProvider for AnthropicTranscriber {
    async fn transcribe(
        &self,
        seq: usize,
        image: &EncodedPage,
        instruction: &str,
    ) -> Result<Option<String>, TranscriptionError> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": SYSTEM_PROMPT,
            "temperature": 0,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": page_label(seq) },
                    {
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": image.media_type,
                            "data": image.data,
                        },
                    },
                    { "type": "text", "text": instruction },
                ],
            }],
        });

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranscriptionError::Request {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse =
            response
                .json()
                .await
                .map_err(|e| TranscriptionError::Malformed {
                    detail: e.to_string(),
                })?;

        let text = join_text_blocks(&parsed.content);
        debug!("Page {seq}: {} chars transcribed", text.len());

        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }
}

/// Concatenate the text of all `"text"` content blocks.
fn join_text_blocks(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter(|b| b.kind == "text")
        .map(|b| b.text.as_str())
        .collect()
}

/// The instruction to send: the config override or the built-in default.
pub fn effective_instruction(config: &RunConfig) -> &str {
    config
        .instruction
        .as_deref()
        .unwrap_or(TRANSCRIBE_INSTRUCTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(kind: &str, text: &str) -> ContentBlock {
        ContentBlock {
            kind: kind.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn joins_only_text_blocks() {
        let blocks = vec![
            block("text", "First part. "),
            block("tool_use", "ignored"),
            block("text", "Second part."),
        ];
        assert_eq!(join_text_blocks(&blocks), "First part. Second part.");
    }

    #[test]
    fn empty_content_joins_to_empty() {
        assert_eq!(join_text_blocks(&[]), "");
    }

    #[test]
    fn response_with_missing_content_deserializes() {
        let parsed: MessagesResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.content.is_empty());
    }

    #[test]
    fn instruction_override_wins() {
        let config = RunConfig::builder()
            .instruction("Read the page.")
            .build()
            .unwrap();
        assert_eq!(effective_instruction(&config), "Read the page.");

        let default_config = RunConfig::default();
        assert_eq!(effective_instruction(&default_config), TRANSCRIBE_INSTRUCTION);
    }
}
