//! ElevenLabs text-to-speech client.
//!
//! One request per run: the full double-newline-joined transcript goes in,
//! base64 MP3 audio comes out. A non-success status is a stage failure, not
//! a run failure — the caller keeps the transcript artifact and reports the
//! missing narration.

use crate::config::RunConfig;
use crate::error::{NarrationError, SynthesisFailure};
use crate::providers::SpeechProvider;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Environment variable holding the speech credential.
pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// ElevenLabs synthesis client for a fixed voice/model configuration.
pub struct ElevenLabsSynthesizer {
    client: reqwest::Client,
    api_key: String,
    voice_id: String,
    model_id: String,
    stability: f32,
    similarity_boost: f32,
}

impl ElevenLabsSynthesizer {
    /// Build a client with an explicit key and the config's voice settings.
    pub fn new(api_key: impl Into<String>, config: &RunConfig) -> Result<Self, NarrationError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            NarrationError::ProviderClientFailed {
                provider: "elevenlabs".to_string(),
                detail: e.to_string(),
            }
        })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            voice_id: config.voice_id.clone(),
            model_id: config.speech_model.clone(),
            stability: config.voice_stability,
            similarity_boost: config.voice_similarity,
        })
    }

    /// Build a client from the `ELEVENLABS_API_KEY` environment variable.
    ///
    /// Unlike the transcription credential this is not checked at startup;
    /// its absence surfaces only when synthesis is attempted.
    pub fn from_env(config: &RunConfig) -> Result<Self, NarrationError> {
        let key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(NarrationError::MissingSpeechKey {
                env_var: API_KEY_ENV,
            })?;
        Self::new(key, config)
    }

    fn endpoint(&self) -> String {
        format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}/with-timestamps",
            self.voice_id
        )
    }
}

#[derive(Deserialize)]
struct SynthesisResponse {
    audio_base64: String,
}

#[async_trait]
impl SpeechProvider for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisFailure> {
        let body = json!({
            "text": text,
            "model_id": self.model_id,
            "voice_settings": {
                "stability": self.stability,
                "similarity_boost": self.similarity_boost,
            },
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SynthesisFailure::RequestFailed {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisFailure::ProviderStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SynthesisResponse =
            response
                .json()
                .await
                .map_err(|e| SynthesisFailure::MalformedPayload {
                    detail: e.to_string(),
                })?;

        let audio =
            STANDARD
                .decode(&parsed.audio_base64)
                .map_err(|e| SynthesisFailure::MalformedPayload {
                    detail: format!("audio_base64 did not decode: {e}"),
                })?;

        debug!("Synthesized {} bytes of audio", audio.len());
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_embeds_voice_id() {
        let config = RunConfig::builder().voice_id("abc123").build().unwrap();
        let synth = ElevenLabsSynthesizer::new("key", &config).unwrap();
        assert_eq!(
            synth.endpoint(),
            "https://api.elevenlabs.io/v1/text-to-speech/abc123/with-timestamps"
        );
    }

    #[test]
    fn response_payload_decodes() {
        let raw = format!(r#"{{"audio_base64":"{}"}}"#, STANDARD.encode(b"mp3data"));
        let parsed: SynthesisResponse = serde_json::from_str(&raw).unwrap();
        assert_eq!(STANDARD.decode(parsed.audio_base64).unwrap(), b"mp3data");
    }
}
