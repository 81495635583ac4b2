//! External provider seams: vision transcription and speech synthesis.
//!
//! Both providers sit behind object-safe async traits so the orchestration
//! code never knows which HTTP API is on the other end. Implementations are
//! responsible for wire formats, credentials, and mapping non-success
//! responses onto the error taxonomy; the pipeline only decides what each
//! outcome means for the run (placeholder page, missing audio artifact).

pub mod anthropic;
pub mod elevenlabs;

pub use anthropic::AnthropicTranscriber;
pub use elevenlabs::ElevenLabsSynthesizer;

use crate::error::SynthesisFailure;
use crate::pipeline::encode::EncodedPage;
use async_trait::async_trait;
use thiserror::Error;

/// A transcription call that could not produce a response at all.
///
/// Distinct from an empty response: a provider that answers without text
/// content returns `Ok(None)`, which is a valid non-text page.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// The request could not be sent or the response body not read.
    #[error("request failed: {detail}")]
    Request { detail: String },

    /// The provider returned a non-success status.
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The success payload did not match the expected shape.
    #[error("malformed response: {detail}")]
    Malformed { detail: String },
}

/// Vision transcription of one page image.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe one page.
    ///
    /// Returns `Ok(Some(text))` when the response carried text content,
    /// `Ok(None)` when it carried none (a valid outcome for a page with
    /// nothing transcribable), and `Err` only when the call itself failed.
    async fn transcribe(
        &self,
        seq: usize,
        image: &EncodedPage,
        instruction: &str,
    ) -> Result<Option<String>, TranscriptionError>;
}

/// Speech synthesis of the full transcript.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize `text` into encoded audio bytes (MP3).
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisFailure>;
}
