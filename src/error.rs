//! Error types for the scan2speech library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`NarrationError`] — **Fatal**: the run cannot proceed at all (input
//!   directory missing, transcription credential absent, transcript could not
//!   be written). Returned as `Err(NarrationError)` from [`crate::run::narrate`].
//!
//! * [`PageFailure`] — **Non-fatal**: a single page produced no usable result
//!   (provider call failed, response carried no text). Recorded inside
//!   [`crate::output::PageTranscription`] next to the placeholder text so
//!   callers can inspect partial success rather than losing the whole book to
//!   one bad page.
//!
//! A synthesis failure sits in between: the run still completes and the
//! transcript artifact is kept, but no audio artifact is produced. It is
//! surfaced through [`crate::output::RunOutput::audio_path`] being `None`.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the scan2speech library.
///
/// Page-level failures use [`PageFailure`] and are stored in
/// [`crate::output::PageTranscription`] rather than propagated here.
#[derive(Debug, Error)]
pub enum NarrationError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The archive input directory does not exist or is not readable.
    #[error("Input directory not found: '{path}'\nCheck the path exists and is readable.")]
    InputDirNotFound { path: PathBuf },

    /// Could not create the shared working directory for extraction.
    #[error("Failed to create working directory: {source}")]
    WorkDirFailed {
        #[source]
        source: std::io::Error,
    },

    /// Reading the input directory listing failed.
    #[error("Failed to list archives in '{path}': {source}")]
    ListArchivesFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Provider errors ───────────────────────────────────────────────────
    /// The transcription credential is missing. Fatal at startup: the run
    /// cannot transcribe a single page without it.
    #[error("Transcription provider is not configured.\nSet {env_var} in the environment.")]
    MissingTranscriptionKey { env_var: &'static str },

    /// The speech credential is missing. Only surfaced when synthesis is
    /// actually attempted, never at startup.
    #[error("Speech provider is not configured.\nSet {env_var} in the environment.")]
    MissingSpeechKey { env_var: &'static str },

    /// Could not construct the HTTP client for a provider.
    #[error("Failed to build HTTP client for provider '{provider}': {detail}")]
    ProviderClientFailed { provider: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the transcript artifact.
    #[error("Failed to write artifact '{path}': {source}")]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure for a single page.
///
/// Stored alongside [`crate::output::PageTranscription`] when a page yields
/// no usable transcription. The run continues; the page's text is the
/// configured placeholder.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageFailure {
    /// The normalized image could not be read or encoded for upload.
    #[error("Page {seq}: image encoding failed: {detail}")]
    EncodeFailed { seq: usize, detail: String },

    /// The provider call itself failed (network, non-success status).
    #[error("Page {seq}: transcription call failed: {detail}")]
    ProviderFailed { seq: usize, detail: String },

    /// The provider answered, but the response carried no text blocks.
    /// A valid outcome for a page with no transcribable content.
    #[error("Page {seq}: response contained no text content")]
    EmptyResponse { seq: usize },
}

/// Outcome of the speech-synthesis stage when it does not produce audio.
///
/// Non-fatal for the run: the transcript artifact is unaffected.
#[derive(Debug, Error)]
pub enum SynthesisFailure {
    /// The speech credential was absent when synthesis was attempted.
    #[error("Speech provider is not configured: {0}")]
    NotConfigured(String),

    /// The request could not be sent or the response not read.
    #[error("Speech synthesis request failed: {detail}")]
    RequestFailed { detail: String },

    /// The provider returned a non-success status.
    #[error("Speech synthesis failed with status {status}: {body}")]
    ProviderStatus { status: u16, body: String },

    /// The success payload could not be decoded into audio bytes.
    #[error("Speech synthesis payload was malformed: {detail}")]
    MalformedPayload { detail: String },

    /// The audio artifact could not be written.
    #[error("Failed to write audio artifact '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
