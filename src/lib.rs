//! # scan2speech
//!
//! Turn archives of scanned book pages into a narrated audio transcript.
//!
//! ## Why this crate?
//!
//! A box of phone-photographed book pages is useless to a blind reader: the
//! files are unordered, inconsistently framed, and unreadable by a screen
//! reader. This crate recovers reading order from capture timestamps,
//! normalizes every page onto a fixed canvas, has a vision model transcribe
//! each page verbatim, and synthesizes the whole transcript into audio.
//!
//! ## Pipeline Overview
//!
//! ```text
//! archives (*.zip)
//!  │
//!  ├─ 1. Extract    unpack each archive into a shared working directory
//!  ├─ 2. Locate     find page images, attach EXIF-or-mtime timestamps
//!  ├─ 3. Sequence   descending timestamp → photo1..photoN reading order
//!  ├─ 4. Normalize  center-crop + resize onto the 951×1268 canvas
//!  ├─ 5. Transcribe sequential vision calls, operator checkpoint every 20
//!  ├─ 6. Persist    script_<timestamp>.txt (double-newline separated)
//!  └─ 7. Synthesize full transcript → audio_<timestamp>.mp3
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scan2speech::{narrate, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials come from ANTHROPIC_API_KEY / ELEVENLABS_API_KEY.
//!     let config = RunConfig::default();
//!     let output = narrate("scans/", &config).await?;
//!     println!("{} pages transcribed", output.stats.pages_transcribed);
//!     if let Some(audio) = output.audio_path {
//!         println!("narration: {}", audio.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! | Failure | Effect |
//! |---------|--------|
//! | EXIF unreadable | page ordered by file mtime |
//! | archive corrupt | that archive skipped |
//! | page transcription empty/failed | placeholder text, run continues |
//! | operator declines checkpoint | graceful stop, partial transcript kept |
//! | synthesis non-success | transcript kept, no audio artifact |
//! | transcription credential missing | fatal at startup |
//!
//! No automatic retries anywhere: every provider failure is surfaced once
//! and handled by the policy above.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `scan2speech` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! scan2speech = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod output;
pub mod persist;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod providers;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use checkpoint::{AlwaysContinue, CheckpointDecision, CheckpointPolicy, ConsoleCheckpoint, StopAfter};
pub use config::{RunConfig, RunConfigBuilder, IMAGE_EXTENSIONS, PLACEHOLDER_TEXT};
pub use error::{NarrationError, PageFailure, SynthesisFailure};
pub use output::{PageTranscription, RunOutput, RunStats};
pub use progress::{NoopProgress, RunProgress};
pub use providers::{
    AnthropicTranscriber, ElevenLabsSynthesizer, SpeechProvider, TranscriptionError,
    TranscriptionProvider,
};
pub use run::{narrate, narrate_sync};
