//! Configuration types for a narration run.
//!
//! All run behaviour is controlled through [`RunConfig`], built via its
//! [`RunConfigBuilder`]. Keeping every knob in one struct makes it trivial to
//! share configs across stages, serialise them for logging, and diff two runs
//! to understand why their outputs differ. Nothing in the pipeline reads
//! process-wide state: what the config does not carry, the pipeline does not
//! know.

use crate::checkpoint::{AlwaysContinue, CheckpointPolicy};
use crate::error::NarrationError;
use crate::progress::{NoopProgress, RunProgress};
use crate::providers::{SpeechProvider, TranscriptionProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// File extensions recognised as scanned pages, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Text recorded for a page whose transcription yielded no usable content.
pub const PLACEHOLDER_TEXT: &str = "[No transcription available]";

/// Configuration for one archive-to-narration run.
///
/// Built via [`RunConfig::builder()`] or [`RunConfig::default()`].
///
/// # Example
/// ```rust
/// use scan2speech::RunConfig;
///
/// let config = RunConfig::builder()
///     .canvas(951, 1268)
///     .checkpoint_interval(20)
///     .voice_id("G17SuINrv2H9FC6nvetn")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// Target canvas width in pixels. Default: 951.
    pub canvas_width: u32,

    /// Target canvas height in pixels. Default: 1268.
    ///
    /// 951×1268 is a portrait book-page canvas at roughly 150 DPI. Every
    /// normalized page is exactly this size, so the transcription provider
    /// sees a consistent geometry regardless of how the pages were scanned.
    pub canvas_height: u32,

    /// JPEG quality for normalized output images. Range: 1–100. Default: 95.
    pub jpeg_quality: u8,

    /// Number of transcribed pages between operator checkpoints. Default: 20.
    ///
    /// Transcription is a paid, sequential operation; the checkpoint gives an
    /// operator a periodic chance to stop a runaway or mis-ordered run while
    /// keeping everything transcribed so far.
    pub checkpoint_interval: usize,

    /// Transcription model identifier. Default: "claude-3-5-sonnet-20240620".
    pub transcription_model: String,

    /// Maximum tokens the transcription provider may generate per page. Default: 2000.
    pub max_tokens: usize,

    /// Speech-synthesis voice identifier. Default: "G17SuINrv2H9FC6nvetn" (Christopher).
    pub voice_id: String,

    /// Speech-synthesis model identifier. Default: "eleven_turbo_v2_5".
    pub speech_model: String,

    /// Voice stability parameter sent to the speech provider. Default: 0.5.
    pub voice_stability: f32,

    /// Voice similarity-boost parameter sent to the speech provider. Default: 0.75.
    pub voice_similarity: f32,

    /// Directory that receives transcript artifacts. Created if absent.
    /// Default: "transcripts".
    pub transcripts_dir: PathBuf,

    /// Directory that receives audio artifacts. Created if absent.
    /// Default: "audio".
    pub audio_dir: PathBuf,

    /// Custom transcription instruction. If None, uses the built-in default
    /// from [`crate::prompts`].
    pub instruction: Option<String>,

    /// Checkpoint policy consulted every `checkpoint_interval` pages.
    ///
    /// The library default never pauses ([`AlwaysContinue`]), which keeps
    /// headless use and tests non-interactive. The CLI installs a console
    /// Y/N prompt.
    pub checkpoint: Arc<dyn CheckpointPolicy>,

    /// Progress reporter receiving per-page pipeline events.
    pub progress: Arc<dyn RunProgress>,

    /// Pre-constructed transcription provider. Takes precedence over the
    /// environment credential; lets callers substitute mocks or middleware.
    pub transcriber: Option<Arc<dyn TranscriptionProvider>>,

    /// Pre-constructed speech provider. Takes precedence over the
    /// environment credential.
    pub synthesizer: Option<Arc<dyn SpeechProvider>>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            canvas_width: 951,
            canvas_height: 1268,
            jpeg_quality: 95,
            checkpoint_interval: 20,
            transcription_model: "claude-3-5-sonnet-20240620".to_string(),
            max_tokens: 2000,
            voice_id: "G17SuINrv2H9FC6nvetn".to_string(),
            speech_model: "eleven_turbo_v2_5".to_string(),
            voice_stability: 0.5,
            voice_similarity: 0.75,
            transcripts_dir: PathBuf::from("transcripts"),
            audio_dir: PathBuf::from("audio"),
            instruction: None,
            checkpoint: Arc::new(AlwaysContinue),
            progress: Arc::new(NoopProgress),
            transcriber: None,
            synthesizer: None,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("canvas_width", &self.canvas_width)
            .field("canvas_height", &self.canvas_height)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("checkpoint_interval", &self.checkpoint_interval)
            .field("transcription_model", &self.transcription_model)
            .field("max_tokens", &self.max_tokens)
            .field("voice_id", &self.voice_id)
            .field("speech_model", &self.speech_model)
            .field("transcripts_dir", &self.transcripts_dir)
            .field("audio_dir", &self.audio_dir)
            .field("checkpoint", &"<dyn CheckpointPolicy>")
            .field("transcriber", &self.transcriber.as_ref().map(|_| "<dyn TranscriptionProvider>"))
            .field("synthesizer", &self.synthesizer.as_ref().map(|_| "<dyn SpeechProvider>"))
            .finish()
    }
}

impl RunConfig {
    /// Create a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: Self::default(),
        }
    }

    /// The target aspect ratio W/H used by the geometry normalizer.
    pub fn target_ratio(&self) -> f64 {
        f64::from(self.canvas_width) / f64::from(self.canvas_height)
    }
}

/// Builder for [`RunConfig`].
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn canvas(mut self, width: u32, height: u32) -> Self {
        self.config.canvas_width = width;
        self.config.canvas_height = height;
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn checkpoint_interval(mut self, n: usize) -> Self {
        self.config.checkpoint_interval = n.max(1);
        self
    }

    pub fn transcription_model(mut self, model: impl Into<String>) -> Self {
        self.config.transcription_model = model.into();
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn voice_id(mut self, id: impl Into<String>) -> Self {
        self.config.voice_id = id.into();
        self
    }

    pub fn speech_model(mut self, model: impl Into<String>) -> Self {
        self.config.speech_model = model.into();
        self
    }

    pub fn voice_settings(mut self, stability: f32, similarity: f32) -> Self {
        self.config.voice_stability = stability.clamp(0.0, 1.0);
        self.config.voice_similarity = similarity.clamp(0.0, 1.0);
        self
    }

    pub fn transcripts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.transcripts_dir = dir.into();
        self
    }

    pub fn audio_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.audio_dir = dir.into();
        self
    }

    pub fn instruction(mut self, text: impl Into<String>) -> Self {
        self.config.instruction = Some(text.into());
        self
    }

    pub fn checkpoint(mut self, policy: Arc<dyn CheckpointPolicy>) -> Self {
        self.config.checkpoint = policy;
        self
    }

    pub fn progress(mut self, reporter: Arc<dyn RunProgress>) -> Self {
        self.config.progress = reporter;
        self
    }

    pub fn transcriber(mut self, provider: Arc<dyn TranscriptionProvider>) -> Self {
        self.config.transcriber = Some(provider);
        self
    }

    pub fn synthesizer(mut self, provider: Arc<dyn SpeechProvider>) -> Self {
        self.config.synthesizer = Some(provider);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RunConfig, NarrationError> {
        let c = &self.config;
        if c.canvas_width == 0 || c.canvas_height == 0 {
            return Err(NarrationError::InvalidConfig(format!(
                "Canvas dimensions must be non-zero, got {}x{}",
                c.canvas_width, c.canvas_height
            )));
        }
        if c.checkpoint_interval == 0 {
            return Err(NarrationError::InvalidConfig(
                "Checkpoint interval must be ≥ 1".into(),
            ));
        }
        if c.jpeg_quality == 0 || c.jpeg_quality > 100 {
            return Err(NarrationError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        Ok(self.config)
    }
}

/// Loggable snapshot of a [`RunConfig`], without the checkpoint capability.
///
/// Emitted once at run start so two runs can be diffed from their logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub jpeg_quality: u8,
    pub checkpoint_interval: usize,
    pub transcription_model: String,
    pub voice_id: String,
    pub speech_model: String,
}

impl From<&RunConfig> for ConfigSnapshot {
    fn from(c: &RunConfig) -> Self {
        Self {
            canvas_width: c.canvas_width,
            canvas_height: c.canvas_height,
            jpeg_quality: c.jpeg_quality,
            checkpoint_interval: c.checkpoint_interval,
            transcription_model: c.transcription_model.clone(),
            voice_id: c.voice_id.clone(),
            speech_model: c.speech_model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_book_page_canvas() {
        let c = RunConfig::default();
        assert_eq!(c.canvas_width, 951);
        assert_eq!(c.canvas_height, 1268);
        assert_eq!(c.checkpoint_interval, 20);
        assert_eq!(c.jpeg_quality, 95);
    }

    #[test]
    fn builder_clamps_quality() {
        let c = RunConfig::builder().jpeg_quality(200).build().unwrap();
        assert_eq!(c.jpeg_quality, 100);
    }

    #[test]
    fn zero_canvas_rejected() {
        let mut c = RunConfig::default();
        c.canvas_width = 0;
        let err = RunConfigBuilder { config: c }.build();
        assert!(matches!(err, Err(NarrationError::InvalidConfig(_))));
    }

    #[test]
    fn target_ratio_is_width_over_height() {
        let c = RunConfig::builder().canvas(200, 100).build().unwrap();
        assert!((c.target_ratio() - 2.0).abs() < f64::EPSILON);
    }
}
