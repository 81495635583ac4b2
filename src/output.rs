//! Output types: per-page transcriptions, run statistics, and the final
//! [`RunOutput`] returned by [`crate::run::narrate`].

use crate::error::PageFailure;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The transcription of one page, in canonical reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTranscription {
    /// 1-based position in the run-wide reading order.
    pub seq: usize,

    /// File name of the page as it appeared inside its archive.
    pub source_name: String,

    /// Name assigned after sequencing, `photoN.<ext>`.
    pub assigned_name: String,

    /// Transcribed text, or the placeholder when `failure` is set.
    pub text: String,

    /// Present when this page yielded no usable transcription and `text`
    /// holds the placeholder instead.
    pub failure: Option<PageFailure>,
}

impl PageTranscription {
    /// Whether this page carries real provider text rather than a placeholder.
    pub fn is_transcribed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Statistics for one complete run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Archives found in the input directory.
    pub archives: usize,

    /// Archives that failed to extract and were skipped.
    pub archives_skipped: usize,

    /// Pages discovered and normalized across all archives.
    pub pages_discovered: usize,

    /// Pages sent to the transcription provider (≤ discovered when the
    /// operator stopped early).
    pub pages_transcribed: usize,

    /// Pages recorded with a placeholder instead of provider text.
    pub placeholder_pages: usize,

    /// Wall-clock time for extraction and normalization.
    pub extract_duration_ms: u64,

    /// Wall-clock time for the transcription stage.
    pub transcribe_duration_ms: u64,

    /// Wall-clock time for the synthesis stage (0 when skipped or failed).
    pub synthesis_duration_ms: u64,

    /// Wall-clock time for the whole run.
    pub total_duration_ms: u64,
}

/// Result of one archive-to-narration run.
///
/// Returned even when synthesis fails (`audio_path` is then `None`) or when
/// the operator stopped early (`stopped_at_checkpoint` is `true` and `pages`
/// holds only the work completed before the stop).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// All transcriptions in sequence order, double-newline joined.
    pub transcript: String,

    /// Path of the persisted transcript artifact. `None` only when the run
    /// discovered no pages at all.
    pub transcript_path: Option<PathBuf>,

    /// Path of the persisted narration artifact. `None` when synthesis was
    /// skipped (no pages) or reported a failure.
    pub audio_path: Option<PathBuf>,

    /// Per-page transcriptions, ordered by `seq`.
    pub pages: Vec<PageTranscription>,

    /// True when the operator declined a checkpoint and the run stopped early.
    pub stopped_at_checkpoint: bool,

    /// Run statistics.
    pub stats: RunStats,
}

impl RunOutput {
    /// An output for a run that found nothing to do.
    pub fn empty(stats: RunStats) -> Self {
        Self {
            transcript: String::new(),
            transcript_path: None,
            audio_path: None,
            pages: Vec::new(),
            stopped_at_checkpoint: false,
            stats,
        }
    }
}
