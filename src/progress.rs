//! Progress-reporting trait for per-page pipeline events.
//!
//! Inject an `Arc<dyn RunProgress>` via
//! [`crate::config::RunConfigBuilder::progress`] to receive events as the
//! pipeline normalizes and transcribes each page. The callback approach keeps
//! the library ignorant of how the host presents progress: the CLI forwards
//! events to a terminal progress bar, tests count them, and the default
//! implementation does nothing.
//!
//! All methods have default no-op bodies so implementations override only
//! what they care about. The pipeline is strictly sequential, so methods are
//! never called concurrently; `Send + Sync` is still required because the
//! extraction stage runs on a blocking worker thread.

use std::sync::Arc;

/// Called by the pipeline as it processes each page.
pub trait RunProgress: Send + Sync {
    /// Called once after the input directory has been listed.
    fn on_run_start(&self, archives: usize) {
        let _ = archives;
    }

    /// Called for every page normalized inside one archive.
    ///
    /// `index`/`archive_total` count within the current archive; `source` and
    /// `assigned` are the original and assigned file names.
    fn on_page_normalized(&self, index: usize, archive_total: usize, source: &str, assigned: &str) {
        let _ = (index, archive_total, source, assigned);
    }

    /// Called once before the first transcription request.
    fn on_transcription_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each page's transcription is recorded.
    ///
    /// `placeholder` is true when the page got the placeholder text instead
    /// of provider content.
    fn on_page_transcribed(&self, seq: usize, total_pages: usize, placeholder: bool) {
        let _ = (seq, total_pages, placeholder);
    }

    /// Called once when the speech-synthesis request is about to be sent.
    fn on_synthesis_start(&self, transcript_chars: usize) {
        let _ = transcript_chars;
    }

    /// Called once at the end of the run.
    fn on_run_complete(&self, transcribed: usize, discovered: usize) {
        let _ = (transcribed, discovered);
    }
}

/// A no-op implementation, the default when no reporter is configured.
pub struct NoopProgress;

impl RunProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::RunConfig`].
pub type SharedProgress = Arc<dyn RunProgress>;
