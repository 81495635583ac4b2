//! End-to-end run orchestration: extract → transcribe → synthesize.
//!
//! ## Stage policy
//!
//! The three stages degrade independently:
//!
//! * extraction problems skip one archive;
//! * a page whose transcription yields nothing gets the placeholder text and
//!   the run continues;
//! * a synthesis failure costs only the audio artifact.
//!
//! Only a missing transcription credential (checked before any work) or an
//! unwritable transcript artifact is fatal. Processing is strictly
//! sequential: one provider call in flight at a time, results in page order,
//! no reordering downstream.

use crate::config::{RunConfig, PLACEHOLDER_TEXT};
use crate::checkpoint::CheckpointDecision;
use crate::error::{NarrationError, PageFailure};
use crate::output::{PageTranscription, RunOutput, RunStats};
use crate::persist;
use crate::pipeline::archive::{self, NormalizedPage, WalkReport};
use crate::pipeline::encode;
use crate::providers::{
    anthropic::effective_instruction, AnthropicTranscriber, ElevenLabsSynthesizer, SpeechProvider,
    TranscriptionProvider,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Convert every archive under `input_dir` into a narrated transcript.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(RunOutput)` on success, even when some pages got placeholders, the
/// operator stopped early, or synthesis failed (check
/// `output.stats`, `output.stopped_at_checkpoint`, `output.audio_path`).
///
/// # Errors
/// Returns `Err(NarrationError)` only for fatal conditions: missing input
/// directory, missing transcription credential, or an unwritable transcript
/// artifact.
pub async fn narrate(
    input_dir: impl AsRef<Path>,
    config: &RunConfig,
) -> Result<RunOutput, NarrationError> {
    let total_start = Instant::now();
    let input_dir = input_dir.as_ref();
    info!(config = ?crate::config::ConfigSnapshot::from(config), "Starting run: {}", input_dir.display());

    if !input_dir.is_dir() {
        return Err(NarrationError::InputDirNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    // ── Step 1: Resolve the transcription provider ───────────────────────
    // Before any extraction work: a missing credential must fail fast.
    let transcriber = resolve_transcriber(config)?;

    // ── Step 2: Walk archives into the ordered page list ─────────────────
    let archives = archive::list_archives(input_dir).map_err(|e| {
        NarrationError::ListArchivesFailed {
            path: input_dir.to_path_buf(),
            source: e,
        }
    })?;
    config.progress.on_run_start(archives.len());

    // One shared working directory per run, removed on drop no matter how
    // the run ends.
    let work_dir = tempfile::TempDir::new().map_err(|e| NarrationError::WorkDirFailed { source: e })?;

    let extract_start = Instant::now();
    let report = {
        let archives = archives.clone();
        let work_path = work_dir.path().to_path_buf();
        let config = config.clone();
        tokio::task::spawn_blocking(move || {
            archive::walk_archives(&archives, &work_path, &config, &*config.progress)
        })
        .await
        .map_err(|e| NarrationError::Internal(format!("Extraction task panicked: {e}")))?
    };
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        "Extraction complete: {} pages from {} archives ({} skipped) in {}ms",
        report.pages.len(),
        report.archives,
        report.archives_skipped,
        extract_duration_ms
    );

    let mut stats = RunStats {
        archives: report.archives,
        archives_skipped: report.archives_skipped,
        pages_discovered: report.pages.len(),
        extract_duration_ms,
        ..RunStats::default()
    };

    if report.pages.is_empty() {
        info!("No images found to transcribe");
        stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        config.progress.on_run_complete(0, 0);
        return Ok(RunOutput::empty(stats));
    }

    // ── Step 3: Transcribe sequentially with operator checkpoints ────────
    let transcribe_start = Instant::now();
    let (pages, stopped) = transcribe_pages(&transcriber, &report, config).await;
    stats.transcribe_duration_ms = transcribe_start.elapsed().as_millis() as u64;
    stats.pages_transcribed = pages.len();
    stats.placeholder_pages = pages.iter().filter(|p| !p.is_transcribed()).count();

    // ── Step 4: Persist the transcript artifact ──────────────────────────
    let transcript_path = persist::write_transcript(&pages, &config.transcripts_dir).await?;
    let transcript = persist::join_transcriptions(&pages);

    // ── Step 5: Synthesize narration ─────────────────────────────────────
    let synthesis_start = Instant::now();
    config.progress.on_synthesis_start(transcript.len());
    let audio_path = match synthesize(&transcript, config).await {
        Ok(path) => {
            stats.synthesis_duration_ms = synthesis_start.elapsed().as_millis() as u64;
            Some(path)
        }
        Err(e) => {
            warn!("Speech synthesis failed: {e}");
            None
        }
    };

    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Run complete: {}/{} pages transcribed, {}ms total",
        stats.pages_transcribed, stats.pages_discovered, stats.total_duration_ms
    );
    config
        .progress
        .on_run_complete(stats.pages_transcribed, stats.pages_discovered);

    Ok(RunOutput {
        transcript,
        transcript_path: Some(transcript_path),
        audio_path,
        pages,
        stopped_at_checkpoint: stopped,
        stats,
    })
}

/// Synchronous wrapper around [`narrate`].
///
/// Creates a temporary tokio runtime internally.
pub fn narrate_sync(
    input_dir: impl AsRef<Path>,
    config: &RunConfig,
) -> Result<RunOutput, NarrationError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| NarrationError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(narrate(input_dir, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Provider resolution: the injected instance wins, else the environment.
fn resolve_transcriber(
    config: &RunConfig,
) -> Result<Arc<dyn TranscriptionProvider>, NarrationError> {
    if let Some(ref provider) = config.transcriber {
        return Ok(Arc::clone(provider));
    }
    Ok(Arc::new(AnthropicTranscriber::from_env(config)?))
}

/// Sequential transcription loop with the periodic operator checkpoint.
///
/// Returns the transcriptions completed (all of them, or the prefix done
/// before a declined checkpoint) and whether the operator stopped the run.
async fn transcribe_pages(
    provider: &Arc<dyn TranscriptionProvider>,
    report: &WalkReport,
    config: &RunConfig,
) -> (Vec<PageTranscription>, bool) {
    let total = report.pages.len();
    let instruction = effective_instruction(config);
    config.progress.on_transcription_start(total);

    let mut pages = Vec::with_capacity(total);
    let mut stopped = false;

    for (processed, page) in report.pages.iter().enumerate().map(|(i, p)| (i + 1, p)) {
        info!("Transcribing image {processed}/{total}");

        let result = transcribe_one(provider, page, instruction).await;
        config
            .progress
            .on_page_transcribed(page.seq, total, result.failure.is_some());
        pages.push(result);

        // Checkpoint between batches; the final page needs no confirmation.
        if processed % config.checkpoint_interval == 0 && processed < total {
            match config.checkpoint.checkpoint(processed, total) {
                CheckpointDecision::Continue => {}
                CheckpointDecision::Stop => {
                    info!("Operator stopped the run after {processed}/{total} pages");
                    stopped = true;
                    break;
                }
            }
        }
    }

    (pages, stopped)
}

/// Transcribe one page. Never fails the run: every outcome becomes a
/// [`PageTranscription`], with the placeholder standing in for anything that
/// produced no usable text.
async fn transcribe_one(
    provider: &Arc<dyn TranscriptionProvider>,
    page: &NormalizedPage,
    instruction: &str,
) -> PageTranscription {
    let failure = match encode::encode_page(&page.path) {
        Err(e) => Some(PageFailure::EncodeFailed {
            seq: page.seq,
            detail: e.to_string(),
        }),
        Ok(encoded) => match provider.transcribe(page.seq, &encoded, instruction).await {
            Ok(Some(text)) => {
                return PageTranscription {
                    seq: page.seq,
                    source_name: page.source_name.clone(),
                    assigned_name: page.assigned_name.clone(),
                    text,
                    failure: None,
                };
            }
            Ok(None) => Some(PageFailure::EmptyResponse { seq: page.seq }),
            Err(e) => Some(PageFailure::ProviderFailed {
                seq: page.seq,
                detail: e.to_string(),
            }),
        },
    };

    if let Some(ref f) = failure {
        warn!("{f}; recording placeholder");
    }

    PageTranscription {
        seq: page.seq,
        source_name: page.source_name.clone(),
        assigned_name: page.assigned_name.clone(),
        text: PLACEHOLDER_TEXT.to_string(),
        failure,
    }
}

/// Run the synthesis stage: resolve the provider, call it, persist the audio.
async fn synthesize(
    transcript: &str,
    config: &RunConfig,
) -> Result<std::path::PathBuf, crate::error::SynthesisFailure> {
    let provider: Arc<dyn SpeechProvider> = if let Some(ref p) = config.synthesizer {
        Arc::clone(p)
    } else {
        Arc::new(
            ElevenLabsSynthesizer::from_env(config)
                .map_err(|e| crate::error::SynthesisFailure::NotConfigured(e.to_string()))?,
        )
    };

    info!("Starting speech synthesis ({} chars)", transcript.len());
    let audio = provider.synthesize(transcript).await?;
    persist::write_audio(&audio, &config.audio_dir).await
}
