//! Artifact persistence: timestamped, write-once transcript and audio files.
//!
//! Both artifacts are named by run timestamp (`script_<DD.MM_HH-MM>.txt`,
//! `audio_<DD.MM_HH-MM>.mp3`) under their configured directories, which are
//! created if absent. Writes go through a temp file and a rename so a crash
//! mid-write never leaves a partial artifact behind.

use crate::error::{NarrationError, SynthesisFailure};
use crate::output::PageTranscription;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;

/// Artifact timestamp, minute resolution: `04.03_16-45`.
pub fn artifact_timestamp() -> String {
    Local::now().format("%d.%m_%H-%M").to_string()
}

/// The full transcript: every page's text joined with blank lines, in
/// sequence order. This is both the persisted artifact body and the
/// synthesis input.
pub fn join_transcriptions(pages: &[PageTranscription]) -> String {
    pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Write the transcript artifact, returning its path.
pub async fn write_transcript(
    pages: &[PageTranscription],
    dir: &Path,
) -> Result<PathBuf, NarrationError> {
    let path = dir.join(format!("script_{}.txt", artifact_timestamp()));
    let mut body = join_transcriptions(pages);
    body.push('\n');

    write_atomic(&path, body.as_bytes())
        .await
        .map_err(|e| NarrationError::ArtifactWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    info!("Transcriptions saved to {}", path.display());
    Ok(path)
}

/// Write the narration artifact, returning its path.
pub async fn write_audio(audio: &[u8], dir: &Path) -> Result<PathBuf, SynthesisFailure> {
    let path = dir.join(format!("audio_{}.mp3", artifact_timestamp()));

    write_atomic(&path, audio)
        .await
        .map_err(|e| SynthesisFailure::WriteFailed {
            path: path.clone(),
            source: e,
        })?;

    info!("Audio saved to {}", path.display());
    Ok(path)
}

/// Create the parent directory, write to a temp sibling, then rename.
async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}
