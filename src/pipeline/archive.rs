//! Archive walking: every zip in the input directory → one ordered page list.
//!
//! ## Working directory
//!
//! One `TempDir` is acquired per run and shared by every archive; each
//! archive extracts into its own subdirectory so pages from different
//! archives can never bleed into each other's discovery scans. The `TempDir`
//! is owned by the caller for the run's duration and removed on drop, so
//! cleanup happens regardless of how any individual archive fares.
//!
//! ## Ordering
//!
//! Archives are processed sorted by file name. The pages of one archive are
//! contiguous and internally ordered (descending capture timestamp); archive
//! names decide which block comes first. An archive that fails to extract is
//! skipped with a warning and aborts nothing else.

use crate::config::RunConfig;
use crate::pipeline::{locate, normalize, sequence};
use crate::progress::RunProgress;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// A page that has been located, sequenced, and normalized, ready for
/// transcription.
#[derive(Debug, Clone)]
pub struct NormalizedPage {
    /// 1-based run-wide sequence number.
    pub seq: usize,
    /// File name inside the source archive.
    pub source_name: String,
    /// Assigned name, `photoN.<ext>`.
    pub assigned_name: String,
    /// Path of the normalized canvas-sized image in the working directory.
    pub path: PathBuf,
}

/// Result of walking the input directory.
#[derive(Debug)]
pub struct WalkReport {
    /// All pages across all archives, in run-wide sequence order.
    pub pages: Vec<NormalizedPage>,
    /// Archives found.
    pub archives: usize,
    /// Archives skipped because they failed to extract or process.
    pub archives_skipped: usize,
}

/// Failure of a single archive. Skips that archive only.
#[derive(Debug, Error)]
enum ArchiveError {
    #[error("extraction failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("normalization failed for '{name}': {source}")]
    Normalize {
        name: String,
        #[source]
        source: image::ImageError,
    },
}

/// List the zip archives in `input_dir`, sorted by file name.
pub fn list_archives(input_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut archives: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case("zip"))
                    .unwrap_or(false)
        })
        .collect();
    archives.sort();
    Ok(archives)
}

/// Walk every archive, producing the run-wide ordered page list.
///
/// `work_dir` is the shared working directory for this run; the caller owns
/// its lifetime.
pub fn walk_archives(
    archives: &[PathBuf],
    work_dir: &Path,
    config: &RunConfig,
    progress: &dyn RunProgress,
) -> WalkReport {
    let mut pages: Vec<NormalizedPage> = Vec::new();
    let mut skipped = 0usize;

    for (archive_idx, archive) in archives.iter().enumerate() {
        info!("Processing archive: {}", archive.display());
        let scratch = work_dir.join(format!("archive{archive_idx}"));

        match process_archive(archive, &scratch, config, pages.len(), progress) {
            Ok(mut archive_pages) => pages.append(&mut archive_pages),
            Err(e) => {
                warn!("Skipping archive {}: {}", archive.display(), e);
                skipped += 1;
            }
        }
    }

    WalkReport {
        pages,
        archives: archives.len(),
        archives_skipped: skipped,
    }
}

/// Extract one archive and run locate → sequence → normalize on its contents.
fn process_archive(
    archive: &Path,
    scratch: &Path,
    config: &RunConfig,
    seq_offset: usize,
    progress: &dyn RunProgress,
) -> Result<Vec<NormalizedPage>, ArchiveError> {
    let file = fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    zip.extract(scratch)?;

    let located = locate::locate_pages(scratch)?;
    let sequenced = sequence::sequence_pages(located, seq_offset);
    let archive_total = sequenced.len();

    // Normalized outputs live apart from the extracted sources so an assigned
    // name can never clobber a source image that happens to share it.
    let out_dir = scratch.join("normalized");
    fs::create_dir_all(&out_dir)?;

    let mut pages = Vec::with_capacity(archive_total);
    for (i, page) in sequenced.into_iter().enumerate() {
        let out_path = out_dir.join(&page.assigned_name);
        normalize::normalize_file(&page.source, &out_path, config).map_err(|e| {
            ArchiveError::Normalize {
                name: page.source_name.clone(),
                source: e,
            }
        })?;

        info!(
            "Processed {}/{}: {} -> {}",
            i + 1,
            archive_total,
            page.source_name,
            page.assigned_name
        );
        progress.on_page_normalized(i + 1, archive_total, &page.source_name, &page.assigned_name);

        pages.push(NormalizedPage {
            seq: page.seq,
            source_name: page.source_name,
            assigned_name: page.assigned_name,
            path: out_path,
        });
    }

    Ok(pages)
}
