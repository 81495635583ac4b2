//! Page sequencing: canonical reading order from capture timestamps.
//!
//! ## Why descending?
//!
//! Source archives are authored by photographing pages back-to-front, so the
//! most recently captured image is the first page of the book. Sorting by
//! timestamp *descending* recovers reading order. This is a deliberate policy
//! of the ordering pipeline, not an accident of implementation.
//!
//! Ties keep discovery order: the sort is stable, and discovery order itself
//! is file-name order (see [`crate::pipeline::locate`]), so repeated runs on
//! unchanged files produce identical sequences.

use crate::pipeline::locate::LocatedPage;
use std::path::PathBuf;

/// A page with its assigned position in reading order.
#[derive(Debug, Clone)]
pub struct SequencedPage {
    /// Path of the source image inside the extracted archive.
    pub source: PathBuf,

    /// File name of the source image.
    pub source_name: String,

    /// Assigned name, `photoN.<ext>` with the source extension preserved.
    pub assigned_name: String,

    /// 1-based run-wide sequence number.
    pub seq: usize,
}

/// Order one archive's pages and assign sequence numbers.
///
/// `seq_offset` is the number of pages already sequenced by earlier archives
/// in the run; the archive walker uses it to renumber globally while each
/// archive stays internally ordered and contiguous.
pub fn sequence_pages(mut pages: Vec<LocatedPage>, seq_offset: usize) -> Vec<SequencedPage> {
    // sort_by is stable: equal timestamps keep discovery order.
    pages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    pages
        .into_iter()
        .enumerate()
        .map(|(i, page)| {
            let seq = seq_offset + i + 1;
            let ext = page
                .path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("jpg")
                .to_ascii_lowercase();
            let source_name = page
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            SequencedPage {
                source: page.path,
                source_name,
                assigned_name: format!("photo{seq}.{ext}"),
                seq,
            }
        })
        .collect()
}
