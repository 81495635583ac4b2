//! Page discovery: find image files and attach a capture timestamp.
//!
//! ## Timestamp policy
//!
//! Scanned pages usually come off a phone camera, so EXIF DateTimeOriginal is
//! the best available ordering signal. It is an explicit two-step fallible
//! lookup: try the EXIF tag first, and on *any* failure of that lookup —
//! unreadable file, format without EXIF support, missing tag, malformed
//! value — fall back to the file's modification time. The fallback is never
//! an error; a page always gets exactly one timestamp. Timestamps are used
//! only for relative ordering and are never assumed accurate in absolute
//! terms.

use crate::config::IMAGE_EXTENSIONS;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use exif::{In, Tag, Value};
use std::fs;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A discovered page image with its best-effort capture timestamp.
#[derive(Debug, Clone)]
pub struct LocatedPage {
    pub path: PathBuf,
    pub timestamp: NaiveDateTime,
}

/// Discover page images in `dir` (non-recursive).
///
/// Files are matched against the case-insensitive extension allowlist and
/// listed in file-name order, so the discovery order — and therefore the
/// sequencer's tie-break — is reproducible across runs and platforms.
pub fn locate_pages(dir: &Path) -> io::Result<Vec<LocatedPage>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_page_image(p))
        .collect();
    files.sort();

    let mut pages = Vec::with_capacity(files.len());
    for path in files {
        let timestamp = page_timestamp(&path)?;
        trace!("Located {} @ {}", path.display(), timestamp);
        pages.push(LocatedPage { path, timestamp });
    }

    debug!("Located {} page images in {}", pages.len(), dir.display());
    Ok(pages)
}

/// Whether the file extension is on the image allowlist (case-insensitive).
pub fn is_page_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| *known == lower)
        })
        .unwrap_or(false)
}

/// Best-effort capture timestamp: EXIF DateTimeOriginal, else file mtime.
///
/// The only error path is the mtime lookup itself failing; EXIF problems are
/// always recoverable.
pub fn page_timestamp(path: &Path) -> io::Result<NaiveDateTime> {
    if let Some(ts) = exif_timestamp(path) {
        return Ok(ts);
    }
    mtime_timestamp(path)
}

/// Read EXIF DateTimeOriginal, `None` on any failure.
fn exif_timestamp(path: &Path) -> Option<NaiveDateTime> {
    let file = fs::File::open(path).ok()?;
    let mut reader = BufReader::new(&file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    let field = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY)?;

    let ascii = match &field.value {
        Value::Ascii(values) => values.first()?,
        _ => return None,
    };
    let dt = exif::DateTime::from_ascii(ascii).ok()?;

    NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))?
        .and_hms_opt(
            u32::from(dt.hour),
            u32::from(dt.minute),
            u32::from(dt.second),
        )
}

/// Filesystem modification time as a naive local datetime.
fn mtime_timestamp(path: &Path) -> io::Result<NaiveDateTime> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}
