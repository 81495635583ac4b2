//! Pipeline stages for archive-to-narration conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different archive format) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! archive ──▶ locate ──▶ sequence ──▶ normalize ──▶ encode
//! (zip)       (exif/     (descending  (crop+resize  (base64)
//!              mtime)     timestamp)   to canvas)
//! ```
//!
//! 1. [`archive`]  — walk every zip in the input directory, extract each into
//!    the shared working directory, and drive the other stages
//! 2. [`locate`]   — discover page images and attach a best-effort capture
//!    timestamp (EXIF DateTimeOriginal, falling back to file mtime)
//! 3. [`sequence`] — establish canonical reading order: descending timestamp,
//!    stable ties, `photoN.<ext>` names
//! 4. [`normalize`] — center-crop to the target aspect and resize onto the
//!    fixed canvas
//! 5. [`encode`]   — wrap the normalized file as a base64 payload for the
//!    transcription provider

pub mod archive;
pub mod encode;
pub mod locate;
pub mod normalize;
pub mod sequence;
