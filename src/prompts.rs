//! Prompt text for the vision transcription provider.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tightening the verbatim-transcription
//!    rules or the visual-description policy requires editing exactly one
//!    place.
//!
//! 2. **Testability** — unit tests can inspect the instruction directly
//!    without calling a real provider.
//!
//! Callers can override the instruction via
//! [`crate::config::RunConfig::instruction`]; the constants here are used
//! only when no override is provided.

/// System message sent with every transcription request.
pub const SYSTEM_PROMPT: &str = "Respond only in English only.";

/// Default per-page transcription instruction.
///
/// The transcript is read aloud to a listener verbatim, so the instruction
/// forbids any meta-text ("Body text:", page-layout commentary) and allows
/// generated prose only for meaningful visual elements such as graphs and
/// images.
pub const TRANSCRIBE_INSTRUCTION: &str = r#"You are to transcribe a scanned page from a book to make it available to a blind person as an audiobook.
Your task is to provide a detailed transcription of the page without altering the actual text content. Your answer will be read directly without modification, so do not write syntax or descriptions that are not in the book: instead of 'Body text: I am lingren...' start reading the text verbatim 'I am lingren...'.
Please include the following:
Text content: Transcribe all text on the page exactly as it appears, without editing or rewriting or adding testimonials.
Descriptions of visual elements: This is the only exception where you can create your own text. You should create detailed descriptions of any visual elements on the page, such as graphs, images or charts. Describe what they represent, how they are designed, and any relevant information that may be important to someone who cannot see them.
YOU SHOULD ONLY DESCRIBE THINGS THAT ARE NECESSARY LIKE GRAPHS OR IMAGES. DO NOT DESCRIBE THINGS LIKE PAGE NUMBERS, LAYOUT OF THE PAGE ETC.
Make sure the transcript is comprehensive and provides all the necessary context to convey the content as accurately and accessibly as possible."#;

/// Label block preceding the image in each request, e.g. `Image 7:`.
pub fn page_label(seq: usize) -> String {
    format!("Image {seq}:")
}
