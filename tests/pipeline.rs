//! End-to-end pipeline tests for scan2speech.
//!
//! These tests build real zip archives of generated page images in temp
//! directories and run the full pipeline against scripted in-process
//! providers, so they exercise extraction, ordering, normalization,
//! checkpointing, and artifact persistence without any network access.

use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use scan2speech::pipeline::encode::EncodedPage;
use scan2speech::{
    narrate, RunConfig, SpeechProvider, StopAfter, SynthesisFailure, TranscriptionError,
    TranscriptionProvider, PLACEHOLDER_TEXT,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use zip::write::SimpleFileOptions;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn jpeg_bytes() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(60, 90, Rgb([200, 180, 160])));
    let mut buf = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut buf),
        image::ImageFormat::Jpeg,
    )
    .unwrap();
    buf
}

/// Write a zip of `count` generated page images named `<prefix>NN.jpg`.
fn write_archive(path: &Path, prefix: &str, count: usize) {
    let bytes = jpeg_bytes();
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for i in 1..=count {
        zip.start_file(format!("{prefix}{i:02}.jpg"), SimpleFileOptions::default())
            .unwrap();
        zip.write_all(&bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// Transcriber returning canned text, with selected pages answering empty.
struct ScriptedTranscriber {
    empty_pages: Vec<usize>,
    calls: AtomicUsize,
}

impl ScriptedTranscriber {
    fn new() -> Arc<Self> {
        Self::with_empty_pages(vec![])
    }

    fn with_empty_pages(empty_pages: Vec<usize>) -> Arc<Self> {
        Arc::new(Self {
            empty_pages,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TranscriptionProvider for ScriptedTranscriber {
    async fn transcribe(
        &self,
        seq: usize,
        image: &EncodedPage,
        _instruction: &str,
    ) -> Result<Option<String>, TranscriptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(!image.data.is_empty(), "page {seq} arrived without payload");
        if self.empty_pages.contains(&seq) {
            Ok(None)
        } else {
            Ok(Some(format!("Contents of page {seq}.")))
        }
    }
}

/// Speech provider returning fixed bytes.
struct CannedSpeech;

#[async_trait]
impl SpeechProvider for CannedSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisFailure> {
        assert!(!text.is_empty());
        Ok(b"fake mp3 payload".to_vec())
    }
}

/// Speech provider that always reports a provider-side failure.
struct FailingSpeech;

#[async_trait]
impl SpeechProvider for FailingSpeech {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SynthesisFailure> {
        Err(SynthesisFailure::ProviderStatus {
            status: 401,
            body: "invalid key".into(),
        })
    }
}

struct TestRun {
    _root: tempfile::TempDir,
    input: PathBuf,
    transcripts: PathBuf,
    audio: PathBuf,
}

impl TestRun {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("scans");
        let transcripts = root.path().join("transcripts");
        let audio = root.path().join("audio");
        fs::create_dir(&input).unwrap();
        Self {
            _root: root,
            input,
            transcripts,
            audio,
        }
    }

    fn config(&self) -> scan2speech::config::RunConfigBuilder {
        RunConfig::builder()
            .canvas(40, 60)
            .transcripts_dir(&self.transcripts)
            .audio_dir(&self.audio)
    }
}

fn transcript_entries(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .trim_end()
        .split("\n\n")
        .map(|s| s.to_string())
        .collect()
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_run_produces_both_artifacts_in_order() {
    let run = TestRun::new();
    write_archive(&run.input.join("book.zip"), "img", 3);

    let config = run
        .config()
        .transcriber(ScriptedTranscriber::new())
        .synthesizer(Arc::new(CannedSpeech))
        .build()
        .unwrap();

    let output = narrate(&run.input, &config).await.unwrap();

    assert_eq!(output.stats.pages_discovered, 3);
    assert_eq!(output.stats.pages_transcribed, 3);
    assert_eq!(output.stats.placeholder_pages, 0);
    assert!(!output.stopped_at_checkpoint);

    let seqs: Vec<_> = output.pages.iter().map(|p| p.seq).collect();
    assert_eq!(seqs, [1, 2, 3]);

    let entries = transcript_entries(output.transcript_path.as_ref().unwrap());
    assert_eq!(
        entries,
        [
            "Contents of page 1.",
            "Contents of page 2.",
            "Contents of page 3."
        ]
    );

    let audio_path = output.audio_path.expect("audio artifact");
    assert_eq!(fs::read(&audio_path).unwrap(), b"fake mp3 payload");
    assert!(audio_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("audio_"));
}

#[tokio::test]
async fn empty_response_mid_run_records_placeholder_and_continues() {
    let run = TestRun::new();
    write_archive(&run.input.join("book.zip"), "img", 10);

    let transcriber = ScriptedTranscriber::with_empty_pages(vec![5]);
    let config = run
        .config()
        .transcriber(transcriber.clone())
        .synthesizer(Arc::new(CannedSpeech))
        .build()
        .unwrap();

    let output = narrate(&run.input, &config).await.unwrap();

    // All ten pages were attempted despite the empty page 5.
    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 10);
    assert_eq!(output.stats.pages_transcribed, 10);
    assert_eq!(output.stats.placeholder_pages, 1);

    let page5 = &output.pages[4];
    assert_eq!(page5.seq, 5);
    assert_eq!(page5.text, PLACEHOLDER_TEXT);
    assert!(page5.failure.is_some());
    assert!(output.pages[5].failure.is_none());

    // The placeholder occupies page 5's slot in the artifact too.
    let entries = transcript_entries(output.transcript_path.as_ref().unwrap());
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[4], PLACEHOLDER_TEXT);
}

#[tokio::test]
async fn declined_checkpoint_keeps_exactly_the_completed_prefix() {
    let run = TestRun::new();
    write_archive(&run.input.join("book.zip"), "img", 50);

    let transcriber = ScriptedTranscriber::new();
    let config = run
        .config()
        .checkpoint_interval(20)
        .checkpoint(Arc::new(StopAfter(20)))
        .transcriber(transcriber.clone())
        .synthesizer(Arc::new(CannedSpeech))
        .build()
        .unwrap();

    let output = narrate(&run.input, &config).await.unwrap();

    assert!(output.stopped_at_checkpoint);
    assert_eq!(output.stats.pages_discovered, 50);
    assert_eq!(output.stats.pages_transcribed, 20);
    assert_eq!(transcriber.calls.load(Ordering::SeqCst), 20);

    let entries = transcript_entries(output.transcript_path.as_ref().unwrap());
    assert_eq!(entries.len(), 20);

    // The narration never sees pages 21–50.
    assert!(output.transcript.contains("Contents of page 20."));
    assert!(!output.transcript.contains("Contents of page 21."));
    assert!(output.audio_path.is_some());
}

#[tokio::test]
async fn synthesis_failure_keeps_the_transcript() {
    let run = TestRun::new();
    write_archive(&run.input.join("book.zip"), "img", 2);

    let config = run
        .config()
        .transcriber(ScriptedTranscriber::new())
        .synthesizer(Arc::new(FailingSpeech))
        .build()
        .unwrap();

    let output = narrate(&run.input, &config).await.unwrap();

    assert!(output.transcript_path.is_some(), "transcript must survive");
    assert!(output.audio_path.is_none(), "no audio artifact on failure");
    assert_eq!(output.stats.pages_transcribed, 2);
    assert!(!run.audio.exists() || fs::read_dir(&run.audio).unwrap().next().is_none());
}

#[tokio::test]
async fn multiple_archives_stay_contiguous_and_name_ordered() {
    let run = TestRun::new();
    write_archive(&run.input.join("b_second.zip"), "late", 2);
    write_archive(&run.input.join("a_first.zip"), "early", 2);

    let config = run
        .config()
        .transcriber(ScriptedTranscriber::new())
        .synthesizer(Arc::new(CannedSpeech))
        .build()
        .unwrap();

    let output = narrate(&run.input, &config).await.unwrap();

    assert_eq!(output.stats.archives, 2);
    assert_eq!(output.pages.len(), 4);
    // a_first.zip's pages come first because archives are name-sorted.
    assert!(output.pages[0].source_name.starts_with("early"));
    assert!(output.pages[1].source_name.starts_with("early"));
    assert!(output.pages[2].source_name.starts_with("late"));
    assert_eq!(output.pages[3].assigned_name, "photo4.jpg");
}

#[tokio::test]
async fn empty_input_completes_without_artifacts() {
    let run = TestRun::new();

    let config = run
        .config()
        .transcriber(ScriptedTranscriber::new())
        .synthesizer(Arc::new(CannedSpeech))
        .build()
        .unwrap();

    let output = narrate(&run.input, &config).await.unwrap();

    assert!(output.pages.is_empty());
    assert!(output.transcript_path.is_none());
    assert!(output.audio_path.is_none());
    assert!(!run.transcripts.exists());
}

#[tokio::test]
async fn missing_input_dir_is_fatal() {
    let run = TestRun::new();
    let config = run
        .config()
        .transcriber(ScriptedTranscriber::new())
        .build()
        .unwrap();

    let err = narrate(run.input.join("nope"), &config).await.unwrap_err();
    assert!(matches!(
        err,
        scan2speech::NarrationError::InputDirNotFound { .. }
    ));
}

#[tokio::test]
async fn missing_transcription_credential_is_fatal_at_startup() {
    // No injected transcriber, so the run falls back to the environment.
    std::env::remove_var("ANTHROPIC_API_KEY");

    let run = TestRun::new();
    write_archive(&run.input.join("book.zip"), "img", 1);
    let config = run.config().build().unwrap();

    let err = narrate(&run.input, &config).await.unwrap_err();
    assert!(matches!(
        err,
        scan2speech::NarrationError::MissingTranscriptionKey { .. }
    ));
}
