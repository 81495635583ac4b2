//! CLI binary for scan2speech.
//!
//! A thin shim over the library crate that maps CLI flags to `RunConfig`,
//! wires terminal progress and the interactive checkpoint, and prints a
//! summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use scan2speech::{
    narrate, AlwaysContinue, CheckpointDecision, CheckpointPolicy, ConsoleCheckpoint, RunConfig,
    RunProgress,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal progress ────────────────────────────────────────────────────────

/// Terminal progress: a spinner during extraction, a page-count bar during
/// transcription, per-page log lines throughout.
struct CliProgress {
    bar: ProgressBar,
    placeholders: AtomicUsize,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_transcription_start
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            placeholders: AtomicUsize::new(0),
        })
    }
}

impl RunProgress for CliProgress {
    fn on_run_start(&self, archives: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {archives} archive(s)…"))
        ));
    }

    fn on_page_normalized(&self, index: usize, archive_total: usize, source: &str, assigned: &str) {
        self.bar.println(format!(
            "  {} {}",
            dim(&format!("{index:>3}/{archive_total:<3}")),
            dim(&format!("{source} -> {assigned}")),
        ));
    }

    fn on_transcription_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Transcribing");
        self.bar.reset_eta();
    }

    fn on_page_transcribed(&self, seq: usize, total_pages: usize, placeholder: bool) {
        if placeholder {
            self.placeholders.fetch_add(1, Ordering::SeqCst);
            self.bar.println(format!(
                "  {} Page {seq:>3}/{total_pages:<3}  {}",
                yellow("⚠"),
                yellow("no text — placeholder recorded"),
            ));
        } else {
            self.bar
                .println(format!("  {} Page {seq:>3}/{total_pages:<3}", green("✓")));
        }
        self.bar.inc(1);
    }

    fn on_synthesis_start(&self, transcript_chars: usize) {
        self.bar.set_prefix("Synthesizing");
        self.bar
            .set_message(format!("{transcript_chars} chars of transcript"));
    }

    fn on_run_complete(&self, transcribed: usize, discovered: usize) {
        self.bar.finish_and_clear();
        let placeholders = self.placeholders.load(Ordering::SeqCst);
        if transcribed == discovered && placeholders == 0 {
            eprintln!(
                "{} {} pages transcribed",
                green("✔"),
                bold(&transcribed.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages transcribed  ({} placeholder(s))",
                yellow("⚠"),
                bold(&transcribed.to_string()),
                discovered,
                placeholders,
            );
        }
    }
}

/// Console checkpoint that hides the progress bar while prompting.
struct BarCheckpoint {
    bar: ProgressBar,
}

impl CheckpointPolicy for BarCheckpoint {
    fn checkpoint(&self, processed: usize, total: usize) -> CheckpointDecision {
        self.bar
            .suspend(|| ConsoleCheckpoint.checkpoint(processed, total))
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Narrate every zip archive in scans/
  scan2speech scans/

  # Headless: never pause at checkpoints
  scan2speech --yes scans/

  # Custom artifact locations and a 10-page checkpoint
  scan2speech --transcripts-dir out/text --audio-dir out/audio \
              --checkpoint-interval 10 scans/

ENVIRONMENT VARIABLES:
  ANTHROPIC_API_KEY    Vision transcription key (required)
  ELEVENLABS_API_KEY   Speech synthesis key (required for audio output)

PIPELINE:
  Pages inside each archive are ordered by capture timestamp, most recent
  first (EXIF DateTimeOriginal, falling back to file mtime), cropped and
  resized onto a fixed canvas, transcribed one at a time, and finally read
  aloud by the speech provider. The transcript artifact is always written;
  the audio artifact additionally requires the speech credential and a
  successful synthesis call.
"#;

/// Narrate archives of scanned book pages.
#[derive(Parser, Debug)]
#[command(
    name = "scan2speech",
    version,
    about = "Narrate archives of scanned book pages using a vision model and speech synthesis",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the zip archives of scanned pages.
    input: PathBuf,

    /// Directory that receives transcript artifacts.
    #[arg(long, env = "SCAN2SPEECH_TRANSCRIPTS_DIR", default_value = "transcripts")]
    transcripts_dir: PathBuf,

    /// Directory that receives audio artifacts.
    #[arg(long, env = "SCAN2SPEECH_AUDIO_DIR", default_value = "audio")]
    audio_dir: PathBuf,

    /// Target canvas width in pixels.
    #[arg(long, env = "SCAN2SPEECH_CANVAS_WIDTH", default_value_t = 951)]
    canvas_width: u32,

    /// Target canvas height in pixels.
    #[arg(long, env = "SCAN2SPEECH_CANVAS_HEIGHT", default_value_t = 1268)]
    canvas_height: u32,

    /// JPEG quality for normalized pages (1–100).
    #[arg(long, env = "SCAN2SPEECH_JPEG_QUALITY", default_value_t = 95,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Pages between operator checkpoints.
    #[arg(long, env = "SCAN2SPEECH_CHECKPOINT_INTERVAL", default_value_t = 20)]
    checkpoint_interval: usize,

    /// Transcription model identifier.
    #[arg(long, env = "SCAN2SPEECH_MODEL", default_value = "claude-3-5-sonnet-20240620")]
    model: String,

    /// Max tokens per page transcription.
    #[arg(long, env = "SCAN2SPEECH_MAX_TOKENS", default_value_t = 2000)]
    max_tokens: usize,

    /// Speech-synthesis voice identifier.
    #[arg(long, env = "SCAN2SPEECH_VOICE", default_value = "G17SuINrv2H9FC6nvetn")]
    voice: String,

    /// Speech-synthesis model identifier.
    #[arg(long, env = "SCAN2SPEECH_SPEECH_MODEL", default_value = "eleven_turbo_v2_5")]
    speech_model: String,

    /// Path to a text file containing a custom transcription instruction.
    #[arg(long, env = "SCAN2SPEECH_INSTRUCTION")]
    instruction: Option<PathBuf>,

    /// Never pause at checkpoints (headless operation).
    #[arg(short = 'y', long, env = "SCAN2SPEECH_YES")]
    yes: bool,

    /// Disable the progress bar.
    #[arg(long, env = "SCAN2SPEECH_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SCAN2SPEECH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SCAN2SPEECH_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active;
    // the bar provides all the feedback that matters to the operator.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let instruction = if let Some(ref path) = cli.instruction {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read instruction from {:?}", path))?,
        )
    } else {
        None
    };

    let progress = if show_progress {
        Some(CliProgress::new())
    } else {
        None
    };

    let mut builder = RunConfig::builder()
        .canvas(cli.canvas_width, cli.canvas_height)
        .jpeg_quality(cli.jpeg_quality)
        .checkpoint_interval(cli.checkpoint_interval)
        .transcription_model(&cli.model)
        .max_tokens(cli.max_tokens)
        .voice_id(&cli.voice)
        .speech_model(&cli.speech_model)
        .transcripts_dir(&cli.transcripts_dir)
        .audio_dir(&cli.audio_dir);

    if let Some(text) = instruction {
        builder = builder.instruction(text);
    }

    builder = if cli.yes {
        builder.checkpoint(Arc::new(AlwaysContinue))
    } else if let Some(ref p) = progress {
        builder.checkpoint(Arc::new(BarCheckpoint {
            bar: p.bar.clone(),
        }))
    } else {
        builder.checkpoint(Arc::new(ConsoleCheckpoint))
    };

    if let Some(p) = progress {
        builder = builder.progress(p);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = narrate(&cli.input, &config).await.context("Run failed")?;

    if !cli.quiet {
        if output.stopped_at_checkpoint {
            eprintln!(
                "{} stopped at operator checkpoint — {} of {} pages kept",
                yellow("⚠"),
                output.stats.pages_transcribed,
                output.stats.pages_discovered,
            );
        }
        match output.transcript_path {
            Some(ref path) => eprintln!("   transcript  →  {}", bold(&path.display().to_string())),
            None => eprintln!("   no pages found — nothing to transcribe"),
        }
        match output.audio_path {
            Some(ref path) => eprintln!("   narration   →  {}", bold(&path.display().to_string())),
            None if output.transcript_path.is_some() => {
                eprintln!("   narration   →  {}", yellow("not produced (see log)"))
            }
            None => {}
        }
        eprintln!(
            "   {}",
            dim(&format!(
                "{} archive(s), {} page(s), {} placeholder(s), {}ms total",
                output.stats.archives,
                output.stats.pages_transcribed,
                output.stats.placeholder_pages,
                output.stats.total_duration_ms
            ))
        );
    }

    Ok(())
}
