//! Operator checkpoint policy for the transcription stage.
//!
//! Every `checkpoint_interval` transcribed pages the orchestrator pauses and
//! asks the configured [`CheckpointPolicy`] whether to keep going. Modelling
//! the pause as an injected capability, rather than an inline prompt, keeps
//! the stage logic independent of any particular interactive mechanism: the
//! CLI installs a console Y/N prompt, tests install counting or stop-after-N
//! policies, and headless callers get [`AlwaysContinue`] by default.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// The operator's answer at a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointDecision {
    /// Keep transcribing.
    Continue,
    /// Stop the transcription stage. Pages transcribed so far are kept and
    /// persisted; remaining pages are never sent to the provider.
    Stop,
}

/// Consulted by the transcription orchestrator between batches.
///
/// Implementations must be `Send + Sync` so the policy can live inside the
/// shared [`crate::config::RunConfig`]. The call may block (the console
/// prompt does); the pipeline is sequential, so a blocked checkpoint simply
/// suspends the run.
pub trait CheckpointPolicy: Send + Sync {
    /// Decide whether to continue after `processed` of `total` pages.
    fn checkpoint(&self, processed: usize, total: usize) -> CheckpointDecision;
}

/// Never pauses. The library default.
pub struct AlwaysContinue;

impl CheckpointPolicy for AlwaysContinue {
    fn checkpoint(&self, _processed: usize, _total: usize) -> CheckpointDecision {
        CheckpointDecision::Continue
    }
}

/// Stops at the first checkpoint on or after a given page count.
///
/// Useful for bounded trial runs ("transcribe the first 20 pages and stop")
/// and for exercising the early-stop path in tests.
pub struct StopAfter(pub usize);

impl CheckpointPolicy for StopAfter {
    fn checkpoint(&self, processed: usize, _total: usize) -> CheckpointDecision {
        if processed >= self.0 {
            CheckpointDecision::Stop
        } else {
            CheckpointDecision::Continue
        }
    }
}

/// Interactive console prompt: continue only on an explicit `y`/`Y` answer.
///
/// Anything else — `n`, an empty line, EOF on stdin — stops the run. Treating
/// a failed read as Stop means a detached stdin can never silently burn
/// through an entire book.
pub struct ConsoleCheckpoint;

impl CheckpointPolicy for ConsoleCheckpoint {
    fn checkpoint(&self, processed: usize, total: usize) -> CheckpointDecision {
        print!("Processed {processed}/{total} pages. Continue (Y/N)? ");
        if io::stdout().flush().is_err() {
            return CheckpointDecision::Stop;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => CheckpointDecision::Stop,
            Ok(_) => {
                if answer.trim().eq_ignore_ascii_case("y") {
                    CheckpointDecision::Continue
                } else {
                    CheckpointDecision::Stop
                }
            }
        }
    }
}

/// Convenience alias matching the type stored in [`crate::config::RunConfig`].
pub type SharedCheckpoint = Arc<dyn CheckpointPolicy>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPolicy {
        calls: AtomicUsize,
    }

    impl CheckpointPolicy for CountingPolicy {
        fn checkpoint(&self, _processed: usize, _total: usize) -> CheckpointDecision {
            self.calls.fetch_add(1, Ordering::SeqCst);
            CheckpointDecision::Continue
        }
    }

    #[test]
    fn always_continue_never_stops() {
        let p = AlwaysContinue;
        assert_eq!(p.checkpoint(20, 50), CheckpointDecision::Continue);
        assert_eq!(p.checkpoint(1000, 1000), CheckpointDecision::Continue);
    }

    #[test]
    fn stop_after_threshold() {
        let p = StopAfter(20);
        assert_eq!(p.checkpoint(19, 50), CheckpointDecision::Continue);
        assert_eq!(p.checkpoint(20, 50), CheckpointDecision::Stop);
        assert_eq!(p.checkpoint(40, 50), CheckpointDecision::Stop);
    }

    #[test]
    fn arc_dyn_policy_works() {
        let p: SharedCheckpoint = Arc::new(CountingPolicy {
            calls: AtomicUsize::new(0),
        });
        p.checkpoint(20, 40);
        p.checkpoint(40, 40);
    }
}
