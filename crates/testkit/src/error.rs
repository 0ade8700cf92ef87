//! Failure taxonomy and the single fail-the-test channel.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::error;

/// Fatal harness failures. Every variant invalidates the test that hit it:
/// the harness establishes preconditions the test depends on, so there is
/// no recovery path, only a diagnostic.
#[derive(Debug)]
pub enum HarnessError {
    /// The config file does not exist. Running without a config file is
    /// not a supported state.
    ConfFileMissing { path: PathBuf },
    /// The config file exists but could not be read.
    ConfFileIo { path: PathBuf, source: io::Error },
    /// A config line is not `name=value`.
    ConfLineFormat { file: PathBuf, line: usize },
    /// A setter rejected a routed config key.
    ConfKeyRejected {
        file: PathBuf,
        line: usize,
        reason: String,
    },
    /// The armed watchdog deadline passed mid-test.
    WatchdogTimeout { timeout: Duration },
    /// The client library still had live background threads when the
    /// teardown budget ran out.
    ThreadDrainTimeout { threads: usize },
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessError::ConfFileMissing { path } => {
                write!(f, "{} not found", path.display())
            }
            HarnessError::ConfFileIo { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            HarnessError::ConfLineFormat { file, line } => {
                write!(f, "{}:{}: expected name=value format", file.display(), line)
            }
            HarnessError::ConfKeyRejected { file, line, reason } => {
                write!(f, "{}:{}: {}", file.display(), line, reason)
            }
            HarnessError::WatchdogTimeout { timeout } => {
                write!(f, "Test timed out after {:?}", timeout)
            }
            HarnessError::ThreadDrainTimeout { threads } => {
                write!(f, "{} thread(s) still active in client library", threads)
            }
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HarnessError::ConfFileIo { source, .. } => Some(source),
            _ => None,
        }
    }
}

type FailureHook = Arc<dyn Fn(&str) + Send + Sync>;

static FAILURE_HOOK: RwLock<Option<FailureHook>> = RwLock::new(None);

/// Installs a process-wide hook invoked by asynchronous failures (watchdog
/// expiry, client error callbacks). Without a hook such failures abort the
/// process, matching the fail-the-test-hard contract of the harness; tests
/// of the harness itself install a recording hook instead.
pub fn set_failure_hook(hook: impl Fn(&str) + Send + Sync + 'static) {
    let mut slot = FAILURE_HOOK
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *slot = Some(Arc::new(hook));
}

/// Removes the installed failure hook, restoring abort-on-failure.
pub fn clear_failure_hook() {
    let mut slot = FAILURE_HOOK
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *slot = None;
}

/// Fails the current test through the single failure channel: log the
/// diagnostic, then hand off to the hook or abort.
pub fn fail(message: &str) {
    error!("{message}");
    // Clone the hook out so it runs without the slot lock held; a hook
    // may itself install or clear a hook.
    let hook = FAILURE_HOOK
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    match hook {
        Some(hook) => hook(message),
        None => std::process::abort(),
    }
}
