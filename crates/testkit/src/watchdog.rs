//! Process-wide watchdog deadline. Replaces the original SIGALRM scheme
//! with a cancellable tokio timer so the deadline is portable and
//! testable under paused time.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{self, HarnessError};

static ARMED: Mutex<Option<JoinHandle<()>>> = Mutex::new(None);

/// Arms the watchdog. Once the deadline passes the test is failed through
/// the process failure channel ("timed out"); the default channel aborts
/// the process, so an expired watchdog never returns control to the test.
///
/// Only one deadline is outstanding at a time: arming again replaces the
/// previous one, and arming from multiple threads is last-caller-wins.
/// A zero `timeout` disarms instead, matching `alarm(0)`.
///
/// Must be called from within a tokio runtime.
pub fn arm(timeout: Duration) {
    if timeout.is_zero() {
        disarm();
        return;
    }

    debug!(?timeout, "arming watchdog");
    let task = tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        error::fail(&HarnessError::WatchdogTimeout { timeout }.to_string());
    });

    let mut slot = ARMED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(prev) = slot.replace(task) {
        prev.abort();
    }
}

/// Cancels the outstanding deadline, if any.
pub fn disarm() {
    let mut slot = ARMED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(prev) = slot.take() {
        debug!("disarming watchdog");
        prev.abort();
    }
}
