//! Teardown drain waiter: bounded polling for client-library thread exit.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};

use crate::error::HarnessError;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Waits for the library under test to wind down its background threads.
///
/// Polls `probe` (the library's live-thread count) once per second until
/// it reports zero or `timeout_secs` polls have elapsed. A probe that
/// reports zero up front completes without sleeping; threads still alive
/// when the budget runs out are a leaked-thread defect in the library and
/// fail the test hard. This is a liveness check with a ceiling, never an
/// indefinite wait.
pub async fn wait_for_teardown(
    timeout_secs: u64,
    mut probe: impl FnMut() -> usize,
) -> Result<(), HarnessError> {
    // Saturate rather than wrap: a budget past i64::MAX is still a
    // budget, not an exhausted one.
    let mut remaining = i64::try_from(timeout_secs).unwrap_or(i64::MAX);
    let mut threads = probe();

    while threads > 0 && remaining >= 0 {
        info!(threads, "thread(s) in use by client library, waiting...");
        sleep(POLL_INTERVAL).await;
        remaining -= 1;
        threads = probe();
    }

    info!(threads, "thread(s) in use by client library");

    if threads > 0 {
        error!(threads, "client library leaked threads during teardown");
        return Err(HarnessError::ThreadDrainTimeout { threads });
    }
    Ok(())
}
