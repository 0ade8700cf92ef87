use std::cell::Cell;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use rdkafka_testkit::conf::CONF_PATH_ENV;
use rdkafka_testkit::{
    HarnessError, bootstrap, clear_failure_hook, set_failure_hook, wait_for_teardown, watchdog,
};
use serial_test::serial;
use tempfile::NamedTempFile;
use tokio::time::{Instant, sleep};

/// Captures failure-channel messages instead of aborting the process.
fn install_recording_hook() -> Arc<Mutex<Vec<String>>> {
    rdkafka_testkit::logging::init();
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);
    set_failure_hook(move |message| {
        sink.lock().expect("failure sink").push(message.to_string());
    });
    failures
}

#[tokio::test(start_paused = true)]
#[serial]
async fn watchdog_fails_the_test_when_the_deadline_passes() {
    let failures = install_recording_hook();

    watchdog::arm(Duration::from_secs(1));
    sleep(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;

    let failures = failures.lock().expect("failure sink");
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("timed out"));

    drop(failures);
    clear_failure_hook();
}

#[tokio::test(start_paused = true)]
#[serial]
async fn rearming_replaces_the_previous_deadline() {
    let failures = install_recording_hook();

    watchdog::arm(Duration::from_secs(1));
    watchdog::arm(Duration::from_secs(5));
    sleep(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;

    // The one-second deadline was replaced, not stacked.
    assert!(failures.lock().expect("failure sink").is_empty());

    sleep(Duration::from_secs(10)).await;
    tokio::task::yield_now().await;
    assert_eq!(failures.lock().expect("failure sink").len(), 1);

    clear_failure_hook();
}

#[tokio::test(start_paused = true)]
#[serial]
async fn disarm_cancels_the_deadline() {
    let failures = install_recording_hook();

    watchdog::arm(Duration::from_secs(1));
    watchdog::disarm();
    sleep(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;

    assert!(failures.lock().expect("failure sink").is_empty());
    clear_failure_hook();
}

#[tokio::test(start_paused = true)]
#[serial]
async fn zero_timeout_disarms_like_alarm_zero() {
    let failures = install_recording_hook();

    watchdog::arm(Duration::from_secs(1));
    watchdog::arm(Duration::ZERO);
    sleep(Duration::from_secs(5)).await;
    tokio::task::yield_now().await;

    assert!(failures.lock().expect("failure sink").is_empty());
    clear_failure_hook();
}

#[tokio::test(start_paused = true)]
#[serial]
async fn bootstrap_arms_watchdog_with_scaled_timeout() -> Result<()> {
    let failures = install_recording_hook();

    let mut conf = NamedTempFile::new()?;
    conf.write_all(b"test.timeout.multiplier=2.0\n")?;
    // SAFETY: environment-mutating tests run under #[serial].
    unsafe { std::env::set_var(CONF_PATH_ENV, conf.path()) };

    let fixture = bootstrap(1)?;
    assert_eq!(fixture.timeout(), Duration::from_secs(2));

    sleep(Duration::from_secs(1)).await;
    tokio::task::yield_now().await;
    assert!(failures.lock().expect("failure sink").is_empty());

    sleep(Duration::from_secs(2)).await;
    tokio::task::yield_now().await;
    assert_eq!(failures.lock().expect("failure sink").len(), 1);

    clear_failure_hook();
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn teardown_with_no_threads_completes_without_sleeping() {
    let start = Instant::now();
    let result = wait_for_teardown(10, || 0).await;

    assert!(result.is_ok());
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn teardown_with_leaked_threads_fails_after_the_budget() {
    let samples = Cell::new(0usize);
    let start = Instant::now();

    let result = wait_for_teardown(2, || {
        samples.set(samples.get() + 1);
        1
    })
    .await;

    match result {
        Err(HarnessError::ThreadDrainTimeout { threads }) => assert_eq!(threads, 1),
        other => panic!("expected thread drain failure, got {other:?}"),
    }
    // Initial sample plus one per elapsed poll interval.
    assert_eq!(samples.get(), 4);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn teardown_succeeds_once_threads_drain() {
    let threads = Cell::new(2usize);
    let start = Instant::now();

    let result = wait_for_teardown(10, || {
        let current = threads.get();
        threads.set(current.saturating_sub(1));
        current
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn teardown_budget_beyond_i64_still_polls() {
    let calls = Cell::new(0usize);

    let result = wait_for_teardown(u64::MAX, || {
        calls.set(calls.get() + 1);
        if calls.get() >= 2 { 0 } else { 1 }
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(calls.get(), 2);
}

#[tokio::test(start_paused = true)]
async fn teardown_draining_on_the_last_poll_still_passes() {
    // Budget of 1: samples 1, 1, then 0 exactly as the budget runs out.
    let calls = Cell::new(0usize);

    let result = wait_for_teardown(1, || {
        calls.set(calls.get() + 1);
        if calls.get() >= 3 { 0 } else { 1 }
    })
    .await;

    assert!(result.is_ok());
}
