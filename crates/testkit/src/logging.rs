//! Log setup for test binaries.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::naming;

/// Initializes fmt logging for a test binary. `RUST_LOG` wins when set;
/// otherwise the level derives from `TEST_LEVEL` (default 2 = info).
/// Safe to call from every test; only the first call installs a
/// subscriber.
pub fn init() {
    let level = level_filter(naming::test_level());

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

const fn level_filter(test_level: i32) -> LevelFilter {
    match test_level {
        i32::MIN..=0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}
