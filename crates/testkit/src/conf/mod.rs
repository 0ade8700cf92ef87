//! Config ingestion: file parsing, key routing, and the per-test
//! bootstrap entry that ties them together.

mod parser;
mod router;

pub use parser::{CONF_PATH_ENV, ConfEntry, DEFAULT_CONF_PATH, conf_path, parse_conf_file};
pub use router::{
    ConfigSink, SetOutcome, TIMEOUT_MULTIPLIER_KEY, TOPIC_PREFIX_KEY, TOPIC_RANDOM_KEY,
    route_entry,
};

use std::fmt;
use std::path::Path;
use std::time::Duration;

use rdkafka::config::ClientConfig;
use tracing::info;

use crate::error::HarnessError;
use crate::naming::{self, TopicNamer};
use crate::watchdog;

/// Per-test fixture produced by [`bootstrap`]: the client and topic
/// configuration objects destined for the library under test, the topic
/// namer, and the scaled watchdog timeout.
///
/// The fixture is exclusively owned by the calling test and must not be
/// shared across threads; the configs are handed off to the client
/// library when the test creates its producer or consumer.
pub struct TestFixture {
    /// Client-level configuration, populated from the config file.
    pub client: ClientConfig,
    /// Topic-level configuration, populated from `topic.`-prefixed keys.
    pub topic: ClientConfig,
    namer: TopicNamer,
    timeout: Duration,
}

impl TestFixture {
    /// Topic namer configured by the config file.
    pub const fn namer(&self) -> &TopicNamer {
        &self.namer
    }

    /// Derives a topic name for this test. See [`TopicNamer::mk_topic_name`].
    pub fn mk_topic_name(&self, suffix: &str, randomized: bool) -> String {
        self.namer.mk_topic_name(suffix, randomized)
    }

    /// The watchdog timeout that was armed, after multiplier scaling.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for TestFixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestFixture")
            .field("namer", &self.namer)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Parses the config file at `path` and routes every entry into the given
/// sinks. `timeout_secs` is scaled in place by any `test.timeout.multiplier`
/// directive. A single rejected entry fails the whole load; there is no
/// partial-apply recovery.
pub fn apply_conf_file(
    path: &Path,
    client: &mut dyn ConfigSink,
    topic: &mut dyn ConfigSink,
    namer: &mut TopicNamer,
    timeout_secs: &mut f64,
) -> Result<(), HarnessError> {
    for entry in parse_conf_file(path)? {
        match route_entry(&entry, namer, timeout_secs, client, topic) {
            SetOutcome::Ok => {}
            SetOutcome::Unknown => {
                return Err(HarnessError::ConfKeyRejected {
                    file: path.to_path_buf(),
                    line: entry.line,
                    reason: format!("unknown configuration property \"{}\"", entry.name),
                });
            }
            SetOutcome::Invalid(reason) => {
                return Err(HarnessError::ConfKeyRejected {
                    file: path.to_path_buf(),
                    line: entry.line,
                    reason,
                });
            }
        }
    }
    Ok(())
}

/// Prepares a test fixture.
///
/// Reads the config file (`RDKAFKA_TEST_CONF`, default `test.conf`),
/// routes every entry into fresh client and topic configs, then arms the
/// process watchdog with `timeout_secs` scaled by any configured
/// multiplier. Must be called from within a tokio runtime, since the
/// watchdog spawns its timer task.
pub fn bootstrap(timeout_secs: u64) -> Result<TestFixture, HarnessError> {
    // Resolve TEST_LEVEL / TEST_SEED before anything can draw an id.
    let seed = naming::test_seed();

    let path = conf_path();
    let mut client = ClientConfig::new();
    let mut topic = ClientConfig::new();
    let mut namer = TopicNamer::default();
    let mut scaled = timeout_secs as f64;

    apply_conf_file(&path, &mut client, &mut topic, &mut namer, &mut scaled)?;

    // Negative, NaN or infinite products (garbage multipliers) collapse
    // to a zero timeout rather than panicking.
    let timeout = Duration::try_from_secs_f64(scaled).unwrap_or(Duration::ZERO);
    watchdog::arm(timeout);

    info!(
        conf = %path.display(),
        seed,
        prefix = namer.prefix(),
        ?timeout,
        "test fixture ready"
    );

    Ok(TestFixture {
        client,
        topic,
        namer,
        timeout,
    })
}
