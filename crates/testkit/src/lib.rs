//! Test-fixture bootstrap and teardown verification for rdkafka-based
//! integration tests.
//!
//! [`bootstrap`] builds per-test client/topic configuration objects from
//! a shared `test.conf` file plus environment overrides and arms a
//! watchdog deadline; [`wait_for_client_teardown`] verifies the client
//! library released its background threads before the test is considered
//! complete. [`TopicNamer`] and [`generate_id`] supply deterministic-but-
//! unique test identifiers and topic names.

pub mod conf;
pub mod drain;
pub mod error;
pub mod kafka;
pub mod logging;
pub mod naming;
pub mod watchdog;

pub use conf::{ConfigSink, SetOutcome, TestFixture, bootstrap};
pub use drain::wait_for_teardown;
pub use error::{HarnessError, clear_failure_hook, fail, set_failure_hook};
pub use kafka::{HarnessClientContext, client_thread_count, wait_for_client_teardown};
pub use naming::{TopicNamer, generate_id, test_level, test_seed};
