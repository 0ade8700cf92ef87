use tracing::debug;

use crate::conf::parser::ConfEntry;
use crate::naming::TopicNamer;

/// Harness directive: scales the nominal watchdog timeout.
pub const TIMEOUT_MULTIPLIER_KEY: &str = "test.timeout.multiplier";
/// Harness directive: overrides the topic-name prefix.
pub const TOPIC_PREFIX_KEY: &str = "test.topic.prefix";
/// Harness directive: randomizes every derived topic name.
pub const TOPIC_RANDOM_KEY: &str = "test.topic.random";

const TOPIC_KEY_PREFIX: &str = "topic.";

/// Outcome of applying one config key to a sink, mirroring the three-way
/// result of librdkafka's conf setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// The key was applied.
    Ok,
    /// The sink does not recognize the key.
    Unknown,
    /// The sink recognizes the key but rejects the value.
    Invalid(String),
}

/// Destination for routed config keys: the client or topic configuration
/// object of the library under test. Implemented for
/// [`rdkafka::config::ClientConfig`]; harness tests use recording mocks.
pub trait ConfigSink {
    /// Applies one key/value pair.
    fn try_set(&mut self, name: &str, value: &str) -> SetOutcome;
}

/// Applies one config entry to exactly one target. Rules are checked in
/// order and the first match wins:
///
/// 1. `test.timeout.multiplier` scales `timeout_secs` in place
/// 2. `test.topic.prefix` replaces the namer's prefix
/// 3. `test.topic.random` sets the namer's random flag
/// 4. a `topic.`-prefixed name is stripped and forwarded to `topic`
/// 5. anything else is forwarded unchanged to `client`
///
/// Harness directives (1-3) never reach the sinks and never fail.
pub fn route_entry(
    entry: &ConfEntry,
    namer: &mut TopicNamer,
    timeout_secs: &mut f64,
    client: &mut dyn ConfigSink,
    topic: &mut dyn ConfigSink,
) -> SetOutcome {
    match entry.name.as_str() {
        TIMEOUT_MULTIPLIER_KEY => {
            // Unparseable input scales the timeout to zero rather than
            // erroring, a quirk kept from the original harness.
            let multiplier = entry.value.parse::<f64>().unwrap_or(0.0);
            *timeout_secs *= multiplier;
            debug!(multiplier, timeout_secs = *timeout_secs, "scaled test timeout");
            SetOutcome::Ok
        }
        TOPIC_PREFIX_KEY => {
            namer.set_prefix(&entry.value);
            SetOutcome::Ok
        }
        TOPIC_RANDOM_KEY => {
            // Only "true" and "1" enable randomization; any other value,
            // recognized or not, disables it.
            namer.set_random(entry.value == "true" || entry.value == "1");
            SetOutcome::Ok
        }
        name => match name.strip_prefix(TOPIC_KEY_PREFIX) {
            Some(topic_key) => topic.try_set(topic_key, &entry.value),
            None => client.try_set(name, &entry.value),
        },
    }
}
