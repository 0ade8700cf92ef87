//! rdkafka glue: the [`ConfigSink`] impl for its config object, the
//! error-callback client context, and the live-thread probe used for
//! teardown verification.

use rdkafka::client::ClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;

use crate::conf::{ConfigSink, SetOutcome};
use crate::drain;
use crate::error::{self, HarnessError};

impl ConfigSink for ClientConfig {
    // The Rust binding stores key/value pairs unvalidated and lets
    // librdkafka reject them at client-creation time, so routing into a
    // ClientConfig always succeeds here.
    fn try_set(&mut self, name: &str, value: &str) -> SetOutcome {
        self.set(name, value);
        SetOutcome::Ok
    }
}

/// Client context for harness-managed clients: any client-level error the
/// library reports fails the test through the process failure channel.
///
/// Pass it when creating the client, e.g.
/// `fixture.client.create_with_context::<_, BaseProducer<_>>(HarnessClientContext)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HarnessClientContext;

impl ClientContext for HarnessClientContext {
    fn error(&self, error: KafkaError, reason: &str) {
        error::fail(&format!("rdkafka error: {error}: {reason}"));
    }
}

/// Number of background threads librdkafka currently runs in this process.
pub fn client_thread_count() -> usize {
    let count = unsafe { rdkafka_sys::bindings::rd_kafka_thread_cnt() };
    usize::try_from(count).unwrap_or(0)
}

/// [`drain::wait_for_teardown`] against the live librdkafka thread count.
pub async fn wait_for_client_teardown(timeout_secs: u64) -> Result<(), HarnessError> {
    drain::wait_for_teardown(timeout_secs, client_thread_count).await
}
