//! Process seeding, test identifiers, and topic naming.

use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Topic prefix used when the config file does not override it.
pub const DEFAULT_TOPIC_PREFIX: &str = "rdkafkatest";

const DEFAULT_TEST_LEVEL: i32 = 2;

struct ProcessInit {
    level: i32,
    seed: u32,
}

static PROCESS: OnceLock<ProcessInit> = OnceLock::new();
static RNG: OnceLock<Mutex<ChaCha8Rng>> = OnceLock::new();

/// Resolves `TEST_LEVEL` / `TEST_SEED` at most once per process. Later
/// changes to the environment are ignored.
fn process_init() -> &'static ProcessInit {
    PROCESS.get_or_init(|| {
        let level = std::env::var("TEST_LEVEL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TEST_LEVEL);
        let seed = std::env::var("TEST_SEED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| {
                // Arbitrary per-run seed: clock micros masked to 32 bits.
                let micros = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_micros())
                    .unwrap_or_default();
                (micros & 0xffff_ffff) as u32
            });
        ProcessInit { level, seed }
    })
}

/// Verbosity level for this test run, from `TEST_LEVEL` (default 2).
pub fn test_level() -> i32 {
    process_init().level
}

/// RNG seed for this test run, from `TEST_SEED` or a clock read. Exposed
/// so a failing run can be reproduced by exporting the logged seed.
pub fn test_seed() -> u32 {
    process_init().seed
}

fn process_rng() -> &'static Mutex<ChaCha8Rng> {
    RNG.get_or_init(|| Mutex::new(ChaCha8Rng::seed_from_u64(u64::from(test_seed()))))
}

/// Generates a test id from two independent 32-bit draws of the shared
/// process RNG (high half, low half). Uniqueness is probabilistic;
/// collisions are astronomically unlikely, not prevented.
pub fn generate_id() -> u64 {
    let mut rng = process_rng().lock().unwrap_or_else(PoisonError::into_inner);
    (u64::from(rng.next_u32()) << 32) | u64::from(rng.next_u32())
}

/// Derives topic names for a test from the configured prefix.
///
/// Each fixture owns its own namer, so tests running concurrently on
/// different threads never observe each other's names; the prefix itself
/// is read-only after config ingestion.
#[derive(Debug, Clone)]
pub struct TopicNamer {
    prefix: String,
    random: bool,
}

impl Default for TopicNamer {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_TOPIC_PREFIX.to_string(),
            random: false,
        }
    }
}

impl TopicNamer {
    /// Namer with an explicit prefix and randomization flag.
    pub fn new(prefix: impl Into<String>, random: bool) -> Self {
        Self {
            prefix: prefix.into(),
            random,
        }
    }

    /// Current topic prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether every derived name gets a random id segment.
    pub const fn random(&self) -> bool {
        self.random
    }

    pub(crate) fn set_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.to_string();
    }

    pub(crate) fn set_random(&mut self, random: bool) {
        self.random = random;
    }

    /// Returns `{prefix}_{suffix}`, or `{prefix}_{hexid}_{suffix}` with a
    /// freshly generated id when this namer or the caller asks for
    /// randomized names.
    pub fn mk_topic_name(&self, suffix: &str, randomized: bool) -> String {
        let name = if self.random || randomized {
            format!("{}_{:x}_{}", self.prefix, generate_id(), suffix)
        } else {
            format!("{}_{}", self.prefix, suffix)
        };
        info!(topic = %name, "using topic");
        name
    }
}
