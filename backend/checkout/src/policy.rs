use std::time::Duration;

use common_utils::consts::DEFAULT_POLL_INTERVAL_SECS;
use serde::Deserialize;

/// How the payment confirmation poll behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Delay before each verification call
    #[serde(with = "secs")]
    pub interval: Duration,
    /// Give up once this much time has passed since the QR code was shown; `0` disables
    #[serde(with = "opt_secs")]
    pub timeout: Option<Duration>,
    /// Give up after this many failed verification calls in a row; `0` disables
    #[serde(deserialize_with = "non_zero")]
    pub max_consecutive_failures: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Some(Duration::from_secs(300)),
            max_consecutive_failures: Some(10),
        }
    }
}

impl PollPolicy {
    /// Polls until confirmed or dismissed
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
            max_consecutive_failures: None,
        }
    }

    pub fn is_expired(&self, elapsed: Duration) -> bool {
        self.timeout.is_some_and(|timeout| elapsed >= timeout)
    }

    pub fn too_many_failures(&self, consecutive_failures: u32) -> bool {
        self.max_consecutive_failures
            .is_some_and(|max| consecutive_failures >= max)
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod opt_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer)
            .map(|secs| secs.filter(|secs| *secs > 0).map(Duration::from_secs))
    }
}

fn non_zero<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Option::<u32>::deserialize(deserializer).map(|value| value.filter(|value| *value > 0))
}
