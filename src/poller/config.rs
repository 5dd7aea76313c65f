// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Poll cadence configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::DoorState;

/// Settings for the door poller.
///
/// The defaults poll quickly while the door moves and relax once it
/// settles. Durations are (de)serialized as whole milliseconds and missing
/// fields fall back to the defaults, so a partial JSON file is enough:
///
/// ```
/// use garage_envoy::poller::PollerConfig;
/// use std::time::Duration;
///
/// let config: PollerConfig = serde_json::from_str(r#"{"moving_delay": 250}"#).unwrap();
/// assert_eq!(config.moving_delay, Duration::from_millis(250));
/// assert_eq!(config.history_limit, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Number of most recent history entries to request. Zero is treated
    /// as one, see [`request_limit`](Self::request_limit).
    pub history_limit: usize,
    /// Delay after an `open`, `half-open`, `closed` or `half-closed` state.
    #[serde(with = "millis")]
    pub stable_delay: Duration,
    /// Delay after an `opening` or `closing` state.
    #[serde(with = "millis")]
    pub moving_delay: Duration,
    /// Delay after an unknown state or an empty history.
    #[serde(with = "millis")]
    pub idle_delay: Duration,
    /// Delay after a failed poll.
    #[serde(with = "millis")]
    pub failure_delay: Duration,
    /// Delay between sending a trigger and the next poll.
    #[serde(with = "millis")]
    pub trigger_delay: Duration,
}

impl PollerConfig {
    /// Default number of history entries requested.
    pub const DEFAULT_HISTORY_LIMIT: usize = 20;
    /// Default delay while the door is at rest.
    pub const DEFAULT_STABLE_DELAY: Duration = Duration::from_millis(5000);
    /// Default delay while the door is travelling.
    pub const DEFAULT_MOVING_DELAY: Duration = Duration::from_millis(1000);
    /// Default delay when the state is unknown.
    pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(10_000);
    /// Default delay after a failed poll.
    pub const DEFAULT_FAILURE_DELAY: Duration = Duration::from_millis(10_000);
    /// Default delay after a trigger.
    pub const DEFAULT_TRIGGER_DELAY: Duration = Duration::from_millis(1000);

    /// Sets the number of history entries to request, at least one.
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Returns the limit actually sent to the controller.
    ///
    /// The controller answers `n=0` with its whole log, which would then be
    /// truncated to nothing, so a zero limit asks for the latest entry.
    #[must_use]
    pub fn request_limit(&self) -> usize {
        self.history_limit.max(1)
    }

    /// Sets the delay between a trigger and the follow-up poll.
    #[must_use]
    pub fn with_trigger_delay(mut self, delay: Duration) -> Self {
        self.trigger_delay = delay;
        self
    }

    /// Sets the delay after a failed poll.
    #[must_use]
    pub fn with_failure_delay(mut self, delay: Duration) -> Self {
        self.failure_delay = delay;
        self
    }

    /// Returns how long to wait before polling again after a successful
    /// poll that reported `state`.
    #[must_use]
    pub fn delay_for(&self, state: Option<DoorState>) -> Duration {
        match state {
            Some(state) if state.is_moving() => self.moving_delay,
            Some(_) => self.stable_delay,
            None => self.idle_delay,
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            history_limit: Self::DEFAULT_HISTORY_LIMIT,
            stable_delay: Self::DEFAULT_STABLE_DELAY,
            moving_delay: Self::DEFAULT_MOVING_DELAY,
            idle_delay: Self::DEFAULT_IDLE_DELAY,
            failure_delay: Self::DEFAULT_FAILURE_DELAY,
            trigger_delay: Self::DEFAULT_TRIGGER_DELAY,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation)]
    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
