// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! History entries returned by the controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DoorState;

/// One recorded door-state observation.
///
/// Entries arrive oldest first, so the last entry of a history is the
/// current state. Every field is optional: the controller's event log is
/// free-form JSON and the client must tolerate gaps.
///
/// # Examples
///
/// ```
/// use garage_envoy::types::{DoorState, HistoryEntry};
///
/// let entry: HistoryEntry =
///     serde_json::from_str(r#"{"name": "closed", "time": 1400000000.5}"#).unwrap();
/// assert_eq!(entry.door_state(), Some(DoorState::Closed));
/// assert!(entry.timestamp().is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Door-state token, e.g. `"open"`.
    #[serde(default)]
    pub name: Option<String>,
    /// UNIX time of the observation in fractional seconds.
    #[serde(default)]
    pub time: Option<f64>,
    /// Event category (`"state"` or `"sensor"`) on the legacy event endpoint.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Sensor reading attached to sensor events.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl HistoryEntry {
    /// Creates an entry with just a state name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns the state name, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Parses the name into a known door state.
    ///
    /// Returns `None` for absent or unrecognised names.
    #[must_use]
    pub fn door_state(&self) -> Option<DoorState> {
        self.name()?.parse().ok()
    }

    /// Returns the observation time as a UTC timestamp.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let time = self.time.filter(|t| t.is_finite())?;
        let secs = time.floor();
        let nanos = ((time - secs) * 1e9).round() as u32;
        DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_entry() {
        let entry: HistoryEntry = serde_json::from_str(r#"{"name": "opening"}"#).unwrap();
        assert_eq!(entry, HistoryEntry::named("opening"));
        assert_eq!(entry.door_state(), Some(DoorState::Opening));
        assert!(entry.timestamp().is_none());
    }

    #[test]
    fn parse_legacy_event() {
        let entry: HistoryEntry = serde_json::from_str(
            r#"{"time": 1400000000.25, "type": "state", "name": "half-open", "value": null}"#,
        )
        .unwrap();
        assert_eq!(entry.kind.as_deref(), Some("state"));
        assert_eq!(entry.door_state(), Some(DoorState::HalfOpen));

        let ts = entry.timestamp().unwrap();
        assert_eq!(ts.timestamp(), 1_400_000_000);
        assert_eq!(ts.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn unknown_or_missing_name() {
        let entry: HistoryEntry = serde_json::from_str(r#"{"name": "ajar"}"#).unwrap();
        assert_eq!(entry.name(), Some("ajar"));
        assert!(entry.door_state().is_none());

        let entry: HistoryEntry = serde_json::from_str("{}").unwrap();
        assert!(entry.name().is_none());
        assert!(entry.door_state().is_none());
    }

    #[test]
    fn ignores_extra_fields() {
        let entry: HistoryEntry =
            serde_json::from_str(r#"{"name": "closed", "source": "sensor-2"}"#).unwrap();
        assert_eq!(entry.door_state(), Some(DoorState::Closed));
    }

    #[test]
    fn non_finite_time_has_no_timestamp() {
        let entry = HistoryEntry {
            time: Some(f64::NAN),
            ..HistoryEntry::named("open")
        };
        assert!(entry.timestamp().is_none());
    }
}
