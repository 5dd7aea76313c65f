// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door states reported by the controller and the trigger actions they imply.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Position or motion of the door as reported by the controller.
///
/// The controller only ever reports the tokens below. Anything else is an
/// unknown state, which callers represent as `None` rather than an error.
///
/// # Examples
///
/// ```
/// use garage_envoy::types::DoorState;
///
/// let state: DoorState = "half-open".parse().unwrap();
/// assert_eq!(state, DoorState::HalfOpen);
/// assert_eq!(state.as_str(), "half-open");
/// assert!("ajar".parse::<DoorState>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DoorState {
    /// Fully open.
    Open,
    /// Stopped part way after opening.
    HalfOpen,
    /// Fully closed.
    Closed,
    /// Stopped part way after closing.
    HalfClosed,
    /// Moving towards open.
    Opening,
    /// Moving towards closed.
    Closing,
}

impl DoorState {
    /// All known states, in no particular order.
    pub const ALL: [Self; 6] = [
        Self::Open,
        Self::HalfOpen,
        Self::Closed,
        Self::HalfClosed,
        Self::Opening,
        Self::Closing,
    ];

    /// Returns the wire token for this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::HalfOpen => "half-open",
            Self::Closed => "closed",
            Self::HalfClosed => "half-closed",
            Self::Opening => "opening",
            Self::Closing => "closing",
        }
    }

    /// Returns true while the door is travelling.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }

    /// Returns the action a trigger press performs from this state.
    #[must_use]
    pub const fn trigger_action(&self) -> TriggerAction {
        match self {
            Self::Open | Self::HalfOpen => TriggerAction::Close,
            Self::Closed | Self::HalfClosed => TriggerAction::Open,
            Self::Opening => TriggerAction::Stop,
            Self::Closing => TriggerAction::Reverse,
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoorState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| ValueError::UnknownDoorState(s.to_string()))
    }
}

/// What pressing the trigger is expected to do, given the current state.
///
/// # Examples
///
/// ```
/// use garage_envoy::types::{DoorState, TriggerAction};
///
/// assert_eq!(DoorState::Closing.trigger_action(), TriggerAction::Reverse);
/// assert_eq!(TriggerAction::Reverse.label(), "Reverse Door");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerAction {
    /// Close an open door.
    Close,
    /// Open a closed door.
    Open,
    /// Stop a door that is opening.
    Stop,
    /// Reverse a door that is closing.
    Reverse,
}

impl TriggerAction {
    /// Returns the label shown on the trigger control.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Close => "Close Door",
            Self::Open => "Open Door",
            Self::Stop => "Stop Door",
            Self::Reverse => "Reverse Door",
        }
    }
}

impl fmt::Display for TriggerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
