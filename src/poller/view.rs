// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snapshot of what the controller last reported, ready for rendering.

use crate::error::Error;
use crate::types::{DoorState, HistoryEntry, TriggerAction};

/// Caption of the trigger control before any action is known.
pub const DEFAULT_TRIGGER_LABEL: &str = "Trigger Door";

/// Immutable view of the door, rebuilt from every poll outcome.
///
/// A successful poll fills the history and derives the state and trigger
/// action from its last entry. A failed poll produces an empty view so
/// nothing stale stays on screen.
///
/// # Examples
///
/// ```
/// use garage_envoy::poller::DoorView;
/// use garage_envoy::types::HistoryEntry;
///
/// let view = DoorView::from_history(
///     vec![HistoryEntry::named("opening"), HistoryEntry::named("open")],
///     None,
/// );
/// assert_eq!(view.current_state(), Some("open"));
/// assert_eq!(view.trigger_action_label(), Some("Close Door"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoorView {
    history: Vec<HistoryEntry>,
    current_state: Option<String>,
    door_state: Option<DoorState>,
    trigger_action: Option<TriggerAction>,
    last_error: Option<String>,
}

impl DoorView {
    /// Builds the view for a successful poll.
    ///
    /// When the latest state is unknown or the history is empty, the
    /// `previous_action` is carried over unchanged.
    #[must_use]
    pub fn from_history(
        history: Vec<HistoryEntry>,
        previous_action: Option<TriggerAction>,
    ) -> Self {
        let current_state = history
            .last()
            .and_then(HistoryEntry::name)
            .map(str::to_string);
        let door_state = current_state.as_deref().and_then(|name| {
            name.parse::<DoorState>()
                .inspect_err(|e| tracing::debug!(error = %e, "Keeping unrecognised state token"))
                .ok()
        });
        let trigger_action = door_state
            .map(|state| state.trigger_action())
            .or(previous_action);

        Self {
            history,
            current_state,
            door_state,
            trigger_action,
            last_error: None,
        }
    }

    /// Builds the cleared view for a failed poll.
    #[must_use]
    pub fn failed(error: &Error) -> Self {
        Self {
            last_error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// Returns the history, oldest entry first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Returns the raw state token of the latest entry.
    #[must_use]
    pub fn current_state(&self) -> Option<&str> {
        self.current_state.as_deref()
    }

    /// Returns the latest state if it is a known one.
    #[must_use]
    pub fn door_state(&self) -> Option<DoorState> {
        self.door_state
    }

    /// Returns what a trigger press is expected to do.
    #[must_use]
    pub fn trigger_action(&self) -> Option<TriggerAction> {
        self.trigger_action
    }

    /// Returns the label for the trigger action, if one is known.
    #[must_use]
    pub fn trigger_action_label(&self) -> Option<&'static str> {
        self.trigger_action.map(|action| action.label())
    }

    /// Returns the caption for the trigger control.
    #[must_use]
    pub fn trigger_label(&self) -> &'static str {
        self.trigger_action_label().unwrap_or(DEFAULT_TRIGGER_LABEL)
    }

    /// Returns the description of the poll failure this view reflects.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns true if this view reflects a failed poll.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.last_error.is_some()
    }
}
