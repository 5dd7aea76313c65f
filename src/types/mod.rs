// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domain types reported by and sent to the controller.
//!
//! # Types
//!
//! - [`DoorState`] - Position or motion of the door (`open`, `closing`, ...)
//! - [`TriggerAction`] - What a trigger press does from a given state
//! - [`HistoryEntry`] - One timestamped observation from the controller's log

mod door_state;
mod history;

pub use door_state::{DoorState, TriggerAction};
pub use history::HistoryEntry;
