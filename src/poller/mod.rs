// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State-driven door poller.
//!
//! The poller fetches the controller's recent history, derives the door
//! state and the trigger action from the newest entry, and decides when to
//! poll next:
//!
//! | Latest state | Trigger action | Next poll |
//! |---|---|---|
//! | `open`, `half-open` | Close Door | 5 s |
//! | `closed`, `half-closed` | Open Door | 5 s |
//! | `opening` | Stop Door | 1 s |
//! | `closing` | Reverse Door | 1 s |
//! | unknown or empty | unchanged | 10 s |
//! | request failed | cleared | 10 s |
//!
//! Sending a trigger re-polls after 1 s. Only one poll is ever scheduled;
//! scheduling a new one replaces the old, and a response from a fetch that
//! has since been superseded is dropped instead of applied.

mod config;
mod door_poller;
mod timer;
mod view;

pub use config::PollerConfig;
pub use door_poller::{DoorPoller, DoorPollerHandle};
pub use timer::PollTimer;
pub use view::{DEFAULT_TRIGGER_LABEL, DoorView};
