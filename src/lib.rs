// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Garage Envoy - an async client for a garage-door controller.
//!
//! The controller keeps a log of door states and exposes it over HTTP along
//! with a trigger that pulses the door relay. This crate polls that log,
//! turns the newest entry into a renderable [`DoorView`], and sends
//! triggers on request.
//!
//! # Quick Start
//!
//! ```no_run
//! use garage_envoy::{DoorPoller, HttpConfig, PollerConfig};
//!
//! #[tokio::main]
//! async fn main() -> garage_envoy::Result<()> {
//!     let client = HttpConfig::new("192.168.1.20").into_client()?;
//!     let poller = DoorPoller::spawn(client, PollerConfig::default());
//!
//!     let mut views = poller.subscribe();
//!     while views.changed().await.is_ok() {
//!         let view = views.borrow_and_update().clone();
//!         println!(
//!             "door: {} [{}]",
//!             view.current_state().unwrap_or("unknown"),
//!             view.trigger_label()
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Talking to the controller directly
//!
//! ```no_run
//! use garage_envoy::protocol::{DoorApi, HttpClient};
//!
//! # async fn example() -> garage_envoy::Result<()> {
//! let client = HttpClient::new("192.168.1.20")?;
//! let history = client.fetch_history(20).await?;
//! println!("{} entries", history.len());
//! client.trigger().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod poller;
pub mod protocol;
pub mod types;

pub use error::{Error, ParseError, ProtocolError, Result, ValueError};
pub use poller::{DoorPoller, DoorPollerHandle, DoorView, PollerConfig};
pub use protocol::{DoorApi, HistoryEndpoint, HttpClient, HttpConfig};
pub use types::{DoorState, HistoryEntry, TriggerAction};
