// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Communication with the garage envoy controller.
//!
//! The controller exposes two REST calls: a history query and a trigger.
//! [`DoorApi`] abstracts over them so the poller can be driven by the
//! real [`HttpClient`] or by an in-memory implementation.
//!
//! # Endpoints
//!
//! - `GET /history?n=20` returns `{"history": [...]}`, oldest entry first
//! - `GET /events?t=state&n=10` returns `{"events": [...]}` on older controllers
//! - `POST /_trigger` pulses the door relay; the body is ignored

mod http;

use std::future::Future;

pub use http::{HttpClient, HttpConfig};

use crate::error::Result;
use crate::types::HistoryEntry;

/// Which history query the controller understands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryEndpoint {
    /// `GET /history?n=<limit>`, answered with a `history` list.
    #[default]
    History,
    /// `GET /events?t=<event_type>&n=<limit>`, answered with an `events` list.
    Events {
        /// Event category to filter on, normally `state`.
        event_type: String,
    },
}

impl HistoryEndpoint {
    /// The legacy event endpoint filtered to door-state events.
    #[must_use]
    pub fn legacy_events() -> Self {
        Self::Events {
            event_type: "state".to_string(),
        }
    }
}

/// The operations the poller needs from a controller.
pub trait DoorApi: Send + Sync + 'static {
    /// Fetches up to `limit` of the most recent history entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the controller answers with a
    /// non-success status, or the body cannot be decoded.
    fn fetch_history(&self, limit: usize)
    -> impl Future<Output = Result<Vec<HistoryEntry>>> + Send;

    /// Asks the controller to actuate the door.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    fn trigger(&self) -> impl Future<Output = Result<()>> + Send;
}

impl<T: DoorApi> DoorApi for std::sync::Arc<T> {
    fn fetch_history(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<HistoryEntry>>> + Send {
        (**self).fetch_history(limit)
    }

    fn trigger(&self) -> impl Future<Output = Result<()>> + Send {
        (**self).trigger()
    }
}
