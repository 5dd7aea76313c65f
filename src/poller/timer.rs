// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-deadline poll timer.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// A timer with at most one pending deadline.
///
/// Arming replaces any pending deadline, so arming twice in a row leaves
/// exactly one poll scheduled.
#[derive(Debug, Default)]
pub struct PollTimer {
    deadline: Option<Instant>,
}

impl PollTimer {
    /// Creates a disarmed timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules the timer to fire after `delay`.
    ///
    /// Returns the deadline that was cancelled, if one was pending.
    pub fn arm(&mut self, delay: Duration) -> Option<Instant> {
        self.deadline.replace(Instant::now() + delay)
    }

    /// Cancels the pending deadline, returning it.
    pub fn disarm(&mut self) -> Option<Instant> {
        self.deadline.take()
    }

    /// Returns true if a deadline is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns the pending deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Waits for the pending deadline and disarms the timer.
    ///
    /// Never completes while the timer is disarmed. Cancel safe: dropping
    /// the future before it completes leaves the deadline in place.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending().await,
        }
    }
}
