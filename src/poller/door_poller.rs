// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The poll loop and the handle used to drive it.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::error::{Error, Result};
use crate::protocol::DoorApi;
use crate::types::HistoryEntry;

use super::{DoorView, PollTimer, PollerConfig};

/// Capacity of the command channel between handles and the poll loop.
const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// Capacity of the channel carrying fetch results back to the poll loop.
const RESULT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Trigger,
    Refresh,
    Shutdown,
}

/// Outcome of one history fetch, tagged with the generation it started in.
struct Fetched {
    generation: u64,
    result: Result<Vec<HistoryEntry>>,
}

/// Spawns and owns the door poll loop.
///
/// The loop fetches history immediately on spawn, then re-polls on a
/// cadence chosen from the reported state. Every outcome is published as a
/// [`DoorView`] on a watch channel.
///
/// # Examples
///
/// ```no_run
/// use garage_envoy::poller::{DoorPoller, PollerConfig};
/// use garage_envoy::protocol::HttpClient;
///
/// # async fn example() -> garage_envoy::Result<()> {
/// let client = HttpClient::new("192.168.1.20")?;
/// let poller = DoorPoller::spawn(client, PollerConfig::default());
///
/// let mut views = poller.subscribe();
/// views.changed().await.ok();
/// println!("{}", views.borrow().trigger_label());
///
/// poller.trigger_door().await?;
/// # Ok(())
/// # }
/// ```
pub struct DoorPoller<A> {
    api: Arc<A>,
    config: PollerConfig,
    timer: PollTimer,
    generation: u64,
    view_tx: watch::Sender<DoorView>,
    results_tx: mpsc::Sender<Fetched>,
}

impl<A: DoorApi> DoorPoller<A> {
    /// Starts polling `api` on the current tokio runtime.
    #[must_use]
    pub fn spawn(api: A, config: PollerConfig) -> DoorPollerHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (results_tx, results_rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
        let (view_tx, view_rx) = watch::channel(DoorView::default());

        let poller = Self {
            api: Arc::new(api),
            config,
            timer: PollTimer::new(),
            generation: 0,
            view_tx,
            results_tx,
        };
        tokio::spawn(poller.run(command_rx, results_rx));

        DoorPollerHandle {
            commands: command_tx,
            view: view_rx,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut results: mpsc::Receiver<Fetched>,
    ) {
        tracing::debug!(config = ?self.config, "Starting door poller");

        self.refresh_history();

        loop {
            tokio::select! {
                () = self.timer.fired() => self.refresh_history(),
                Some(fetched) = results.recv() => self.apply(fetched),
                command = commands.recv() => match command {
                    Some(Command::Trigger) => self.trigger_door(),
                    Some(Command::Refresh) => self.refresh_history(),
                    Some(Command::Shutdown) | None => break,
                },
            }
        }

        tracing::debug!("Door poller stopped");
    }

    /// Starts a history fetch, superseding anything already in flight.
    fn refresh_history(&mut self) {
        self.timer.disarm();
        self.generation += 1;

        let generation = self.generation;
        let limit = self.config.request_limit();
        let api = Arc::clone(&self.api);
        let results = self.results_tx.clone();

        tokio::spawn(async move {
            let result = api.fetch_history(limit).await;
            // The loop only drops its receiver when shutting down.
            let _ = results.send(Fetched { generation, result }).await;
        });
    }

    /// Sends the trigger and schedules a quick follow-up poll.
    fn trigger_door(&mut self) {
        self.generation += 1;
        if let Some(cancelled) = self.timer.arm(self.config.trigger_delay) {
            tracing::debug!(?cancelled, "Trigger replaced pending poll");
        }

        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            tracing::info!("Triggering door");
            if let Err(e) = api.trigger().await {
                tracing::warn!(error = %e, "Door trigger failed");
            }
        });
    }

    fn apply(&mut self, fetched: Fetched) {
        if fetched.generation != self.generation {
            tracing::debug!(
                generation = fetched.generation,
                current = self.generation,
                "Discarding superseded history response"
            );
            return;
        }

        let (view, delay) = match fetched.result {
            Ok(history) => {
                let previous_action = self.view_tx.borrow().trigger_action();
                let view = DoorView::from_history(history, previous_action);
                let delay = self.config.delay_for(view.door_state());
                tracing::debug!(
                    state = view.current_state().unwrap_or("unknown"),
                    entries = view.history().len(),
                    next_poll = ?delay,
                    "Door history refreshed"
                );
                (view, delay)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    next_poll = ?self.config.failure_delay,
                    "Door history poll failed"
                );
                (DoorView::failed(&e), self.config.failure_delay)
            }
        };

        self.timer.arm(delay);
        self.view_tx.send_replace(view);
    }
}

/// Handle to a running [`DoorPoller`].
///
/// Cloning the handle is cheap. The poll loop stops when
/// [`shutdown`](Self::shutdown) is called or every handle is dropped.
#[derive(Debug, Clone)]
pub struct DoorPollerHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<DoorView>,
}

impl DoorPollerHandle {
    /// Returns a receiver notified of every new view.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DoorView> {
        self.view.clone()
    }

    /// Returns the latest view.
    #[must_use]
    pub fn view(&self) -> DoorView {
        self.view.borrow().clone()
    }

    /// Sends a trigger to the controller and polls again shortly after.
    ///
    /// The trigger is fire-and-forget: a failed request is only logged and
    /// shows up as an unchanged state on the next poll.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PollerStopped`] if the poll loop has exited.
    pub async fn trigger_door(&self) -> Result<()> {
        self.send(Command::Trigger).await
    }

    /// Polls immediately, cancelling the pending poll.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PollerStopped`] if the poll loop has exited.
    pub async fn refresh_history(&self) -> Result<()> {
        self.send(Command::Refresh).await
    }

    /// Stops the poll loop and waits for it to exit.
    ///
    /// The last view stays readable. Calling this on a stopped poller is a
    /// no-op.
    pub async fn shutdown(&self) {
        if self.send(Command::Shutdown).await.is_ok() {
            self.commands.closed().await;
        }
    }

    /// Returns true once the poll loop has exited.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.commands.is_closed()
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::PollerStopped)
    }
}
