//! Event types and the driver for the `watch` loop.
//!
//! This module defines the [`Event`] enum (ticks, enriched state updates and
//! shutdown) and the [`EventHandler`], which runs a background ticker and a
//! Ctrl-C listener. The main loop receives events via [`EventHandler::next`];
//! other tasks (e.g. the OpenSky poller) send events via [`EventHandler::tx`].

use crate::states::StatesSnapshot;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Events processed by the watch loop.
#[derive(Debug)]
pub enum Event {
    /// Periodic tick used for reference-file change checks.
    Tick,
    /// Result of one poll of the state-vector feed.
    StatesUpdate {
        /// Enriched flights; `None` when the fetch failed.
        snapshot: Option<StatesSnapshot>,
        /// When this update was produced.
        timestamp: Instant,
    },
    /// Ctrl-C or an upstream request to stop.
    Shutdown,
}

/// Multiplexes ticks, poll results and shutdown into a single stream.
///
/// The sender ([`tx`](EventHandler::tx)) can be cloned and handed to other
/// tasks, while the receiver is consumed by [`next`](EventHandler::next).
pub struct EventHandler {
    /// Sender for posting events (e.g. from the poller).
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates the handler and spawns the ticker and Ctrl-C tasks.
    ///
    /// Both tasks stop once the receiving side is dropped.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let tick_tx = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            interval.tick().await;
            loop {
                interval.tick().await;
                if tick_tx.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        let signal_tx = tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                signal_tx.send(Event::Shutdown).ok();
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event. `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
