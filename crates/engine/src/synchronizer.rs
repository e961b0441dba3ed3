// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop-side flow observer.
//!
//! Polls the shared document on a fixed cadence and derives the
//! cross-device signals: mobile liveness from `lastActiveDate`
//! freshness, and completion from the `finished` status. Poll failures
//! are logged and skipped; the loop only ends on completion or
//! cancellation.

use crate::outcome::SessionFailure;
use ff_client::FlowResource;
use ff_core::clock::Clock;
use ff_core::flow::{FlowState, FlowStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Polling cadence and liveness window.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub poll_interval: Duration,
    /// A heartbeat older than this is a disconnect.
    pub stale_after_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_secs(3), stale_after_ms: 9_000 }
    }
}

/// Signals surfaced to the desktop screen.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The mobile device claimed the flow and its heartbeat is fresh.
    MobileActive,
    /// The claimed flow's heartbeat went stale (device locked, tab
    /// closed, connectivity lost).
    Disconnected,
    /// Terminal state observed; carries the final flow state.
    Finished(Box<FlowState>),
    /// The widget key was deactivated while observing.
    Deactivated,
}

/// Running observer loop. Dropping the handle does not stop the loop;
/// cancel it explicitly.
pub struct SyncHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SyncHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel and wait for the loop to wind down.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Observer of the shared flow document.
pub struct FlowSynchronizer<C: Clock> {
    flow: Arc<dyn FlowResource>,
    clock: C,
    config: SyncConfig,
}

impl<C: Clock + 'static> FlowSynchronizer<C> {
    pub fn new(flow: Arc<dyn FlowResource>, clock: C, config: SyncConfig) -> Self {
        Self { flow, clock, config }
    }

    /// Start the poll loop. Events are deduplicated: a signal is only
    /// sent when it differs from the previous one, so a steady
    /// heartbeat produces a single `MobileActive`.
    pub fn spawn(self, events: mpsc::Sender<SyncEvent>) -> SyncHandle {
        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            self.run(events, loop_cancel).await;
        });
        SyncHandle { cancel, task }
    }

    async fn run(self, events: mpsc::Sender<SyncEvent>, cancel: CancellationToken) {
        let mut last_sent: Option<SyncEvent> = None;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }

            let doc = match self.flow.get().await {
                Ok(doc) => doc,
                Err(err) if err.is_widget_deactivated() => {
                    let _ = events.send(SyncEvent::Deactivated).await;
                    break;
                }
                Err(err) => {
                    tracing::debug!(error = %err, "flow poll failed, will retry");
                    continue;
                }
            };

            match doc.status() {
                // Suspension side-channel: ignore entirely.
                FlowStatus::CloseConfirm => continue,
                FlowStatus::Created => continue,
                FlowStatus::Finished => {
                    let _ = events.send(SyncEvent::Finished(Box::new(doc.state))).await;
                    break;
                }
                FlowStatus::OpenedOnMobile | FlowStatus::SetMetadata => {
                    let event = if self.heartbeat_fresh(&doc.state) {
                        SyncEvent::MobileActive
                    } else {
                        SyncEvent::Disconnected
                    };
                    if last_sent.as_ref() != Some(&event) {
                        tracing::debug!(event = ?event, "mobile liveness changed");
                        if events.send(event.clone()).await.is_err() {
                            break;
                        }
                        last_sent = Some(event);
                    }
                }
            }
        }
    }

    fn heartbeat_fresh(&self, state: &FlowState) -> bool {
        state
            .last_active_date
            .is_some_and(|seen| {
                self.clock.epoch_ms().saturating_sub(seen) <= self.config.stale_after_ms
            })
    }
}

impl SyncEvent {
    /// Failure equivalent for callers that fold the event stream into
    /// the session outcome.
    pub fn as_failure(&self) -> Option<SessionFailure> {
        match self {
            SyncEvent::Deactivated => Some(SessionFailure::Deactivated),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "synchronizer_tests.rs"]
mod tests;
