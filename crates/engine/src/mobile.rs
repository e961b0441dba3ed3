// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mobile-side session entry.
//!
//! The mobile device re-enters the flow via the handoff URL, claims it
//! (`status=opened-on-mobile`, cleared stage label) and keeps a
//! heartbeat task writing `lastActiveDate` so the desktop can tell a
//! live session from an abandoned one. Re-entry is idempotent: a
//! finished flow yields its results without any mutation, and a reload
//! mid-pipeline keeps the further-along status it finds.

use crate::bootstrap::{SessionBootstrap, SessionBootstrapCapable, SessionState};
use crate::outcome::{classify_api_error, SessionFailure};
use async_trait::async_trait;
use ff_client::FlowResource;
use ff_core::clock::Clock;
use ff_core::flow::{FlowPatch, FlowStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Heartbeat cadence.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    pub interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(3) }
    }
}

/// Outcome of opening the handoff URL on the mobile device.
#[derive(Debug, Clone, PartialEq)]
pub enum MobileEntry {
    /// Flow claimed (or re-claimed); the capture journey proceeds.
    Claimed(SessionState),
    /// The session already finished; render results, mutate nothing.
    AlreadyFinished(SessionState),
    /// The device cannot run the capture journey; the flow is left
    /// untouched for another device.
    UnsupportedDevice,
}

/// Running heartbeat task. Cancel it when the session leaves the
/// capture journey; dropping the handle does not stop it.
pub struct HeartbeatHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl HeartbeatHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

/// Claims the flow and maintains mobile liveness.
pub struct MobileSessionController<C: Clock> {
    bootstrap: SessionBootstrap,
    clock: C,
    heartbeat: HeartbeatConfig,
}

impl<C: Clock + 'static> MobileSessionController<C> {
    pub fn new(flow: Arc<dyn FlowResource>, clock: C) -> Self {
        Self {
            bootstrap: SessionBootstrap::new(flow),
            clock,
            heartbeat: HeartbeatConfig::default(),
        }
    }

    pub fn with_heartbeat(mut self, config: HeartbeatConfig) -> Self {
        self.heartbeat = config;
        self
    }

    /// Open the handoff URL: capability gate, re-entry, then claim.
    ///
    /// The claim only writes `opened-on-mobile` when that is not a
    /// backwards move; a reload mid-pipeline finds `set-metadata` and
    /// keeps it. Either way the heartbeat field is stamped so the
    /// desktop sees the device as live immediately.
    pub async fn enter(&self, device_supported: bool) -> Result<MobileEntry, SessionFailure> {
        if !device_supported {
            return Ok(MobileEntry::UnsupportedDevice);
        }

        let state = self.reenter().await?;
        if state.status.is_finished() {
            tracing::info!(flow = %state.flow_id, "flow already finished, showing results");
            return Ok(MobileEntry::AlreadyFinished(state));
        }

        let mut patch = FlowPatch::default()
            .process_status("")
            .last_active_date(self.clock.epoch_ms());
        if FlowStatus::validate_transition(state.status, FlowStatus::OpenedOnMobile).is_ok() {
            patch = patch.status(FlowStatus::OpenedOnMobile);
        }

        let doc = self
            .bootstrap
            .flow()
            .update(patch)
            .await
            .map_err(classify_api_error)?;
        tracing::info!(flow = %doc.id, status = %doc.status(), "flow claimed on mobile");
        Ok(MobileEntry::Claimed(SessionState::from_document(&doc, state.settings)))
    }

    /// Start the liveness heartbeat. Write failures are logged and the
    /// loop continues: a missed beat degrades into desktop-side
    /// staleness rather than ending the session.
    pub fn start_heartbeat(&self) -> HeartbeatHandle {
        let flow = Arc::clone(self.bootstrap.flow());
        let clock = self.clock.clone();
        let interval = self.heartbeat.interval;
        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = loop_cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                let beat = FlowPatch::default().last_active_date(clock.epoch_ms());
                if let Err(err) = flow.update(beat).await {
                    if err.is_widget_deactivated() {
                        tracing::warn!("widget deactivated, stopping heartbeat");
                        break;
                    }
                    tracing::warn!(error = %err, "heartbeat write failed");
                }
            }
        });
        HeartbeatHandle { cancel, task }
    }
}

#[async_trait]
impl<C: Clock + 'static> SessionBootstrapCapable for MobileSessionController<C> {
    fn bootstrap(&self) -> &SessionBootstrap {
        &self.bootstrap
    }
}

#[cfg(test)]
#[path = "mobile_tests.rs"]
mod tests;
