// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the scenario tests.

pub use ff_client::fake::{sample_job_result, FakeComputeApi, FakeFlowResource};
pub use ff_client::JobPoll;
pub use ff_core::capture::{CaptureArtifact, CaptureFlowType, CaptureSet, DeviceCoordinates, PhotoSlot};
pub use ff_core::clock::{Clock, FakeClock};
pub use ff_core::flow::FlowStatus;
pub use ff_core::settings::Gender;
pub use ff_engine::{
    visibility_channel, FlowSynchronizer, HeartbeatConfig, MeasurementJobPipeline, MobileEntry,
    MobileSessionController, PipelineConfig, PipelineOutcome, RunContext, SessionBootstrap,
    SessionState, SyncConfig, SyncEvent,
};
pub use std::sync::Arc;
pub use std::time::Duration;
pub use tokio::sync::mpsc;

pub fn fast_sync() -> SyncConfig {
    SyncConfig { poll_interval: Duration::from_millis(5), stale_after_ms: 9_000 }
}

pub fn fast_heartbeat() -> HeartbeatConfig {
    HeartbeatConfig { interval: Duration::from_millis(5) }
}

pub fn fast_pipeline() -> PipelineConfig {
    PipelineConfig {
        pace: Duration::from_millis(1),
        poll_interval: Duration::from_millis(1),
        max_poll_attempts: 45,
    }
}

pub fn artifact() -> CaptureArtifact {
    CaptureArtifact::new(vec![0xFF, 0xD8, 0xFF], DeviceCoordinates { beta_x: 0.4, gamma_y: 1.2 })
}

pub fn full_captures() -> CaptureSet {
    let mut set = CaptureSet::default();
    set.set(PhotoSlot::Front, artifact());
    set.set(PhotoSlot::Side, artifact());
    set
}

/// Fill in the demographics the capture journey collects before the
/// pipeline starts.
pub fn with_demographics(state: &mut SessionState) {
    state.gender = Some(Gender::Female);
    state.height = Some(168.0);
    state.weight = Some(61.0);
}

pub async fn next_event(rx: &mut mpsc::Receiver<SyncEvent>) -> SyncEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("sync event within deadline")
        .expect("sync channel open")
}

/// Drain until the given event arrives, failing on channel close.
pub async fn wait_for_event(rx: &mut mpsc::Receiver<SyncEvent>, wanted: &SyncEvent) {
    loop {
        if next_event(rx).await == *wanted {
            return;
        }
    }
}
