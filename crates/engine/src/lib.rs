// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ff-engine: session orchestration across two devices.
//!
//! The desktop side runs [`FlowSynchronizer`] (poll loop watching the
//! shared flow document); the mobile side runs
//! [`MobileSessionController`] (claim + heartbeat) and hands off to
//! [`MeasurementJobPipeline`] once both photos exist. [`SessionBootstrap`]
//! creates or re-enters the flow on either side. Concurrency is purely
//! cooperative: independently scheduled timer tasks plus at most one
//! in-flight pipeline, all cancellable via their handles.

pub mod bootstrap;
pub mod mobile;
pub mod outcome;
pub mod pipeline;
pub mod synchronizer;
pub mod visibility;

pub use bootstrap::{
    DirectResultsEntry, InitialInputs, SessionBootstrap, SessionBootstrapCapable, SessionState,
};
pub use mobile::{HeartbeatConfig, HeartbeatHandle, MobileEntry, MobileSessionController};
pub use outcome::{classify_api_error, EngineError, SessionFailure};
pub use pipeline::{
    MeasurementJobPipeline, PipelineConfig, PipelineOutcome, RunContext, PROCESS_CALCULATING,
    PROCESS_INITIATING_PROFILE, PROCESS_PROFILE_CREATED, PROCESS_SENDING_RESULTS,
    PROCESS_UPLOADED, PROCESS_UPLOADING,
};
pub use synchronizer::{FlowSynchronizer, SyncConfig, SyncEvent, SyncHandle};
pub use visibility::{visibility_channel, VisibilitySignal, VisibilityState};
