// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ff-client: typed clients for the two remote services.
//!
//! [`FlowResource`] is the read/update interface to the server-held
//! flow document (the only rendezvous point between devices) and
//! [`ComputeApi`] is the person-profile/measurement-job interface.
//! Neither client retries internally; retry policy belongs to the
//! engine.

pub mod compute;
pub mod error;
pub mod flow;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{sample_job_result, FakeComputeApi, FakeFlowResource, FlowCall};

pub use compute::{CaptureUpload, ComputeApi, ComputeClient, JobPoll, PersonProfile};
pub use error::{ApiError, WIDGET_INACTIVE_DETAIL};
pub use flow::{FlowClient, FlowResource};
