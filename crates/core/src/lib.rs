// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ff-core: domain types for the cross-device measurement flow.
//!
//! Everything here is pure data and logic — no IO. The flow document,
//! its status state machine, capture artifacts, raw compute-job results
//! and the validation engine all live in this crate so the client and
//! engine crates can share one vocabulary.

pub mod macros;

pub mod capture;
pub mod clock;
pub mod flow;
pub mod id;
pub mod measurement;
pub mod settings;
pub mod validation;

pub use capture::{CaptureArtifact, CaptureFlowType, CaptureSet, DeviceCoordinates, PhotoSlot};
pub use clock::{Clock, FakeClock, SystemClock};
pub use flow::{FlowDocument, FlowPatch, FlowState, FlowStatus, TransitionError};
pub use id::{FlowId, PersonId, TaskId};
pub use measurement::{
    ClothesCode, ClothesType, ClothesTypes, FrontParams, JobResult, Measurements, SubTaskFailure,
    FRONT_SLOT_PREFIX, MEASUREMENT_SLOT_PREFIX, SIDE_SLOT_PREFIX,
};
pub use settings::{FinalPageMode, Gender, GenderRule, Units, WidgetSettings};
pub use validation::{hard_validation, soft_validation, HardValidation, SoftValidation};
