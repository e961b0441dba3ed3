// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation engine: pure classification of measurement-job outcomes.
//!
//! Hard validation comes from the failure list of a rejected job and
//! blocks completion until the defective photo is retaken. Soft
//! validation is computed from a successful result and is advisory
//! only. All numeric thresholds are strict cutoffs; a value equal to
//! the threshold is not flagged.

use crate::measurement::{
    JobResult, SubTaskFailure, FRONT_SLOT_PREFIX, MEASUREMENT_SLOT_PREFIX, SIDE_SLOT_PREFIX,
};
use serde::{Deserialize, Serialize};

/// Garment code the classifier emits for a loose top.
pub const LOOSE_TOP_CODE: &str = "t2";
/// Garment code the classifier emits for loose bottoms.
pub const LOOSE_BOTTOM_CODE: &str = "b1";

/// Inter-leg distance above which legs are flagged as too wide.
pub const WIDE_LEGS_DISTANCE: f64 = 20.0;
/// Inter-leg distance below which legs are flagged as too close.
pub const SMALL_LEGS_DISTANCE: f64 = 2.0;
/// Body-area fraction below which the subject is too small in frame.
pub const LOW_BODY_AREA_PERCENTAGE: f64 = 0.5;

/// Advisory plausibility flags derived from a successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftValidation {
    pub loose_top: bool,
    pub loose_bottom: bool,
    pub loose_top_and_bottom: bool,
    pub wide_legs: bool,
    pub small_legs: bool,
    pub low_body_area_percentage: bool,
}

impl SoftValidation {
    pub fn any(&self) -> bool {
        self.loose_top
            || self.loose_bottom
            || self.loose_top_and_bottom
            || self.wide_legs
            || self.small_legs
            || self.low_body_area_percentage
    }
}

/// Per-photo defects returned by a rejected job.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    /// Set when the measurement computation itself failed, independent
    /// of per-photo defects. Forces both photos to be retaken.
    #[serde(default)]
    pub measurement_error: bool,
}

impl HardValidation {
    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.side.is_none() && !self.measurement_error
    }

    /// Which capture slots must be cleared for a retake: `(front, side)`.
    pub fn slots_to_clear(&self) -> (bool, bool) {
        if self.measurement_error {
            return (true, true);
        }
        (self.front.is_some(), self.side.is_some())
    }
}

/// Classify a successful job result into advisory flags.
pub fn soft_validation(result: &JobResult) -> SoftValidation {
    let mut soft = SoftValidation::default();
    let front = &result.front_params;

    if let Some(types) = front.clothes_type.as_ref().and_then(|c| c.types.as_ref()) {
        let top_loose = types.top.code == LOOSE_TOP_CODE;
        let bottom_loose = types.bottom.code == LOOSE_BOTTOM_CODE;
        soft.loose_top = top_loose && !bottom_loose;
        soft.loose_bottom = bottom_loose && !top_loose;
        soft.loose_top_and_bottom = top_loose && bottom_loose;
    }

    if let Some(distance) = front.legs_distance {
        soft.wide_legs = distance > WIDE_LEGS_DISTANCE;
        soft.small_legs = distance < SMALL_LEGS_DISTANCE;
    }

    if let Some(area) = front.body_area_percentage {
        soft.low_body_area_percentage = area < LOW_BODY_AREA_PERCENTAGE;
    }

    soft
}

/// Classify a rejected job's sub-task failures into per-slot defects.
///
/// The first sub-task matching each slot prefix wins; its nullable
/// `message` becomes the slot defect. A `measurement_*` entry sets the
/// independent failure flag regardless of its message.
pub fn hard_validation(sub_tasks: &[SubTaskFailure]) -> HardValidation {
    let slot_message = |prefix: &str| {
        sub_tasks
            .iter()
            .find(|task| task.name.starts_with(prefix))
            .and_then(|task| task.message.clone())
    };

    HardValidation {
        front: slot_message(FRONT_SLOT_PREFIX),
        side: slot_message(SIDE_SLOT_PREFIX),
        measurement_error: sub_tasks.iter().any(|t| t.name.starts_with(MEASUREMENT_SLOT_PREFIX)),
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
