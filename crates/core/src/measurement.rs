// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw compute-job results and the measurement payload stored on the flow.

use crate::settings::WidgetSettings;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sub-task name prefix identifying the front photo slot.
pub const FRONT_SLOT_PREFIX: &str = "front_";
/// Sub-task name prefix identifying the side photo slot.
pub const SIDE_SLOT_PREFIX: &str = "side_";
/// Sub-task name prefix identifying the measurement computation itself.
pub const MEASUREMENT_SLOT_PREFIX: &str = "measurement_";

/// One failed sub-task in a rejected job, as returned by the compute API.
///
/// `name` carries the slot prefix; `message` is nullable and only a
/// non-null message marks the slot as defective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTaskFailure {
    pub name: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl SubTaskFailure {
    pub fn new(name: impl Into<String>, message: Option<&str>) -> Self {
        Self { name: name.into(), message: message.map(str::to_owned) }
    }
}

/// Garment classification code (`t2` = loose top, `b1` = loose bottom).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothesCode {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothesTypes {
    pub top: ClothesCode,
    pub bottom: ClothesCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothesType {
    #[serde(default)]
    pub types: Option<ClothesTypes>,
}

/// Geometric/classification parameters computed from the front photo.
///
/// Measurement keys beyond the named fields are carried in `extra` so
/// the payload survives a round trip without the crate knowing every
/// measurement the service emits.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrontParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legs_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_area_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clothes_type: Option<ClothesType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw result of a successful measurement job.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobResult {
    #[serde(default)]
    pub front_params: FrontParams,
    #[serde(default)]
    pub side_params: Map<String, Value>,
    #[serde(default)]
    pub volume_params: Map<String, Value>,
}

impl JobResult {
    /// Body type classification, if the job produced one.
    pub fn body_type(&self) -> Option<&str> {
        self.volume_params.get("body_type").and_then(Value::as_str)
    }

    /// Convert into the measurement payload written to the flow,
    /// applying the widget's custom output subset when configured.
    pub fn to_measurements(&self, settings: &WidgetSettings) -> Measurements {
        let front = match serde_json::to_value(&self.front_params) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        if !settings.has_custom_output() {
            return Measurements {
                front_params: front,
                side_params: self.side_params.clone(),
                volume_params: self.volume_params.clone(),
            };
        }

        Measurements {
            front_params: filter_output(&front, settings),
            side_params: filter_output(&self.side_params, settings),
            volume_params: filter_output(&self.volume_params, settings),
        }
    }
}

/// Measurement payload persisted on the flow document and rendered on
/// the results screen of either device.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(default)]
    pub front_params: Map<String, Value>,
    #[serde(default)]
    pub side_params: Map<String, Value>,
    #[serde(default)]
    pub volume_params: Map<String, Value>,
}

impl Measurements {
    pub fn is_empty(&self) -> bool {
        self.front_params.is_empty() && self.side_params.is_empty() && self.volume_params.is_empty()
    }

    /// Re-apply the custom output subset to a stored payload, e.g. when
    /// a flow written before a settings change is re-read.
    pub fn restricted(&self, settings: &WidgetSettings) -> Measurements {
        if !settings.has_custom_output() {
            return self.clone();
        }
        Measurements {
            front_params: filter_output(&self.front_params, settings),
            side_params: filter_output(&self.side_params, settings),
            volume_params: filter_output(&self.volume_params, settings),
        }
    }
}

/// Keep only measurement keys enabled in the custom output subset.
fn filter_output(params: &Map<String, Value>, settings: &WidgetSettings) -> Map<String, Value> {
    params
        .iter()
        .filter(|(key, _)| settings.output_measurements.get(*key).copied().unwrap_or(false))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
#[path = "measurement_tests.rs"]
mod tests;
