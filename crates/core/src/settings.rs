// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Widget configuration fetched at bootstrap.
//!
//! Settings are brand-level: they constrain the gender input, restrict
//! the measurement output to a custom subset, and pick the final-page
//! mode. They are immutable for the lifetime of a session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Demographic gender input captured before the capture step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

crate::simple_display! {
    Gender {
        Female => "female",
        Male => "male",
    }
}

/// Brand-level constraint on the gender input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderRule {
    /// No constraint; the user's stored choice applies.
    #[default]
    All,
    Female,
    Male,
}

/// Measurement units for height/weight display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Cm,
    In,
}

/// What the widget shows once measurements exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalPageMode {
    #[default]
    Measurements,
    Thanks,
}

/// Widget settings document.
///
/// Wire names follow the configuration API (snake_case).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WidgetSettings {
    #[serde(default)]
    pub gender: GenderRule,
    /// When true, `output_measurements` restricts the measurement keys
    /// surfaced to the integrating brand.
    #[serde(default)]
    pub is_custom_output_measurements: bool,
    /// Measurement keys to keep; only entries mapped to `true` survive.
    #[serde(default)]
    pub output_measurements: BTreeMap<String, bool>,
    #[serde(default)]
    pub final_page: FinalPageMode,
}

impl WidgetSettings {
    /// Whether a custom output subset is configured.
    pub fn has_custom_output(&self) -> bool {
        self.is_custom_output_measurements && !self.output_measurements.is_empty()
    }

    /// Resolve the effective gender: a brand constraint wins over the
    /// value stored on the flow.
    pub fn resolved_gender(&self, stored: Option<Gender>) -> Option<Gender> {
        match self.gender {
            GenderRule::All => stored,
            GenderRule::Female => Some(Gender::Female),
            GenderRule::Male => Some(Gender::Male),
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
