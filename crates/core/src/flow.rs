// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flow document: the single shared mutable resource of a session.
//!
//! The document lives on the remote flow service and is the only
//! rendezvous point between the desktop and mobile devices. Mutation is
//! always a field-level merge ([`FlowState::apply`]); a patch never
//! clears fields it does not name.

use crate::id::{FlowId, PersonId, TaskId};
use crate::measurement::Measurements;
use crate::settings::{Gender, Units, WidgetSettings};
use crate::validation::{HardValidation, SoftValidation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session progress, the single source of truth for both devices.
///
/// Monotonic in normal operation. `close-confirm` is a suspension
/// side-channel: it can be entered from any state and observers must
/// treat it as "ignore, do not advance".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowStatus {
    Created,
    OpenedOnMobile,
    SetMetadata,
    Finished,
    CloseConfirm,
}

crate::simple_display! {
    FlowStatus {
        Created => "created",
        OpenedOnMobile => "opened-on-mobile",
        SetMetadata => "set-metadata",
        Finished => "finished",
        CloseConfirm => "close-confirm",
    }
}

/// Attempted status write that would move the flow backwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal flow status transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: FlowStatus,
    pub to: FlowStatus,
}

impl FlowStatus {
    /// Position in the forward progression; `close-confirm` sits
    /// outside it.
    fn rank(self) -> Option<u8> {
        match self {
            FlowStatus::Created => Some(0),
            FlowStatus::OpenedOnMobile => Some(1),
            FlowStatus::SetMetadata => Some(2),
            FlowStatus::Finished => Some(3),
            FlowStatus::CloseConfirm => None,
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(self, FlowStatus::Finished)
    }

    /// Validate a status write. Every writer goes through this before
    /// patching the remote document; a backwards move (e.g. `finished`
    /// -> `opened-on-mobile`) is rejected at the boundary instead of
    /// relying on caller discipline.
    ///
    /// Entering or leaving `close-confirm` is always legal: suspension
    /// and external resets happen from any state.
    pub fn validate_transition(from: FlowStatus, to: FlowStatus) -> Result<(), TransitionError> {
        match (from.rank(), to.rank()) {
            (None, _) | (_, None) => Ok(()),
            (Some(a), Some(b)) if b >= a => Ok(()),
            _ => Err(TransitionError { from, to }),
        }
    }
}

/// Mutable session state held under the flow document's `state` key.
///
/// Wire names are camelCase to match the flow API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowState {
    pub status: FlowStatus,
    /// Liveness heartbeat from the claiming device, epoch ms. Used by
    /// the other side purely as a freshness signal, never for ordering.
    pub last_active_date: Option<u64>,
    /// Human-readable stage label, advisory only.
    pub process_status: Option<String>,
    pub person_id: Option<PersonId>,
    pub task_id: Option<TaskId>,
    pub measurements: Option<Measurements>,
    pub soft_validation: Option<SoftValidation>,
    pub hard_validation: Option<HardValidation>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub email: Option<String>,
    pub units: Option<Units>,
    pub phone_number: Option<String>,
    pub brand: Option<String>,
    pub body_part: Option<String>,
    pub product_url: Option<String>,
    pub return_url: Option<String>,
    pub widget_url: Option<String>,
    pub photos_from_gallery: bool,
}

impl Default for FlowState {
    fn default() -> Self {
        Self {
            status: FlowStatus::Created,
            last_active_date: None,
            process_status: None,
            person_id: None,
            task_id: None,
            measurements: None,
            soft_validation: None,
            hard_validation: None,
            gender: None,
            height: None,
            weight: None,
            email: None,
            units: None,
            phone_number: None,
            brand: None,
            body_part: None,
            product_url: None,
            return_url: None,
            widget_url: None,
            photos_from_gallery: false,
        }
    }
}

impl FlowState {
    /// Merge a partial update into this state. Only fields the patch
    /// names are overwritten; result payloads are replaced wholesale,
    /// never appended to.
    pub fn apply(&mut self, patch: &FlowPatch) {
        macro_rules! merge {
            ($($field:ident),+ $(,)?) => {
                $(if let Some(value) = &patch.$field {
                    self.$field = Some(value.clone());
                })+
            };
        }

        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(flag) = patch.photos_from_gallery {
            self.photos_from_gallery = flag;
        }
        merge!(
            last_active_date,
            process_status,
            person_id,
            task_id,
            measurements,
            soft_validation,
            hard_validation,
            gender,
            height,
            weight,
            email,
            units,
            phone_number,
            brand,
            body_part,
            product_url,
            return_url,
            widget_url,
        );
    }
}

/// The remote flow document as returned by the flow API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowDocument {
    #[serde(default = "FlowId::new")]
    pub id: FlowId,
    #[serde(default)]
    pub state: FlowState,
    #[serde(default)]
    pub widget_settings: Option<WidgetSettings>,
}

impl FlowDocument {
    pub fn new(id: FlowId) -> Self {
        Self { id, state: FlowState::default(), widget_settings: None }
    }

    pub fn status(&self) -> FlowStatus {
        self.state.status
    }
}

/// Field-merge partial for `PATCH`ing the flow state. Unset fields are
/// omitted from the wire payload entirely.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FlowStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_date: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Measurements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_validation: Option<SoftValidation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard_validation: Option<HardValidation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<Units>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos_from_gallery: Option<bool>,
}

impl FlowPatch {
    pub fn status(mut self, status: FlowStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn last_active_date(mut self, epoch_ms: u64) -> Self {
        self.last_active_date = Some(epoch_ms);
        self
    }

    pub fn process_status(mut self, label: impl Into<String>) -> Self {
        self.process_status = Some(label.into());
        self
    }

    pub fn person_id(mut self, person: PersonId) -> Self {
        self.person_id = Some(person);
        self
    }

    pub fn task_id(mut self, task: TaskId) -> Self {
        self.task_id = Some(task);
        self
    }

    pub fn measurements(mut self, measurements: Measurements) -> Self {
        self.measurements = Some(measurements);
        self
    }

    pub fn soft_validation(mut self, soft: SoftValidation) -> Self {
        self.soft_validation = Some(soft);
        self
    }

    pub fn hard_validation(mut self, hard: HardValidation) -> Self {
        self.hard_validation = Some(hard);
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn body_part(mut self, body_part: impl Into<String>) -> Self {
        self.body_part = Some(body_part.into());
        self
    }

    pub fn product_url(mut self, url: impl Into<String>) -> Self {
        self.product_url = Some(url.into());
        self
    }

    pub fn return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }
}

#[cfg(test)]
#[path = "flow_tests.rs"]
mod tests;
