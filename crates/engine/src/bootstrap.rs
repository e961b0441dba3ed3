// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session entry on either device.
//!
//! The desktop creates the flow ([`SessionBootstrap::create_session`]);
//! the mobile device re-enters it via the handoff URL
//! ([`SessionBootstrap::resume_session`]). Re-entry is also how a
//! reloaded or unlocked device recovers: everything the UI needs is
//! rebuilt from the remote document, never from local leftovers.

use crate::outcome::{classify_api_error, SessionFailure};
use async_trait::async_trait;
use ff_client::{FlowResource, PersonProfile};
use ff_core::flow::{FlowDocument, FlowPatch, FlowStatus};
use ff_core::id::{FlowId, PersonId, TaskId};
use ff_core::measurement::Measurements;
use ff_core::settings::{Gender, Units, WidgetSettings};
use ff_core::validation::{HardValidation, SoftValidation};
use std::sync::Arc;

/// Integration inputs known at widget start, seeded into the flow so
/// the mobile side sees them without a second channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitialInputs {
    pub brand: Option<String>,
    pub body_part: Option<String>,
    pub product_url: Option<String>,
    pub return_url: Option<String>,
}

/// Local mirror of everything a session screen needs, rebuilt from the
/// remote document on every (re-)entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub flow_id: FlowId,
    pub status: FlowStatus,
    pub settings: WidgetSettings,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub email: Option<String>,
    pub units: Option<Units>,
    pub person_id: Option<PersonId>,
    pub task_id: Option<TaskId>,
    pub measurements: Option<Measurements>,
    pub soft_validation: Option<SoftValidation>,
    pub hard_validation: Option<HardValidation>,
    pub process_status: Option<String>,
    pub brand: Option<String>,
    pub body_part: Option<String>,
    pub product_url: Option<String>,
    pub return_url: Option<String>,
    pub widget_url: Option<String>,
    pub phone_number: Option<String>,
    pub photos_from_gallery: bool,
}

impl SessionState {
    /// Rebuild from the remote document. The brand gender constraint
    /// overrides the stored choice, and stored measurements are
    /// re-restricted in case the output subset changed since they were
    /// written.
    pub fn from_document(doc: &FlowDocument, settings: WidgetSettings) -> Self {
        let state = &doc.state;
        Self {
            flow_id: doc.id.clone(),
            status: state.status,
            gender: settings.resolved_gender(state.gender),
            height: state.height,
            weight: state.weight,
            email: state.email.clone(),
            units: state.units,
            person_id: state.person_id.clone(),
            task_id: state.task_id.clone(),
            measurements: state.measurements.as_ref().map(|m| m.restricted(&settings)),
            soft_validation: state.soft_validation.clone(),
            hard_validation: state.hard_validation.clone(),
            process_status: state.process_status.clone(),
            brand: state.brand.clone(),
            body_part: state.body_part.clone(),
            product_url: state.product_url.clone(),
            return_url: state.return_url.clone(),
            widget_url: state.widget_url.clone(),
            phone_number: state.phone_number.clone(),
            photos_from_gallery: state.photos_from_gallery,
            settings,
        }
    }

    /// Clear everything tied to the current measurement run, keeping
    /// identity and integration fields. Used when the user restarts
    /// after a hard-validation retake or a fatal failure.
    pub fn reset(&mut self) {
        self.person_id = None;
        self.task_id = None;
        self.measurements = None;
        self.soft_validation = None;
        self.hard_validation = None;
        self.process_status = None;
    }

    /// Demographics as a compute-service profile, once complete.
    pub fn profile(&self) -> Option<PersonProfile> {
        Some(PersonProfile {
            gender: self.gender?,
            height: self.height?,
            weight: self.weight,
            email: self.email.clone(),
        })
    }

    pub fn has_results(&self) -> bool {
        self.status.is_finished()
            && self.measurements.as_ref().is_some_and(|m| !m.is_empty())
    }
}

/// Creates or re-enters the shared flow.
#[derive(Clone)]
pub struct SessionBootstrap {
    flow: Arc<dyn FlowResource>,
}

impl SessionBootstrap {
    pub fn new(flow: Arc<dyn FlowResource>) -> Self {
        Self { flow }
    }

    pub fn flow(&self) -> &Arc<dyn FlowResource> {
        &self.flow
    }

    /// Desktop entry: create the flow seeded with the integration
    /// inputs, then fetch the widget settings.
    pub async fn create_session(
        &self,
        inputs: InitialInputs,
    ) -> Result<SessionState, SessionFailure> {
        let mut patch = FlowPatch::default().status(FlowStatus::Created);
        if let Some(brand) = inputs.brand {
            patch = patch.brand(brand);
        }
        if let Some(body_part) = inputs.body_part {
            patch = patch.body_part(body_part);
        }
        if let Some(url) = inputs.product_url {
            patch = patch.product_url(url);
        }
        if let Some(url) = inputs.return_url {
            patch = patch.return_url(url);
        }

        let id = self.flow.create(patch).await.map_err(classify_api_error)?;
        let settings = self.flow.settings().await.map_err(classify_api_error)?;
        let doc = match self.flow.cached() {
            Some(doc) => doc,
            None => self.flow.get().await.map_err(classify_api_error)?,
        };
        tracing::info!(flow = %id, "session created");
        Ok(SessionState::from_document(&doc, settings))
    }

    /// Re-enter an existing flow: fetch the document and settings and
    /// rebuild the local state from them.
    pub async fn resume_session(&self) -> Result<SessionState, SessionFailure> {
        let doc = self.flow.get().await.map_err(classify_api_error)?;
        let settings = match doc.widget_settings.clone() {
            Some(settings) => settings,
            None => self.flow.settings().await.map_err(classify_api_error)?,
        };
        tracing::debug!(flow = %doc.id, status = %doc.status(), "session resumed");
        Ok(SessionState::from_document(&doc, settings))
    }
}

/// Anything that can re-enter a session. Entry points compose a
/// [`SessionBootstrap`] and pick up re-entry for free.
#[async_trait]
pub trait SessionBootstrapCapable: Send + Sync {
    fn bootstrap(&self) -> &SessionBootstrap;

    async fn reenter(&self) -> Result<SessionState, SessionFailure> {
        self.bootstrap().resume_session().await
    }
}

/// Results-only entry: a device opening the flow after completion,
/// without claiming it or running the pipeline.
pub struct DirectResultsEntry {
    bootstrap: SessionBootstrap,
}

impl DirectResultsEntry {
    pub fn new(flow: Arc<dyn FlowResource>) -> Self {
        Self { bootstrap: SessionBootstrap::new(flow) }
    }

    /// Load the session; the caller renders results when
    /// [`SessionState::has_results`] holds, or a waiting screen
    /// otherwise.
    pub async fn load(&self) -> Result<SessionState, SessionFailure> {
        self.reenter().await
    }
}

#[async_trait]
impl SessionBootstrapCapable for DirectResultsEntry {
    fn bootstrap(&self) -> &SessionBootstrap {
        &self.bootstrap
    }
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
