// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fakes for engine and scenario tests.
//!
//! `FakeFlowResource` implements real field-merge semantics over a
//! shared document and records every call so tests can assert on write
//! ordering and idempotency. `FakeComputeApi` is scripted: tests queue
//! poll outcomes and count endpoint invocations.

use crate::compute::{CaptureUpload, ComputeApi, JobPoll, PersonProfile};
use crate::error::{ApiError, WIDGET_INACTIVE_DETAIL};
use crate::flow::FlowResource;
use async_trait::async_trait;
use ff_core::flow::{FlowDocument, FlowPatch, FlowState};
use ff_core::id::{FlowId, PersonId, TaskId};
use ff_core::measurement::JobResult;
use ff_core::settings::WidgetSettings;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One recorded call against the fake flow resource.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowCall {
    Create(FlowPatch),
    Get,
    Update(FlowPatch),
    UpdateLocal(FlowPatch),
    Deactivate,
    Settings,
}

/// In-memory flow resource with server-side merge semantics.
#[derive(Default)]
pub struct FakeFlowResource {
    doc: Mutex<FlowDocument>,
    settings: Mutex<WidgetSettings>,
    calls: Mutex<Vec<FlowCall>>,
    get_errors: Mutex<VecDeque<ApiError>>,
    update_errors: Mutex<VecDeque<ApiError>>,
    deactivated: Mutex<bool>,
}

impl FakeFlowResource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mutate: impl FnOnce(&mut FlowState)) -> Self {
        let fake = Self::new();
        fake.mutate_state(mutate);
        fake
    }

    /// Mutate the shared document directly, as the "other device" or
    /// the server would.
    pub fn mutate_state(&self, mutate: impl FnOnce(&mut FlowState)) {
        mutate(&mut self.doc.lock().state);
    }

    pub fn set_settings(&self, settings: WidgetSettings) {
        *self.settings.lock() = settings;
    }

    /// Embed settings in the flow document itself, as the flow API does
    /// when the widget configuration is denormalized onto the flow.
    pub fn embed_settings(&self, settings: WidgetSettings) {
        self.doc.lock().widget_settings = Some(settings);
    }

    /// Simulate widget deactivation: every subsequent network call
    /// fails with the deactivation 401.
    pub fn set_deactivated(&self, deactivated: bool) {
        *self.deactivated.lock() = deactivated;
    }

    pub fn push_get_error(&self, err: ApiError) {
        self.get_errors.lock().push_back(err);
    }

    pub fn push_update_error(&self, err: ApiError) {
        self.update_errors.lock().push_back(err);
    }

    pub fn document(&self) -> FlowDocument {
        self.doc.lock().clone()
    }

    pub fn state(&self) -> FlowState {
        self.doc.lock().state.clone()
    }

    pub fn calls(&self) -> Vec<FlowCall> {
        self.calls.lock().clone()
    }

    /// Remote patches, in write order.
    pub fn patches(&self) -> Vec<FlowPatch> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                FlowCall::Update(patch) => Some(patch.clone()),
                _ => None,
            })
            .collect()
    }

    /// `lastActiveDate` values written by heartbeats, in order.
    pub fn heartbeat_writes(&self) -> Vec<u64> {
        self.patches().iter().filter_map(|p| p.last_active_date).collect()
    }

    pub fn get_count(&self) -> usize {
        self.calls.lock().iter().filter(|c| matches!(c, FlowCall::Get)).count()
    }

    fn record(&self, call: FlowCall) {
        self.calls.lock().push(call);
    }

    fn check_active(&self) -> Result<(), ApiError> {
        if *self.deactivated.lock() {
            Err(ApiError::Unauthorized { detail: Some(WIDGET_INACTIVE_DETAIL.into()) })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FlowResource for FakeFlowResource {
    async fn create(&self, initial: FlowPatch) -> Result<FlowId, ApiError> {
        self.record(FlowCall::Create(initial.clone()));
        self.check_active()?;
        let mut doc = self.doc.lock();
        doc.state.apply(&initial);
        Ok(doc.id.clone())
    }

    async fn get(&self) -> Result<FlowDocument, ApiError> {
        self.record(FlowCall::Get);
        self.check_active()?;
        if let Some(err) = self.get_errors.lock().pop_front() {
            return Err(err);
        }
        Ok(self.doc.lock().clone())
    }

    async fn update(&self, patch: FlowPatch) -> Result<FlowDocument, ApiError> {
        self.record(FlowCall::Update(patch.clone()));
        self.check_active()?;
        if let Some(err) = self.update_errors.lock().pop_front() {
            return Err(err);
        }
        let mut doc = self.doc.lock();
        doc.state.apply(&patch);
        Ok(doc.clone())
    }

    fn update_local(&self, patch: FlowPatch) {
        self.record(FlowCall::UpdateLocal(patch.clone()));
        self.doc.lock().state.apply(&patch);
    }

    fn cached(&self) -> Option<FlowDocument> {
        Some(self.doc.lock().clone())
    }

    async fn deactivate(&self) -> Result<(), ApiError> {
        self.record(FlowCall::Deactivate);
        *self.deactivated.lock() = true;
        Ok(())
    }

    async fn settings(&self) -> Result<WidgetSettings, ApiError> {
        self.record(FlowCall::Settings);
        self.check_active()?;
        Ok(self.settings.lock().clone())
    }
}

/// Scripted compute service with invocation counters.
#[derive(Default)]
pub struct FakeComputeApi {
    pub create_person_calls: AtomicUsize,
    pub update_person_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub calculate_calls: AtomicUsize,
    pub poll_calls: AtomicUsize,
    person: Mutex<Option<PersonId>>,
    task: Mutex<Option<TaskId>>,
    create_error: Mutex<Option<ApiError>>,
    upload_error: Mutex<Option<ApiError>>,
    polls: Mutex<VecDeque<JobPoll>>,
}

impl FakeComputeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue poll outcomes; once drained, further polls report Pending.
    pub fn script_polls(&self, outcomes: impl IntoIterator<Item = JobPoll>) {
        self.polls.lock().extend(outcomes);
    }

    pub fn fail_create(&self, err: ApiError) {
        *self.create_error.lock() = Some(err);
    }

    pub fn fail_upload(&self, err: ApiError) {
        *self.upload_error.lock() = Some(err);
    }

    pub fn created_person(&self) -> Option<PersonId> {
        self.person.lock().clone()
    }

    pub fn submitted_task(&self) -> Option<TaskId> {
        self.task.lock().clone()
    }
}

#[async_trait]
impl ComputeApi for FakeComputeApi {
    async fn create_person(&self, _profile: &PersonProfile) -> Result<PersonId, ApiError> {
        self.create_person_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.create_error.lock().take() {
            return Err(err);
        }
        let person = PersonId::new();
        *self.person.lock() = Some(person.clone());
        Ok(person)
    }

    async fn update_person(
        &self,
        _person: &PersonId,
        _profile: &PersonProfile,
        _captures: CaptureUpload<'_>,
    ) -> Result<(), ApiError> {
        self.update_person_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn upload_and_calculate(
        &self,
        _person: &PersonId,
        _profile: &PersonProfile,
        _captures: CaptureUpload<'_>,
    ) -> Result<TaskId, ApiError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.upload_error.lock().take() {
            return Err(err);
        }
        let task = TaskId::new();
        *self.task.lock() = Some(task.clone());
        Ok(task)
    }

    async fn calculate(&self, _person: &PersonId) -> Result<TaskId, ApiError> {
        self.calculate_calls.fetch_add(1, Ordering::SeqCst);
        let task = TaskId::new();
        *self.task.lock() = Some(task.clone());
        Ok(task)
    }

    async fn poll_result(&self, _task: &TaskId, _person: &PersonId) -> Result<JobPoll, ApiError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.polls.lock().pop_front().unwrap_or(JobPoll::Pending))
    }
}

/// A plausible successful job result for tests.
#[allow(clippy::unwrap_used)]
pub fn sample_job_result(legs_distance: f64, body_area_percentage: f64) -> JobResult {
    serde_json::from_value(serde_json::json!({
        "front_params": {
            "legs_distance": legs_distance,
            "body_area_percentage": body_area_percentage,
            "clothes_type": { "types": { "top": { "code": "t1" }, "bottom": { "code": "b2" } } },
            "chest": 98.2,
            "waist": 81.4
        },
        "side_params": { "chest": 97.9 },
        "volume_params": { "chest": 98.0, "body_type": "rectangle" }
    }))
    .unwrap()
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
