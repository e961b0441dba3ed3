// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The measurement job: profile creation, photo submission, result
//! polling and finalization.
//!
//! Stages are keyed on what the flow already carries: an existing
//! `personId` means the profile is refreshed instead of re-created, an
//! existing `taskId` means the run skips straight to polling. That
//! makes a reload-and-re-enter mid-run converge on the same single job
//! instead of forking a second one.
//!
//! Every network wait races against the device visibility watch: a
//! backgrounded device aborts the stage as `Interrupted`, and recovery
//! is the ordinary idempotent re-entry, not an in-place retry.

use crate::bootstrap::SessionState;
use crate::outcome::{classify_api_error, EngineError, SessionFailure};
use crate::visibility::VisibilityState;
use ff_client::{ApiError, CaptureUpload, ComputeApi, FlowResource, JobPoll};
use ff_core::capture::{CaptureFlowType, CaptureSet, PhotoSlot};
use ff_core::flow::{FlowPatch, FlowStatus};
use ff_core::id::{PersonId, TaskId};
use ff_core::measurement::{JobResult, Measurements};
use ff_core::validation::{hard_validation, soft_validation, HardValidation, SoftValidation};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Stage labels mirrored to the flow so the other device can narrate
/// progress. Wire strings from the flow API.
pub const PROCESS_INITIATING_PROFILE: &str = "Initiating Profile Creation";
pub const PROCESS_PROFILE_CREATED: &str = "Profile Creation Completed!";
pub const PROCESS_UPLOADING: &str = "Photo Uploading";
pub const PROCESS_UPLOADED: &str = "Photo Upload Completed!";
pub const PROCESS_CALCULATING: &str = "Calculating your Measurements";
pub const PROCESS_SENDING_RESULTS: &str = "Sending Your Results";

/// Pacing and polling knobs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Pause between narrated sub-steps so the spectating device can
    /// follow the stage labels.
    pub pace: Duration,
    pub poll_interval: Duration,
    /// Result polls before the run gives up with a recoverable timeout.
    pub max_poll_attempts: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pace: Duration::from_secs(1),
            poll_interval: Duration::from_secs(4),
            max_poll_attempts: 45,
        }
    }
}

/// Per-run state the stages share explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunContext {
    /// Set when a stage was aborted because the device left the
    /// foreground; the host reloads instead of resuming in place.
    pub phone_locked: bool,
}

/// Terminal outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Results written to the flow; the session is finished.
    Finished { measurements: Measurements, soft: SoftValidation },
    /// The job rejected one or both photos; the cleared slots must be
    /// recaptured and the pipeline run again.
    Retake(HardValidation),
    Failed(SessionFailure),
}

/// Runs the compute job against the shared flow.
pub struct MeasurementJobPipeline {
    flow: Arc<dyn FlowResource>,
    compute: Arc<dyn ComputeApi>,
    config: PipelineConfig,
}

impl MeasurementJobPipeline {
    pub fn new(
        flow: Arc<dyn FlowResource>,
        compute: Arc<dyn ComputeApi>,
        config: PipelineConfig,
    ) -> Self {
        Self { flow, compute, config }
    }

    /// Run the job to a terminal outcome. `state` is updated in place
    /// as identifiers are acquired so a later run resumes instead of
    /// repeating work.
    pub async fn run(
        &self,
        state: &mut SessionState,
        captures: &mut CaptureSet,
        flow_type: CaptureFlowType,
        visibility: &mut VisibilityState,
        ctx: &mut RunContext,
    ) -> PipelineOutcome {
        match self.run_inner(state, captures, flow_type, visibility, ctx).await {
            Ok((measurements, soft)) => PipelineOutcome::Finished { measurements, soft },
            Err(SessionFailure::HardValidation(hard)) => {
                self.apply_retake(state, captures, &hard).await;
                PipelineOutcome::Retake(hard)
            }
            Err(failure) => {
                tracing::warn!(failure = %failure, "pipeline run did not finish");
                PipelineOutcome::Failed(failure)
            }
        }
    }

    async fn run_inner(
        &self,
        state: &mut SessionState,
        captures: &CaptureSet,
        flow_type: CaptureFlowType,
        visibility: &mut VisibilityState,
        ctx: &mut RunContext,
    ) -> Result<(Measurements, SoftValidation), SessionFailure> {
        let profile = state
            .profile()
            .ok_or(EngineError::MissingField("gender/height"))?;
        let (front, side) = captures
            .pair()
            .ok_or(EngineError::MissingField("capture pair"))?;

        if state.status != FlowStatus::SetMetadata {
            FlowStatus::validate_transition(state.status, FlowStatus::SetMetadata)
                .map_err(EngineError::Transition)?;
            self.commit(FlowPatch::default().status(FlowStatus::SetMetadata)).await?;
            state.status = FlowStatus::SetMetadata;
        }

        // Empty-string identifiers are the wire form of "cleared".
        let existing_person = state.person_id.clone().filter(|id| !id.is_empty());
        let existing_task = state.task_id.clone().filter(|id| !id.is_empty());
        let resumed_person = existing_person.is_some();

        let person = match existing_person {
            Some(person) => person,
            None => {
                self.narrate(PROCESS_INITIATING_PROFILE).await?;
                let person = self
                    .guarded(visibility, ctx, self.compute.create_person(&profile))
                    .await?;
                self.commit(FlowPatch::default().person_id(person.clone())).await?;
                state.person_id = Some(person.clone());
                tracing::info!(person = %person, "profile created");
                self.narrate(PROCESS_PROFILE_CREATED).await?;
                self.pace(visibility, ctx).await?;
                person
            }
        };

        let task = match existing_task {
            Some(task) => {
                self.narrate(PROCESS_CALCULATING).await?;
                task
            }
            None => {
                self.narrate(PROCESS_UPLOADING).await?;
                let upload = CaptureUpload { front, side, flow_type };
                let task = if resumed_person {
                    self.guarded(
                        visibility,
                        ctx,
                        self.compute.update_person(&person, &profile, upload),
                    )
                    .await?;
                    self.guarded(visibility, ctx, self.compute.calculate(&person)).await?
                } else {
                    self.guarded(
                        visibility,
                        ctx,
                        self.compute.upload_and_calculate(&person, &profile, upload),
                    )
                    .await?
                };
                self.commit(FlowPatch::default().task_id(task.clone())).await?;
                state.task_id = Some(task.clone());
                tracing::info!(task = %task, "measurement job submitted");
                self.narrate(PROCESS_UPLOADED).await?;
                self.pace(visibility, ctx).await?;
                self.narrate(PROCESS_CALCULATING).await?;
                task
            }
        };

        let result = self.await_result(&task, &person, visibility, ctx).await?;
        self.finalize(state, &result).await
    }

    async fn await_result(
        &self,
        task: &TaskId,
        person: &PersonId,
        visibility: &mut VisibilityState,
        ctx: &mut RunContext,
    ) -> Result<JobResult, SessionFailure> {
        for _ in 0..self.config.max_poll_attempts {
            self.guarded_sleep(visibility, ctx, self.config.poll_interval).await?;
            match self
                .guarded(visibility, ctx, self.compute.poll_result(task, person))
                .await?
            {
                JobPoll::Pending => continue,
                JobPoll::Ready(result) => return Ok(*result),
                JobPoll::Failed(sub_tasks) => {
                    return Err(SessionFailure::HardValidation(hard_validation(&sub_tasks)))
                }
            }
        }
        tracing::warn!(task = %task, "result polling exhausted its attempt budget");
        Err(SessionFailure::Timeout)
    }

    /// Single merge write carrying everything the other device needs:
    /// results, advisory flags, a cleared defect record, the final
    /// stage label and the terminal status.
    async fn finalize(
        &self,
        state: &mut SessionState,
        result: &JobResult,
    ) -> Result<(Measurements, SoftValidation), SessionFailure> {
        FlowStatus::validate_transition(state.status, FlowStatus::Finished)
            .map_err(EngineError::Transition)?;

        let soft = soft_validation(result);
        let measurements = result.to_measurements(&state.settings);
        self.commit(
            FlowPatch::default()
                .status(FlowStatus::Finished)
                .process_status(PROCESS_SENDING_RESULTS)
                .measurements(measurements.clone())
                .soft_validation(soft)
                .hard_validation(HardValidation::default()),
        )
        .await?;

        state.status = FlowStatus::Finished;
        state.measurements = Some(measurements.clone());
        state.soft_validation = Some(soft);
        state.hard_validation = None;
        tracing::info!(flow = %state.flow_id, "session finished");
        Ok((measurements, soft))
    }

    /// Publish the defect verdict and drop only the offending photos.
    /// The status stays where it is; the capture journey continues from
    /// the retake screen.
    async fn apply_retake(
        &self,
        state: &mut SessionState,
        captures: &mut CaptureSet,
        hard: &HardValidation,
    ) {
        let (clear_front, clear_side) = hard.slots_to_clear();
        if clear_front {
            captures.clear(PhotoSlot::Front);
        }
        if clear_side {
            captures.clear(PhotoSlot::Side);
        }
        state.task_id = None;
        state.hard_validation = Some(hard.clone());
        tracing::info!(front = clear_front, side = clear_side, "photo retake required");

        let patch = FlowPatch::default()
            .hard_validation(hard.clone())
            .task_id(TaskId::from_string(""))
            .process_status("");
        self.flow.update_local(patch.clone());
        if let Err(err) = self.flow.update(patch).await {
            tracing::warn!(error = %err, "failed to publish retake verdict");
        }
    }

    /// Advisory stage label: mirrored locally at once, pushed remotely
    /// best-effort. Only deactivation ends the run here.
    async fn narrate(&self, label: &str) -> Result<(), SessionFailure> {
        let patch = FlowPatch::default().process_status(label);
        self.flow.update_local(patch.clone());
        match self.flow.update(patch).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_widget_deactivated() => Err(SessionFailure::Deactivated),
            Err(err) => {
                tracing::warn!(error = %err, label, "stage narration write failed");
                Ok(())
            }
        }
    }

    /// Write of record; failure classifies and ends the run.
    async fn commit(&self, patch: FlowPatch) -> Result<(), SessionFailure> {
        self.flow.update(patch).await.map_err(classify_api_error)?;
        Ok(())
    }

    /// Race a request against the device leaving the foreground.
    async fn guarded<T>(
        &self,
        visibility: &mut VisibilityState,
        ctx: &mut RunContext,
        request: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, SessionFailure> {
        tokio::select! {
            _ = visibility.backgrounded() => {
                ctx.phone_locked = true;
                tracing::info!("device backgrounded, aborting pipeline stage");
                Err(SessionFailure::Interrupted)
            }
            result = request => result.map_err(classify_api_error),
        }
    }

    async fn guarded_sleep(
        &self,
        visibility: &mut VisibilityState,
        ctx: &mut RunContext,
        duration: Duration,
    ) -> Result<(), SessionFailure> {
        tokio::select! {
            _ = visibility.backgrounded() => {
                ctx.phone_locked = true;
                tracing::info!("device backgrounded, aborting pipeline stage");
                Err(SessionFailure::Interrupted)
            }
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    async fn pace(
        &self,
        visibility: &mut VisibilityState,
        ctx: &mut RunContext,
    ) -> Result<(), SessionFailure> {
        self.guarded_sleep(visibility, ctx, self.config.pace).await
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
