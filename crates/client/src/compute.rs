// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compute pipeline client: person profiles, photo submission and
//! measurement-job polling.

use crate::error::ApiError;
use crate::flow::{decode, read_error};
use async_trait::async_trait;
use ff_core::capture::{CaptureArtifact, CaptureFlowType, DeviceCoordinates};
use ff_core::id::{PersonId, TaskId};
use ff_core::measurement::{JobResult, SubTaskFailure};
use ff_core::settings::Gender;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Demographic inputs for the person profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonProfile {
    pub gender: Gender,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The two capture artifacts plus their capture mode, borrowed from
/// the pipeline for the duration of one submission.
#[derive(Debug, Clone, Copy)]
pub struct CaptureUpload<'a> {
    pub front: &'a CaptureArtifact,
    pub side: &'a CaptureArtifact,
    pub flow_type: CaptureFlowType,
}

/// One poll of the measurement job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobPoll {
    Pending,
    Ready(Box<JobResult>),
    Failed(Vec<SubTaskFailure>),
}

/// Submission/polling interface to the measurement compute service.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Create a person profile; its ID is the idempotency anchor for
    /// pipeline resume and must never be recreated for the same flow.
    async fn create_person(&self, profile: &PersonProfile) -> Result<PersonId, ApiError>;

    /// Refresh profile fields and photos on an existing person
    /// (resume path after a device reload).
    async fn update_person(
        &self,
        person: &PersonId,
        profile: &PersonProfile,
        captures: CaptureUpload<'_>,
    ) -> Result<(), ApiError>;

    /// Upload both photos and submit the measurement job in one call.
    async fn upload_and_calculate(
        &self,
        person: &PersonId,
        profile: &PersonProfile,
        captures: CaptureUpload<'_>,
    ) -> Result<TaskId, ApiError>;

    /// Submit a measurement job for already-uploaded photos.
    async fn calculate(&self, person: &PersonId) -> Result<TaskId, ApiError>;

    /// Poll the job result once.
    async fn poll_result(&self, task: &TaskId, person: &PersonId) -> Result<JobPoll, ApiError>;
}

/// HTTP implementation of [`ComputeApi`].
pub struct ComputeClient {
    http: reqwest::Client,
    base_url: String,
    widget_key: String,
}

/// Metadata part accompanying a multipart photo upload.
#[derive(Serialize)]
struct UploadData<'a> {
    #[serde(flatten)]
    profile: &'a PersonProfile,
    photo_flow_type: CaptureFlowType,
    device_coordinates: CoordinatesPair,
}

#[derive(Serialize)]
struct CoordinatesPair {
    front: DeviceCoordinates,
    side: DeviceCoordinates,
}

#[derive(Deserialize)]
struct PersonCreated {
    id: Value,
}

#[derive(Deserialize)]
struct TaskCreated {
    task_set_id: Value,
}

/// Job poll wire shape.
#[derive(Deserialize)]
struct TaskStatus {
    status: String,
    #[serde(default)]
    result: Option<JobResult>,
    #[serde(default)]
    sub_tasks: Vec<SubTaskFailure>,
}

impl ComputeClient {
    pub fn new(base_url: impl Into<String>, widget_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            widget_key: widget_key.into(),
        }
    }

    fn auth_header(&self) -> String {
        format!("UUID {}", self.widget_key)
    }

    fn upload_form(
        profile: &PersonProfile,
        captures: CaptureUpload<'_>,
    ) -> Result<Form, ApiError> {
        let data = UploadData {
            profile,
            photo_flow_type: captures.flow_type,
            device_coordinates: CoordinatesPair {
                front: captures.front.coordinates,
                side: captures.side.coordinates,
            },
        };
        let data = serde_json::to_string(&data).map_err(|e| ApiError::Decode(e.to_string()))?;

        let image_part = |artifact: &CaptureArtifact, name: &str| {
            Part::bytes(artifact.image.clone())
                .file_name(format!("{name}.jpg"))
                .mime_str("image/jpeg")
                .map_err(ApiError::from)
        };

        Ok(Form::new()
            .part("front_image", image_part(captures.front, "front")?)
            .part("side_image", image_part(captures.side, "side")?)
            .text("data", data))
    }
}

#[async_trait]
impl ComputeApi for ComputeClient {
    async fn create_person(&self, profile: &PersonProfile) -> Result<PersonId, ApiError> {
        let resp = self
            .http
            .post(format!("{}/persons", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(profile)
            .send()
            .await?;
        let created: PersonCreated = decode(resp).await?;
        Ok(PersonId::from_string(stringify_id(&created.id)))
    }

    async fn update_person(
        &self,
        person: &PersonId,
        profile: &PersonProfile,
        captures: CaptureUpload<'_>,
    ) -> Result<(), ApiError> {
        let resp = self
            .http
            .put(format!("{}/persons/{}", self.base_url, person))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .multipart(Self::upload_form(profile, captures)?)
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(read_error(resp).await)
        }
    }

    async fn upload_and_calculate(
        &self,
        person: &PersonId,
        profile: &PersonProfile,
        captures: CaptureUpload<'_>,
    ) -> Result<TaskId, ApiError> {
        let resp = self
            .http
            .put(format!("{}/persons/{}?calculate=true", self.base_url, person))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .multipart(Self::upload_form(profile, captures)?)
            .send()
            .await?;
        let created: TaskCreated = decode(resp).await?;
        Ok(TaskId::from_string(stringify_id(&created.task_set_id)))
    }

    async fn calculate(&self, person: &PersonId) -> Result<TaskId, ApiError> {
        let resp = self
            .http
            .post(format!("{}/persons/{}/calculate", self.base_url, person))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        let created: TaskCreated = decode(resp).await?;
        Ok(TaskId::from_string(stringify_id(&created.task_set_id)))
    }

    async fn poll_result(&self, task: &TaskId, person: &PersonId) -> Result<JobPoll, ApiError> {
        let resp = self
            .http
            .get(format!("{}/queue/{}?person={}", self.base_url, task, person))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        let status: TaskStatus = decode(resp).await?;
        match status.status.as_str() {
            "success" => match status.result {
                Some(result) => Ok(JobPoll::Ready(Box::new(result))),
                None => Err(ApiError::Decode("successful job carried no result".into())),
            },
            "failure" => Ok(JobPoll::Failed(status.sub_tasks)),
            _ => Ok(JobPoll::Pending),
        }
    }
}

/// Identifiers arrive as strings or numbers depending on the service.
fn stringify_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "compute_tests.rs"]
mod tests;
