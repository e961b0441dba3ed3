// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flow resource client.
//!
//! The server merges only the fields a `PATCH` names into the
//! document's `state`; it never clears fields the patch omits. The
//! client keeps a local cache so optimistic updates (`update_local`)
//! can reflect transient progress without a network round trip.

use crate::error::ApiError;
use async_trait::async_trait;
use ff_core::flow::{FlowDocument, FlowPatch};
use ff_core::id::FlowId;
use ff_core::settings::WidgetSettings;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Typed read/update interface to the server-held flow document.
///
/// No business logic and no internal retries; callers decide retry
/// policy per failure class.
#[async_trait]
pub trait FlowResource: Send + Sync {
    /// Create the flow document, seeding the supplied initial state.
    async fn create(&self, initial: FlowPatch) -> Result<FlowId, ApiError>;

    /// Fetch the current document.
    async fn get(&self) -> Result<FlowDocument, ApiError>;

    /// Merge the supplied fields into the remote state.
    async fn update(&self, patch: FlowPatch) -> Result<FlowDocument, ApiError>;

    /// Merge into the local cache only — no network round trip.
    fn update_local(&self, patch: FlowPatch);

    /// Last document seen (or optimistically patched) by this client.
    fn cached(&self) -> Option<FlowDocument>;

    /// Deactivate the widget key backing this flow.
    async fn deactivate(&self) -> Result<(), ApiError>;

    /// Fetch the widget configuration document.
    async fn settings(&self) -> Result<WidgetSettings, ApiError>;
}

/// HTTP implementation of [`FlowResource`].
pub struct FlowClient {
    http: reqwest::Client,
    base_url: String,
    widget_key: String,
    flow_id: Mutex<Option<FlowId>>,
    cache: Mutex<Option<FlowDocument>>,
}

/// `PATCH /flows/{id}` payload: partial state under the `state` key.
#[derive(Serialize)]
struct StateEnvelope<'a> {
    state: &'a FlowPatch,
}

impl FlowClient {
    pub fn new(base_url: impl Into<String>, widget_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            widget_key: widget_key.into(),
            flow_id: Mutex::new(None),
            cache: Mutex::new(None),
        }
    }

    /// Bind this client to an existing flow (re-entry via handoff URL).
    pub fn with_flow(base_url: impl Into<String>, widget_key: impl Into<String>, id: FlowId) -> Self {
        let client = Self::new(base_url, widget_key);
        *client.flow_id.lock() = Some(id);
        client
    }

    pub fn flow_id(&self) -> Option<FlowId> {
        self.flow_id.lock().clone()
    }

    fn auth_header(&self) -> String {
        format!("UUID {}", self.widget_key)
    }

    fn flow_url(&self) -> Result<String, ApiError> {
        let id = self.flow_id.lock().clone().ok_or(ApiError::NotFound)?;
        Ok(format!("{}/flows/{}", self.base_url, id))
    }

    fn store(&self, doc: FlowDocument) -> FlowDocument {
        *self.cache.lock() = Some(doc.clone());
        doc
    }
}

#[async_trait]
impl FlowResource for FlowClient {
    async fn create(&self, initial: FlowPatch) -> Result<FlowId, ApiError> {
        let resp = self
            .http
            .post(format!("{}/flows", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&StateEnvelope { state: &initial })
            .send()
            .await?;
        let doc: FlowDocument = decode(resp).await?;
        let id = doc.id.clone();
        *self.flow_id.lock() = Some(id.clone());
        self.store(doc);
        tracing::info!(flow = %id, "flow created");
        Ok(id)
    }

    async fn get(&self) -> Result<FlowDocument, ApiError> {
        let resp = self
            .http
            .get(self.flow_url()?)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        let doc: FlowDocument = decode(resp).await?;
        Ok(self.store(doc))
    }

    async fn update(&self, patch: FlowPatch) -> Result<FlowDocument, ApiError> {
        let resp = self
            .http
            .patch(self.flow_url()?)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&StateEnvelope { state: &patch })
            .send()
            .await?;
        let doc: FlowDocument = decode(resp).await?;
        Ok(self.store(doc))
    }

    fn update_local(&self, patch: FlowPatch) {
        if let Some(doc) = self.cache.lock().as_mut() {
            doc.state.apply(&patch);
        }
    }

    fn cached(&self) -> Option<FlowDocument> {
        self.cache.lock().clone()
    }

    async fn deactivate(&self) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(format!("{}/deactivate", self.flow_url()?))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(read_error(resp).await)
        }
    }

    async fn settings(&self) -> Result<WidgetSettings, ApiError> {
        let resp = self
            .http
            .get(format!("{}/widget-settings", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        decode(resp).await
    }
}

/// Decode a success body, or translate the failure response.
pub(crate) async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    if resp.status().is_success() {
        resp.json::<T>().await.map_err(ApiError::from)
    } else {
        Err(read_error(resp).await)
    }
}

/// Failure body shape shared by the flow and compute services.
#[derive(serde::Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    sub_tasks: Vec<ff_core::measurement::SubTaskFailure>,
}

/// Translate an unsuccessful response into the error taxonomy.
pub(crate) async fn read_error(resp: reqwest::Response) -> ApiError {
    let status = resp.status().as_u16();
    let retry_after = resp
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let body: ErrorBody = resp.json().await.unwrap_or_default();

    if !body.sub_tasks.is_empty() {
        return ApiError::Validation(body.sub_tasks);
    }
    match status {
        401 => ApiError::Unauthorized { detail: body.detail },
        404 => ApiError::NotFound,
        429 => ApiError::RateLimited { retry_after_secs: retry_after.unwrap_or(60) },
        _ => ApiError::Http { status, detail: body.detail },
    }
}
