// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by both remote clients.

use ff_core::measurement::SubTaskFailure;
use thiserror::Error;

/// Error detail the flow service returns when the widget key has been
/// deactivated. A 401 carrying this body is fatal for the session.
pub const WIDGET_INACTIVE_DETAIL: &str = "Widget is inactive.";

/// Errors from flow and compute API operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("unauthorized{}", detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Unauthorized { detail: Option<String> },
    #[error("resource not found")]
    NotFound,
    /// 429 from SMS-adjacent sibling services, carrying a retry-after
    /// header.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    /// Synchronous rejection of submitted photos, with the per-slot
    /// failure list.
    #[error("job rejected with {} failed sub-task(s)", .0.len())]
    Validation(Vec<SubTaskFailure>),
    #[error("http {status}{}", detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Http { status: u16, detail: Option<String> },
    #[error("network error: {0}")]
    Network(String),
    #[error("response decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// A 401 whose body names widget deactivation — fatal for the
    /// session, no further flow mutation allowed.
    pub fn is_widget_deactivated(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthorized { detail: Some(d) } if d == WIDGET_INACTIVE_DETAIL
        )
    }

    /// Worth retrying: connectivity trouble, throttling or a server
    /// fault. Everything else is a caller or session problem.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::RateLimited { .. } => true,
            ApiError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
