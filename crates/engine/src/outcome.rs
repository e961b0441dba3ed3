// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure taxonomy.
//!
//! Every stage of the synchronizer, controller and pipeline resolves to
//! one of these classifications instead of letting an error cross its
//! stage boundary unhandled.

use ff_client::ApiError;
use ff_core::flow::TransitionError;
use ff_core::validation::{hard_validation, HardValidation};
use thiserror::Error;

/// Engine-internal error prior to classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Terminal classification of a failed operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionFailure {
    /// Connectivity trouble; the user may retry, polling loops continue.
    Transient(ApiError),
    /// Widget key deactivated: terminal for the session, no further
    /// flow mutation.
    Deactivated,
    /// Photo defects; the offending slot(s) must be retaken.
    HardValidation(HardValidation),
    /// Result polling exhausted its attempt budget; recoverable.
    Timeout,
    /// Device backgrounded mid-flight; resolved by a forced reload and
    /// idempotent resume, not reported as an error to the user.
    Interrupted,
    /// Unrecoverable on this device; restart on the other device.
    Fatal(String),
}

ff_core::simple_display! {
    SessionFailure {
        Transient(..) => "transient",
        Deactivated => "deactivated",
        HardValidation(..) => "hard-validation",
        Timeout => "timeout",
        Interrupted => "interrupted",
        Fatal(..) => "fatal",
    }
}

impl SessionFailure {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SessionFailure::Transient(_)
                | SessionFailure::HardValidation(_)
                | SessionFailure::Timeout
                | SessionFailure::Interrupted
        )
    }
}

/// Classify a remote API error into the session taxonomy.
pub fn classify_api_error(err: ApiError) -> SessionFailure {
    if err.is_widget_deactivated() {
        return SessionFailure::Deactivated;
    }
    match err {
        ApiError::Validation(sub_tasks) => {
            SessionFailure::HardValidation(hard_validation(&sub_tasks))
        }
        err if err.is_transient() => SessionFailure::Transient(err),
        err => SessionFailure::Fatal(err.to_string()),
    }
}

impl From<EngineError> for SessionFailure {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Api(api) => classify_api_error(api),
            EngineError::Transition(t) => SessionFailure::Fatal(t.to_string()),
            EngineError::MissingField(field) => {
                SessionFailure::Fatal(format!("required field missing: {field}"))
            }
        }
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
