// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier types for the flow and the downstream compute resources.

crate::define_id! {
    /// Identifier of one logical measurement session (the flow document).
    ///
    /// Normally generated client-side on first entry and then carried in
    /// the handoff URL so the mobile device can claim the same flow.
    pub struct FlowId("flw-");
}

crate::define_id! {
    /// Identifier of the remote person profile created by the compute
    /// pipeline. Once set on the flow document it is never recreated —
    /// this is the idempotency anchor for pipeline resume.
    pub struct PersonId("prs-");
}

crate::define_id! {
    /// Identifier of an in-flight measurement computation job.
    /// Like [`PersonId`], authoritative once present on the flow.
    pub struct TaskId("tsk-");
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
