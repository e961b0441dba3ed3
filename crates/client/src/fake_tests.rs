// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ff_core::flow::FlowStatus;

#[tokio::test]
async fn update_merges_without_clearing_unnamed_fields() {
    let flow = FakeFlowResource::with_state(|state| {
        state.height = Some(178.0);
        state.email = Some("user@example.com".into());
    });

    flow.update(FlowPatch::default().status(FlowStatus::OpenedOnMobile).process_status(""))
        .await
        .unwrap();

    let state = flow.state();
    assert_eq!(state.status, FlowStatus::OpenedOnMobile);
    assert_eq!(state.process_status.as_deref(), Some(""));
    assert_eq!(state.height, Some(178.0));
    assert_eq!(state.email.as_deref(), Some("user@example.com"));
}

#[tokio::test]
async fn update_local_does_not_count_as_a_remote_write() {
    let flow = FakeFlowResource::new();
    flow.update_local(FlowPatch::default().process_status("Photo Uploading"));

    assert!(flow.patches().is_empty());
    assert_eq!(flow.state().process_status.as_deref(), Some("Photo Uploading"));
}

#[tokio::test]
async fn deactivated_widget_rejects_every_call() {
    let flow = FakeFlowResource::new();
    flow.set_deactivated(true);

    let err = flow.get().await.unwrap_err();
    assert!(err.is_widget_deactivated());
    let err = flow.update(FlowPatch::default().last_active_date(1)).await.unwrap_err();
    assert!(err.is_widget_deactivated());
}

#[tokio::test]
async fn scripted_get_errors_pop_in_order() {
    let flow = FakeFlowResource::new();
    flow.push_get_error(ApiError::Network("reset".into()));

    assert!(flow.get().await.is_err());
    assert!(flow.get().await.is_ok());
}

#[tokio::test]
async fn compute_fake_counts_invocations_and_drains_polls() {
    let compute = FakeComputeApi::new();
    compute.script_polls([
        JobPoll::Pending,
        JobPoll::Ready(Box::new(sample_job_result(5.0, 0.8))),
    ]);

    let profile = PersonProfile {
        gender: ff_core::settings::Gender::Female,
        height: 171.0,
        weight: None,
        email: None,
    };
    let person = compute.create_person(&profile).await.unwrap();
    let task = compute.calculate(&person).await.unwrap();

    assert_eq!(compute.poll_result(&task, &person).await.unwrap(), JobPoll::Pending);
    assert!(matches!(compute.poll_result(&task, &person).await.unwrap(), JobPoll::Ready(_)));
    // drained scripts fall back to Pending
    assert_eq!(compute.poll_result(&task, &person).await.unwrap(), JobPoll::Pending);

    assert_eq!(compute.create_person_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(compute.calculate_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}
