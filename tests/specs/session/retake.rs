// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery journeys: rejected photos and interrupted runs, both
//! converging on a single finished job.

use crate::prelude::*;
use ff_core::measurement::SubTaskFailure;
use std::sync::atomic::Ordering;

async fn claimed_state(flow: &Arc<FakeFlowResource>) -> SessionState {
    let controller = MobileSessionController::new(flow.clone(), FakeClock::new())
        .with_heartbeat(fast_heartbeat());
    match controller.enter(true).await.unwrap() {
        MobileEntry::Claimed(mut state) => {
            with_demographics(&mut state);
            state
        }
        other => panic!("expected claim, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_front_photo_is_retaken_and_the_session_finishes() {
    let flow = Arc::new(FakeFlowResource::new());
    let compute = Arc::new(FakeComputeApi::new());
    compute.script_polls([JobPoll::Failed(vec![SubTaskFailure::new(
        "front_pose_detection",
        Some("Arms not visible"),
    )])]);

    let mut state = claimed_state(&flow).await;
    let mut captures = full_captures();
    let pipeline = MeasurementJobPipeline::new(flow.clone(), compute.clone(), fast_pipeline());
    let (_signal, mut visibility) = visibility_channel();
    let mut ctx = RunContext::default();

    let outcome = pipeline
        .run(&mut state, &mut captures, CaptureFlowType::Friend, &mut visibility, &mut ctx)
        .await;
    match outcome {
        PipelineOutcome::Retake(hard) => {
            assert_eq!(hard.front.as_deref(), Some("Arms not visible"));
            assert!(hard.side.is_none());
        }
        other => panic!("expected retake, got {other:?}"),
    }

    // Only the rejected slot is gone; the defect is on the flow for the
    // desktop to render.
    assert!(captures.get(PhotoSlot::Front).is_none());
    assert!(captures.get(PhotoSlot::Side).is_some());
    assert!(flow.state().hard_validation.is_some());
    assert_eq!(flow.state().status, FlowStatus::SetMetadata);

    // Retake the front photo and run again.
    captures.set(PhotoSlot::Front, artifact());
    compute.script_polls([JobPoll::Ready(Box::new(sample_job_result(5.0, 0.8)))]);
    let outcome = pipeline
        .run(&mut state, &mut captures, CaptureFlowType::Friend, &mut visibility, &mut ctx)
        .await;
    assert!(matches!(outcome, PipelineOutcome::Finished { .. }));
    assert_eq!(flow.state().status, FlowStatus::Finished);
    assert_eq!(flow.state().hard_validation.as_ref().map(|h| h.is_empty()), Some(true));

    // The person was created once; the rerun refreshed it instead.
    assert_eq!(compute.create_person_calls.load(Ordering::SeqCst), 1);
    assert_eq!(compute.update_person_calls.load(Ordering::SeqCst), 1);
    assert_eq!(compute.calculate_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn locked_device_resumes_without_forking_a_second_job() {
    let flow = Arc::new(FakeFlowResource::new());
    let compute = Arc::new(FakeComputeApi::new());

    let mut state = claimed_state(&flow).await;
    let mut captures = full_captures();
    let pipeline = MeasurementJobPipeline::new(flow.clone(), compute.clone(), fast_pipeline());

    // Lock the device once the job is submitted, while polling.
    let (signal, mut visibility) = visibility_channel();
    let submitted = flow.clone();
    let lock = tokio::spawn(async move {
        while submitted.state().task_id.is_none() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        signal.set_background();
    });
    let mut ctx = RunContext::default();
    let outcome = pipeline
        .run(&mut state, &mut captures, CaptureFlowType::Friend, &mut visibility, &mut ctx)
        .await;
    lock.await.unwrap();
    assert_eq!(outcome, PipelineOutcome::Failed(ff_engine::SessionFailure::Interrupted));
    assert!(ctx.phone_locked);

    // Unlock: the host reloads and re-enters; the flow still carries
    // the person and task, so the rerun only polls.
    compute.script_polls([JobPoll::Ready(Box::new(sample_job_result(5.0, 0.8)))]);
    let mut resumed = claimed_state(&flow).await;
    assert!(resumed.person_id.is_some());
    assert!(resumed.task_id.as_ref().is_some_and(|t| !t.is_empty()));

    let (_signal, mut visibility) = visibility_channel();
    let outcome = pipeline
        .run(&mut resumed, &mut captures, CaptureFlowType::Friend, &mut visibility, &mut ctx)
        .await;
    assert!(matches!(outcome, PipelineOutcome::Finished { .. }));

    assert_eq!(compute.create_person_calls.load(Ordering::SeqCst), 1);
    assert_eq!(compute.upload_calls.load(Ordering::SeqCst), 1);
    assert_eq!(compute.update_person_calls.load(Ordering::SeqCst), 0);
}
