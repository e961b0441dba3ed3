// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop creates the session, mobile claims it, the pipeline runs to
//! completion and the desktop observes the results.

use crate::prelude::*;
use ff_engine::InitialInputs;

#[tokio::test]
async fn full_session_desktop_to_mobile_and_back() {
    let clock = FakeClock::new();
    let flow = Arc::new(FakeFlowResource::new());
    let compute = Arc::new(FakeComputeApi::new());
    compute.script_polls([
        JobPoll::Pending,
        JobPoll::Ready(Box::new(sample_job_result(5.0, 0.8))),
    ]);

    // Desktop: create the flow and start watching it.
    let desktop = SessionBootstrap::new(flow.clone());
    let created = desktop
        .create_session(InitialInputs {
            brand: Some("acme".into()),
            return_url: Some("https://shop.example/checkout".into()),
            ..InitialInputs::default()
        })
        .await
        .unwrap();
    assert_eq!(created.status, FlowStatus::Created);

    let (tx, mut events) = mpsc::channel(16);
    let watcher = FlowSynchronizer::new(flow.clone(), clock.clone(), fast_sync()).spawn(tx);

    // Mobile: open the handoff URL, claim, keep the heartbeat going.
    let controller = MobileSessionController::new(flow.clone(), clock.clone())
        .with_heartbeat(fast_heartbeat());
    let mut state = match controller.enter(true).await.unwrap() {
        MobileEntry::Claimed(state) => state,
        other => panic!("expected claim, got {other:?}"),
    };
    assert_eq!(state.brand.as_deref(), Some("acme"));
    let heartbeat = controller.start_heartbeat();

    assert_eq!(next_event(&mut events).await, SyncEvent::MobileActive);

    // Mobile: demographics, photos, job.
    with_demographics(&mut state);
    let mut captures = full_captures();
    let pipeline = MeasurementJobPipeline::new(flow.clone(), compute.clone(), fast_pipeline());
    let (_signal, mut visibility) = visibility_channel();
    let mut ctx = RunContext::default();
    let outcome = pipeline
        .run(&mut state, &mut captures, CaptureFlowType::Friend, &mut visibility, &mut ctx)
        .await;

    let (measurements, soft) = match outcome {
        PipelineOutcome::Finished { measurements, soft } => (measurements, soft),
        other => panic!("expected finished, got {other:?}"),
    };
    assert!(!measurements.is_empty());
    assert!(!soft.any());
    heartbeat.shutdown().await;

    // Desktop: the watcher delivers the final state and stops.
    loop {
        match next_event(&mut events).await {
            SyncEvent::Finished(final_state) => {
                assert_eq!(final_state.status, FlowStatus::Finished);
                assert_eq!(final_state.measurements, Some(measurements));
                assert_eq!(final_state.soft_validation, Some(soft));
                assert!(final_state
                    .hard_validation
                    .as_ref()
                    .is_none_or(|h| h.is_empty()));
                break;
            }
            SyncEvent::MobileActive | SyncEvent::Disconnected => continue,
            other => panic!("unexpected event {other:?}"),
        }
    }
    watcher.shutdown().await;
    assert!(events.recv().await.is_none());

    // Exactly one person and one job for the whole session.
    use std::sync::atomic::Ordering;
    assert_eq!(compute.create_person_calls.load(Ordering::SeqCst), 1);
    assert_eq!(compute.upload_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reentry_after_finish_shows_results_without_mutation() {
    let flow = Arc::new(FakeFlowResource::new());
    let compute = Arc::new(FakeComputeApi::new());
    compute.script_polls([JobPoll::Ready(Box::new(sample_job_result(5.0, 0.8)))]);

    let clock = FakeClock::new();
    let controller = MobileSessionController::new(flow.clone(), clock).with_heartbeat(fast_heartbeat());
    let mut state = match controller.enter(true).await.unwrap() {
        MobileEntry::Claimed(state) => state,
        other => panic!("expected claim, got {other:?}"),
    };
    with_demographics(&mut state);

    let pipeline = MeasurementJobPipeline::new(flow.clone(), compute, fast_pipeline());
    let (_signal, mut visibility) = visibility_channel();
    let outcome = pipeline
        .run(
            &mut state,
            &mut full_captures(),
            CaptureFlowType::Hand,
            &mut visibility,
            &mut RunContext::default(),
        )
        .await;
    assert!(matches!(outcome, PipelineOutcome::Finished { .. }));

    // Re-entry on either device renders results without mutating.
    let updates_before = flow.patches().len();
    let resumed = SessionBootstrap::new(flow.clone()).resume_session().await.unwrap();
    assert!(resumed.has_results());
    assert_eq!(flow.patches().len(), updates_before);
}
