// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handoff and liveness: what the desktop sees while the mobile device
//! claims, heartbeats, vanishes and comes back.

use crate::prelude::*;
use ff_engine::{InitialInputs, SessionFailure};

#[tokio::test]
async fn desktop_sees_claim_then_staleness_then_recovery() {
    let clock = FakeClock::new();
    let flow = Arc::new(FakeFlowResource::new());

    let desktop = SessionBootstrap::new(flow.clone());
    desktop.create_session(InitialInputs::default()).await.unwrap();

    let (tx, mut events) = mpsc::channel(16);
    let watcher = FlowSynchronizer::new(flow.clone(), clock.clone(), fast_sync()).spawn(tx);

    // Claim stamps a heartbeat, so the desktop flips to active.
    let controller = MobileSessionController::new(flow.clone(), clock.clone())
        .with_heartbeat(fast_heartbeat());
    assert!(matches!(controller.enter(true).await.unwrap(), MobileEntry::Claimed(_)));
    assert_eq!(next_event(&mut events).await, SyncEvent::MobileActive);

    // No heartbeat task running: once the stamp ages out, the desktop
    // reports a disconnect even though the status never changed.
    clock.advance(Duration::from_millis(9_001));
    assert_eq!(next_event(&mut events).await, SyncEvent::Disconnected);
    assert_eq!(flow.state().status, FlowStatus::OpenedOnMobile);

    // The device comes back and beats again.
    let heartbeat = controller.start_heartbeat();
    wait_for_event(&mut events, &SyncEvent::MobileActive).await;

    heartbeat.shutdown().await;
    watcher.shutdown().await;
}

#[tokio::test]
async fn second_device_claim_is_last_writer_wins_not_an_error() {
    let clock = FakeClock::new();
    let flow = Arc::new(FakeFlowResource::new());

    let first = MobileSessionController::new(flow.clone(), clock.clone())
        .with_heartbeat(fast_heartbeat());
    let second = MobileSessionController::new(flow.clone(), clock.clone())
        .with_heartbeat(fast_heartbeat());

    assert!(matches!(first.enter(true).await.unwrap(), MobileEntry::Claimed(_)));
    clock.advance(Duration::from_millis(500));
    assert!(matches!(second.enter(true).await.unwrap(), MobileEntry::Claimed(_)));

    // The later stamp stands; nothing was rejected.
    assert_eq!(flow.state().status, FlowStatus::OpenedOnMobile);
    assert_eq!(flow.state().last_active_date, Some(clock.epoch_ms()));
}

#[tokio::test]
async fn close_confirm_suspends_observation_without_ending_it() {
    let clock = FakeClock::new();
    let epoch = clock.epoch_ms();
    let flow = Arc::new(FakeFlowResource::with_state(|state| {
        state.status = FlowStatus::OpenedOnMobile;
        state.last_active_date = Some(epoch);
    }));

    let (tx, mut events) = mpsc::channel(16);
    let watcher = FlowSynchronizer::new(flow.clone(), clock.clone(), fast_sync()).spawn(tx);
    assert_eq!(next_event(&mut events).await, SyncEvent::MobileActive);

    // The close dialog pushes the flow into the side-channel state;
    // the watcher goes quiet but keeps polling.
    flow.mutate_state(|state| state.status = FlowStatus::CloseConfirm);
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(events.try_recv().is_err());

    // Dialog dismissed: observation resumes where it left off.
    flow.mutate_state(|state| state.status = FlowStatus::OpenedOnMobile);
    clock.advance(Duration::from_millis(9_001));
    assert_eq!(next_event(&mut events).await, SyncEvent::Disconnected);

    watcher.shutdown().await;
}

#[tokio::test]
async fn deactivation_ends_both_sides() {
    let clock = FakeClock::new();
    let epoch = clock.epoch_ms();
    let flow = Arc::new(FakeFlowResource::with_state(|state| {
        state.status = FlowStatus::OpenedOnMobile;
        state.last_active_date = Some(epoch);
    }));

    let (tx, mut events) = mpsc::channel(16);
    let watcher = FlowSynchronizer::new(flow.clone(), clock.clone(), fast_sync()).spawn(tx);
    assert_eq!(next_event(&mut events).await, SyncEvent::MobileActive);

    flow.set_deactivated(true);
    assert_eq!(next_event(&mut events).await, SyncEvent::Deactivated);
    watcher.shutdown().await;

    let controller = MobileSessionController::new(flow.clone(), clock).with_heartbeat(fast_heartbeat());
    assert_eq!(controller.enter(true).await.unwrap_err(), SessionFailure::Deactivated);
}

#[tokio::test]
async fn unsupported_device_leaves_the_flow_for_another_claim() {
    let clock = FakeClock::new();
    let flow = Arc::new(FakeFlowResource::new());

    let unsupported = MobileSessionController::new(flow.clone(), clock.clone())
        .with_heartbeat(fast_heartbeat());
    assert_eq!(unsupported.enter(false).await.unwrap(), MobileEntry::UnsupportedDevice);
    assert_eq!(flow.state().status, FlowStatus::Created);

    let supported = MobileSessionController::new(flow.clone(), clock).with_heartbeat(fast_heartbeat());
    assert!(matches!(supported.enter(true).await.unwrap(), MobileEntry::Claimed(_)));
    assert_eq!(flow.state().status, FlowStatus::OpenedOnMobile);
}
