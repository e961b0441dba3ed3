// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn artifact(byte: u8) -> CaptureArtifact {
    CaptureArtifact::new(vec![byte; 16], DeviceCoordinates { beta_x: 1.5, gamma_y: -0.25 })
}

#[test]
fn set_is_complete_only_with_both_slots() {
    let mut captures = CaptureSet::default();
    assert!(!captures.is_complete());
    assert!(captures.pair().is_none());

    captures.set(PhotoSlot::Front, artifact(1));
    assert!(!captures.is_complete());

    captures.set(PhotoSlot::Side, artifact(2));
    assert!(captures.is_complete());
    let (front, side) = captures.pair().unwrap();
    assert_eq!(front.image[0], 1);
    assert_eq!(side.image[0], 2);
}

#[test]
fn clearing_one_slot_retains_the_other() {
    let mut captures = CaptureSet::default();
    captures.set(PhotoSlot::Front, artifact(1));
    captures.set(PhotoSlot::Side, artifact(2));

    captures.clear(PhotoSlot::Front);
    assert!(captures.get(PhotoSlot::Front).is_none());
    assert!(captures.get(PhotoSlot::Side).is_some());

    captures.clear_all();
    assert!(captures.get(PhotoSlot::Side).is_none());
}

#[test]
fn debug_does_not_dump_image_bytes() {
    let rendered = format!("{:?}", artifact(7));
    assert!(rendered.contains("image_bytes: 16"));
    assert!(!rendered.contains("[7"));
}
