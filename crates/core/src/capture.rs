// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capture artifacts local to the claiming device.
//!
//! Image blobs and shutter-time orientation never cross the device
//! boundary as flow state; they are owned by the pipeline run and
//! discarded after a terminal outcome. Only derived results are shared.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Photo slot of the two-shot capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhotoSlot {
    Front,
    Side,
}

crate::simple_display! {
    PhotoSlot {
        Front => "front",
        Side => "side",
    }
}

/// Capture mode: assisted (a second person takes the photos) or
/// unassisted (device propped up, timer capture).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFlowType {
    Friend,
    Hand,
}

crate::simple_display! {
    CaptureFlowType {
        Friend => "friend",
        Hand => "hand",
    }
}

/// Device orientation at shutter time, as reported by the capture UI.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCoordinates {
    pub beta_x: f64,
    pub gamma_y: f64,
}

/// One captured photo plus its orientation coordinates.
#[derive(Clone, PartialEq)]
pub struct CaptureArtifact {
    pub image: Vec<u8>,
    pub coordinates: DeviceCoordinates,
}

impl CaptureArtifact {
    pub fn new(image: Vec<u8>, coordinates: DeviceCoordinates) -> Self {
        Self { image, coordinates }
    }
}

impl fmt::Debug for CaptureArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureArtifact")
            .field("image_bytes", &self.image.len())
            .field("coordinates", &self.coordinates)
            .finish()
    }
}

/// The pair of capture slots the pipeline needs before it can submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureSet {
    front: Option<CaptureArtifact>,
    side: Option<CaptureArtifact>,
}

impl CaptureSet {
    pub fn set(&mut self, slot: PhotoSlot, artifact: CaptureArtifact) {
        match slot {
            PhotoSlot::Front => self.front = Some(artifact),
            PhotoSlot::Side => self.side = Some(artifact),
        }
    }

    pub fn get(&self, slot: PhotoSlot) -> Option<&CaptureArtifact> {
        match slot {
            PhotoSlot::Front => self.front.as_ref(),
            PhotoSlot::Side => self.side.as_ref(),
        }
    }

    /// Both photos present; the pipeline may start.
    pub fn is_complete(&self) -> bool {
        self.front.is_some() && self.side.is_some()
    }

    /// Borrow both artifacts, or `None` until the set is complete.
    pub fn pair(&self) -> Option<(&CaptureArtifact, &CaptureArtifact)> {
        match (&self.front, &self.side) {
            (Some(front), Some(side)) => Some((front, side)),
            _ => None,
        }
    }

    /// Drop one slot so only the defective photo is retaken.
    pub fn clear(&mut self, slot: PhotoSlot) {
        match slot {
            PhotoSlot::Front => self.front = None,
            PhotoSlot::Side => self.side = None,
        }
    }

    pub fn clear_all(&mut self) {
        self.front = None;
        self.side = None;
    }
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
