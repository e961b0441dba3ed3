// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device visibility signalling.
//!
//! The mobile host reports foreground/background transitions through a
//! [`VisibilitySignal`]; long-running pipeline stages watch the paired
//! [`VisibilityState`] and abort the in-flight request the moment the
//! device locks or the page is hidden.

use tokio::sync::watch;

/// Create a paired signal/state. The session starts in the foreground.
pub fn visibility_channel() -> (VisibilitySignal, VisibilityState) {
    let (tx, rx) = watch::channel(true);
    (VisibilitySignal { tx }, VisibilityState { rx })
}

/// Producer half, held by the platform host.
#[derive(Debug)]
pub struct VisibilitySignal {
    tx: watch::Sender<bool>,
}

impl VisibilitySignal {
    pub fn set_foreground(&self) {
        let _ = self.tx.send(true);
    }

    pub fn set_background(&self) {
        let _ = self.tx.send(false);
    }
}

/// Consumer half, cloned into every task that must notice a lock.
#[derive(Debug, Clone)]
pub struct VisibilityState {
    rx: watch::Receiver<bool>,
}

impl VisibilityState {
    pub fn is_foreground(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve when the device leaves the foreground. If the signal half
    /// is gone while still foregrounded, the device can never background
    /// again, so the future pends forever instead of resolving.
    pub async fn backgrounded(&mut self) {
        if self.rx.wait_for(|foreground| !*foreground).await.is_err() && self.is_foreground() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
