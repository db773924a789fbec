// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cancellable one-shot timer for typed queries.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs the most recently scheduled action once `delay` has passed without a
/// newer schedule. Scheduling aborts the pending task first.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace any pending action with `action`, run after the quiet period.
    pub fn schedule<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        tracing::trace!(delay_ms = delay.as_millis() as u64, "debounce scheduled");
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
