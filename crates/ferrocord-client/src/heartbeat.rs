//! Heartbeat scheduler
//!
//! A repeating timer tied to the session; each tick enqueues a heartbeat
//! frame carrying the sequence known at tick time. The writer channel
//! closing (socket gone) ends the task quietly, so a tick racing a close
//! is a silent no-op rather than an error.

use crate::session::SessionShared;
use ferrocord_protocol::GatewayFrame;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Owns the repeating heartbeat timer task
pub struct HeartbeatScheduler {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl HeartbeatScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Start the timer, cancelling any existing one
    ///
    /// The first tick fires one full interval after the call.
    pub fn start(
        &self,
        interval: Duration,
        shared: Arc<SessionShared>,
        writer: mpsc::UnboundedSender<GatewayFrame>,
    ) {
        self.stop();

        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);

            loop {
                ticker.tick().await;

                let sequence = shared.sequence();
                if writer.send(GatewayFrame::heartbeat(sequence)).is_err() {
                    // Writer gone means the socket closed under us.
                    break;
                }

                tracing::trace!(sequence = ?sequence, "Heartbeat sent");
            }
        });

        *self.handle.lock() = Some(task);

        tracing::debug!(interval_ms = interval.as_millis() as u64, "Heartbeat started");
    }

    /// Cancel the timer; safe to call when no timer is active
    pub fn stop(&self) {
        if let Some(task) = self.handle.lock().take() {
            task.abort();
            tracing::debug!("Heartbeat stopped");
        }
    }

    /// Whether a timer task is currently held
    pub fn is_running(&self) -> bool {
        self.handle.lock().is_some()
    }
}

impl Default for HeartbeatScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HeartbeatScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.handle.lock().take() {
            task.abort();
        }
    }
}
