//! Interval poller
//!
//! Fetches from an [`ObjectSource`] on a fixed interval and forwards each
//! snapshot to the session's event channel. A fetch is awaited before the
//! next tick is taken, so ticks never overlap.

use super::source::ObjectSource;
use crate::graph::SessionEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawns polling tasks
pub struct Poller;

impl Poller {
    /// Start polling; the first fetch happens immediately
    pub fn spawn(
        source: Arc<dyn ObjectSource>,
        interval: Duration,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> PollerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(
                "Polling {} every {}ms",
                source.describe(),
                interval.as_millis()
            );

            loop {
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {}
                }
                if *stop_rx.borrow() {
                    break;
                }

                let result = tokio::select! {
                    result = source.fetch() => result,
                    _ = stop_rx.changed() => break,
                };

                match result {
                    Ok(snapshot) => {
                        tracing::debug!(
                            "Fetched {} objects for {}",
                            snapshot.objects.len(),
                            snapshot.root.name
                        );
                        if events.send(SessionEvent::Data(snapshot)).is_err() {
                            tracing::debug!("Session channel closed, stopping poller");
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Fetch from {} failed: {:#}", source.describe(), e);
                    }
                }
            }
            tracing::debug!("Poller for {} stopped", source.describe());
        });

        PollerHandle { stop_tx, handle }
    }
}

/// Handle to a running poller
pub struct PollerHandle {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PollerHandle {
    /// Signal the poller to stop and wait for it to exit
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!("Poller task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
