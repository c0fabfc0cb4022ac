//! Watcher module
//!
//! Polls an object source and drives a graph session from the resulting
//! event stream. Data and zoom events share one channel, so the session
//! applies them in a single total order.

mod poller;
mod source;

pub use poller::{Poller, PollerHandle};
pub use source::{FileSource, ObjectSource, SnapshotFormat, load_snapshot};

use crate::graph::{GraphSession, LabelRenderer, RenderAdapter, SessionEvent, UpdateOutcome};
use anyhow::Result;
use tokio::sync::mpsc;

/// Apply events to a session until teardown or channel close
///
/// A frame is rendered up front and after every event that changed what is
/// on screen.
pub async fn drive(
    session: &mut GraphSession,
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    adapter: &mut dyn RenderAdapter,
    labels: &dyn LabelRenderer,
) -> Result<()> {
    session.render(adapter, labels)?;

    while let Some(event) = events.recv().await {
        match session.handle(event) {
            UpdateOutcome::TornDown => break,
            UpdateOutcome::Ignored | UpdateOutcome::KeptPrevious => continue,
            UpdateOutcome::StillLoading
            | UpdateOutcome::Centered
            | UpdateOutcome::Refreshed
            | UpdateOutcome::Zoomed => session.render(adapter, labels)?,
        }
    }

    session.teardown();
    events.close();
    Ok(())
}
