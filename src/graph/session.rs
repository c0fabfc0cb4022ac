//! Graph session: ties model, layout and viewport together
//!
//! Data ticks and zoom changes are applied as totally ordered events against
//! a single session. Data ticks rebuild the graph and layout; zoom changes
//! only touch the viewport. The centering offset is computed on the first
//! tick that yields a non-empty graph.

use crate::graph::label::LabelRenderer;
use crate::graph::layout::{self, LayoutOptions, LayoutResult};
use crate::graph::model::{self, ReconciliationGraph};
use crate::graph::render::{DrawCommand, RenderAdapter};
use crate::graph::viewport::{ViewportController, ViewportPhase, ViewportSettings, ViewportState};
use crate::models::Snapshot;
use anyhow::Result;

/// Input to a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A poll tick delivered a new snapshot
    Data(Snapshot),
    /// The user moved the zoom control
    Zoom(u32),
    /// The owning view is going away
    Teardown,
}

/// What applying an event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The session was torn down; nothing changed
    Ignored,
    /// Only the root is known so far
    StillLoading,
    /// First non-empty graph; centering offset computed
    Centered,
    /// Graph and layout replaced, viewport kept
    Refreshed,
    /// Layout failed; the previous layout stays on screen
    KeptPrevious,
    /// Viewport zoom updated
    Zoomed,
    /// Session closed by this event
    TornDown,
}

/// State of one visualization of an automation's reconciliation graph
#[derive(Debug, Clone)]
pub struct GraphSession {
    layout_options: LayoutOptions,
    viewport: ViewportController,
    graph: Option<ReconciliationGraph>,
    layout: Option<LayoutResult>,
    torn_down: bool,
}

impl GraphSession {
    pub fn new(layout_options: LayoutOptions, viewport: ViewportSettings) -> Self {
        Self {
            layout_options,
            viewport: ViewportController::new(viewport),
            graph: None,
            layout: None,
            torn_down: false,
        }
    }

    /// Apply any event
    pub fn handle(&mut self, event: SessionEvent) -> UpdateOutcome {
        match event {
            SessionEvent::Data(snapshot) => self.apply_snapshot(&snapshot),
            SessionEvent::Zoom(zoom) => self.on_zoom_change(zoom),
            SessionEvent::Teardown => {
                self.teardown();
                UpdateOutcome::TornDown
            }
        }
    }

    /// Rebuild graph and layout from a poll tick
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> UpdateOutcome {
        if self.torn_down {
            tracing::debug!("Ignoring data for torn down session");
            return UpdateOutcome::Ignored;
        }

        let graph = model::build(&snapshot.objects, &snapshot.root);
        let result = match layout::layout(&graph, &self.layout_options) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Layout failed, keeping previous layout: {}", e);
                return UpdateOutcome::KeptPrevious;
            }
        };

        let outcome = match self.viewport.phase() {
            ViewportPhase::Loading if graph.is_empty() => UpdateOutcome::StillLoading,
            ViewportPhase::Loading => {
                self.viewport.center_once(&result);
                UpdateOutcome::Centered
            }
            ViewportPhase::Ready => {
                if let Some(previous) = &self.graph {
                    if !previous.same_topology(&graph) {
                        tracing::debug!(
                            "Topology of {} changed ({} -> {} nodes), keeping pan offset",
                            graph.root_id,
                            previous.nodes.len(),
                            graph.nodes.len()
                        );
                    }
                }
                UpdateOutcome::Refreshed
            }
        };

        self.graph = Some(graph);
        self.layout = Some(result);
        outcome
    }

    /// Apply a user zoom change without rebuilding the graph
    pub fn on_zoom_change(&mut self, zoom_percent: u32) -> UpdateOutcome {
        if self.torn_down {
            return UpdateOutcome::Ignored;
        }
        self.viewport
            .on_zoom_change(zoom_percent, self.layout.as_ref());
        UpdateOutcome::Zoomed
    }

    /// Stop accepting updates and drop graph state
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.graph = None;
        self.layout = None;
        self.viewport.reset();
        tracing::debug!("Graph session torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn phase(&self) -> ViewportPhase {
        self.viewport.phase()
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.viewport.state()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn graph(&self) -> Option<&ReconciliationGraph> {
        self.graph.as_ref()
    }

    pub fn layout(&self) -> Option<&LayoutResult> {
        self.layout.as_ref()
    }

    /// Whether the loading placeholder should replace the draw surface
    pub fn show_loading(&self) -> bool {
        self.viewport.phase() == ViewportPhase::Loading
    }

    /// Build the draw command for the current frame, if one can be drawn
    pub fn draw_command(&self, labels: &dyn LabelRenderer) -> Option<DrawCommand> {
        if self.show_loading() {
            return None;
        }
        let graph = self.graph.as_ref()?;
        let layout = self.layout.as_ref()?;
        Some(DrawCommand::compose(
            graph,
            layout,
            self.viewport.transform(),
            labels,
        ))
    }

    /// Push the current frame to a render adapter
    pub fn render(
        &self,
        adapter: &mut dyn RenderAdapter,
        labels: &dyn LabelRenderer,
    ) -> Result<()> {
        match self.draw_command(labels) {
            Some(command) => adapter.draw(&command),
            None => adapter.show_loading(),
        }
    }
}
