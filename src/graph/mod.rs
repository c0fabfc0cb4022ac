//! Reconciliation graph engine
//!
//! Builds a graph from polled objects, lays it out, and keeps the viewport
//! stable across refreshes.

pub mod label;
pub mod layout;
pub mod model;
pub mod render;
pub mod session;
pub mod viewport;

pub use label::{HtmlLabel, LabelRenderer, PlainLabel, StatusPalette};
pub use layout::{
    Direction, EdgeRoute, EdgeRouting, LayoutError, LayoutOptions, LayoutResult, NodeLayout,
    NodeSize, Point, layout,
};
pub use model::{GraphEdge, GraphNode, ModelIssue, NodePayload, ReconciliationGraph, build};
pub use render::{DrawCommand, DrawEdge, DrawNode, JsonRenderAdapter, RenderAdapter};
pub use session::{GraphSession, SessionEvent, UpdateOutcome};
pub use viewport::{Transform, ViewportController, ViewportPhase, ViewportSettings, ViewportState};
