//! fluxgraph library
//!
//! Builds, lays out and renders the reconciliation graph of a Flux
//! Kustomization or HelmRelease. The binary is a thin CLI over these modules;
//! they are also used directly by the integration tests.

pub mod config;
pub mod graph;
pub mod models;
pub mod watcher;

// Re-export commonly used types for convenience
pub use graph::{
    DrawCommand, GraphSession, LabelRenderer, LayoutOptions, LayoutResult, RenderAdapter,
    ReconciliationGraph, SessionEvent, UpdateOutcome, ViewportController, ViewportSettings,
};
pub use models::{ObjectStatus, ReconciledObject, RootDescriptor, Snapshot};
