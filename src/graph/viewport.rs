//! Viewport state: zoom level and horizontal pan offset
//!
//! The controller is the only mutable view state in a session. The pan offset
//! that keeps the root node in view is computed once, on the first successful
//! layout, and afterwards only when the user changes the zoom level.

use crate::graph::layout::LayoutResult;
use serde::{Deserialize, Serialize};

/// Zoom range and the constants of the scale/pan formulas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSettings {
    pub min_zoom: u32,
    pub max_zoom: u32,
    pub default_zoom: u32,
    /// Added to the zoom percent before dividing
    pub scale_offset: f64,
    /// Divisor turning a zoom percent into a scale ratio; must be positive
    pub scale_divisor: f64,
    /// Horizontal shift applied per zoom percent when centering
    pub centering_constant: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            min_zoom: 0,
            max_zoom: 100,
            default_zoom: 0,
            scale_offset: 20.0,
            scale_divisor: 100.0,
            centering_constant: 20.0,
        }
    }
}

/// Whether the root has been centered yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewportPhase {
    /// No successful layout yet; the draw surface stays hidden
    Loading,
    /// Centering done; stays here for the rest of the session
    Ready,
}

/// Snapshot of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub zoom_percent: u32,
    pub pan_offset_x: f64,
    pub scale_ratio: f64,
    pub initialized: bool,
}

/// Transform handed to the render adapter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
}

/// Owns zoom and pan for the lifetime of a visualization session
#[derive(Debug, Clone)]
pub struct ViewportController {
    settings: ViewportSettings,
    state: ViewportState,
}

impl ViewportController {
    pub fn new(settings: ViewportSettings) -> Self {
        let mut controller = Self {
            settings,
            state: ViewportState {
                zoom_percent: 0,
                pan_offset_x: 0.0,
                scale_ratio: 0.0,
                initialized: false,
            },
        };
        controller.reset();
        controller
    }

    pub fn settings(&self) -> &ViewportSettings {
        &self.settings
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn phase(&self) -> ViewportPhase {
        if self.state.initialized {
            ViewportPhase::Ready
        } else {
            ViewportPhase::Loading
        }
    }

    /// Clamp a zoom percent into the configured range
    pub fn clamp_zoom(&self, zoom_percent: u32) -> u32 {
        zoom_percent.clamp(self.settings.min_zoom, self.settings.max_zoom)
    }

    /// Scale ratio for a zoom percent; strictly increasing over the range
    pub fn scale_for(&self, zoom_percent: u32) -> f64 {
        let zoom = self.clamp_zoom(zoom_percent) as f64;
        (zoom + self.settings.scale_offset) / self.settings.scale_divisor
    }

    /// Pan offset that anchors the layout's root node for a zoom percent
    pub fn pan_offset_for(&self, layout: &LayoutResult, zoom_percent: u32) -> f64 {
        let zoom = self.clamp_zoom(zoom_percent);
        let shift = -(zoom as f64 * self.settings.centering_constant);
        match layout.root() {
            Some(root) => shift + (root.x - root.width) * self.scale_for(zoom),
            None => {
                tracing::warn!("Layout has no root node {:?}, not centering", layout.root_id());
                shift
            }
        }
    }

    /// Compute the centering offset if it has not been computed yet
    ///
    /// Returns true only on the call that performed the centering.
    pub fn center_once(&mut self, layout: &LayoutResult) -> bool {
        if self.state.initialized {
            return false;
        }
        self.state.pan_offset_x = self.pan_offset_for(layout, self.state.zoom_percent);
        self.state.initialized = true;
        tracing::debug!(
            "Centered root {} with pan offset {:.2} at zoom {}",
            layout.root_id(),
            self.state.pan_offset_x,
            self.state.zoom_percent
        );
        true
    }

    /// Apply a user zoom change, re-centering against the current layout
    pub fn on_zoom_change(
        &mut self,
        zoom_percent: u32,
        layout: Option<&LayoutResult>,
    ) -> ViewportState {
        let zoom = self.clamp_zoom(zoom_percent);
        if zoom != zoom_percent {
            tracing::debug!("Zoom {} clamped to {}", zoom_percent, zoom);
        }
        self.state.zoom_percent = zoom;
        self.state.scale_ratio = self.scale_for(zoom);
        if let Some(layout) = layout {
            self.state.pan_offset_x = self.pan_offset_for(layout, zoom);
        }
        self.state
    }

    /// Current draw transform
    pub fn transform(&self) -> Transform {
        Transform {
            scale: self.state.scale_ratio,
            translate_x: -self.state.pan_offset_x,
        }
    }

    /// Return to the initial Loading state at the default zoom
    pub fn reset(&mut self) {
        let zoom = self.clamp_zoom(self.settings.default_zoom);
        self.state = ViewportState {
            zoom_percent: zoom,
            pan_offset_x: 0.0,
            scale_ratio: self.scale_for(zoom),
            initialized: false,
        };
    }
}
